// Spirit Level — Hardware-Independent Core
//
// Everything here compiles and unit-tests on the host: configuration
// constants, the tilt geometry pipeline, the SSD1306-layout frame buffer,
// and frame rendering. The firmware binary adds the ESP-IDF bus and
// driver glue on top.

pub mod config;
pub mod framebuffer;
pub mod level;
pub mod render;
