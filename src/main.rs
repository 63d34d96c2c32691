// Spirit Level — Firmware Entry Point
//
// MPU6050 accelerometer on a shared I2C bus feeds the tilt pipeline; an
// SSD1306 OLED shows the bubble. The boot sequence and control loop live
// in `app`; the geometry, frame buffer, and rendering live in the library
// crate so they can be unit-tested on the host.

#[cfg(target_os = "espidf")]
mod app;
#[cfg(target_os = "espidf")]
mod drivers;

#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    app::run()
}

// The binary only does real work on the ESP-IDF target. Building for the
// host (for `cargo test`) gets a stub entry point.
#[cfg(not(target_os = "espidf"))]
fn main() {}
