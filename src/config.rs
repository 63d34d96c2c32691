// Spirit Level — Hardware & System Configuration
// Target: Seeed Studio Xiao ESP32-C3 (RISC-V)

// ---------------------------------------------------------------------------
// GPIO Pin Definitions (Xiao ESP32-C3 pinout)
// ---------------------------------------------------------------------------
pub const PIN_I2C_SDA: i32 = 6; // D4 — I2C data line
pub const PIN_I2C_SCL: i32 = 7; // D5 — I2C clock line

// ---------------------------------------------------------------------------
// I2C Bus
// ---------------------------------------------------------------------------
pub const I2C_ADDR_MPU6050: u8 = 0x68;
pub const I2C_ADDR_OLED: u8 = 0x3C;
pub const I2C_TIMEOUT_TICKS: u32 = 1000; // FreeRTOS ticks

// ---------------------------------------------------------------------------
// Display (SSD1306 OLED)
// ---------------------------------------------------------------------------
pub const SCREEN_WIDTH: u32 = 128;
pub const SCREEN_HEIGHT: u32 = 64;
pub const DISPLAY_BUFFER_SIZE: usize = (SCREEN_WIDTH as usize * SCREEN_HEIGHT as usize) / 8; // 1024

// ---------------------------------------------------------------------------
// Bubble Geometry
// ---------------------------------------------------------------------------
pub const BUBBLE_RADIUS: u32 = 5;   // px
pub const MAX_TILT_DEG: f32 = 20.0; // tilt that pins the bubble at the edge
pub const LEVEL_WINDOW_PX: i32 = 2; // ±px around screen centre that counts as level

// ---------------------------------------------------------------------------
// Calibration (measured flat against a reference spirit level)
// ---------------------------------------------------------------------------
pub const PITCH_ERROR_DEG: f32 = -0.2;
pub const ROLL_ERROR_DEG: f32 = -3.2;

// ---------------------------------------------------------------------------
// Timing (milliseconds)
// ---------------------------------------------------------------------------
pub const FRAME_INTERVAL_MS: u64 = 100; // 10 Hz sample/refresh

// ---------------------------------------------------------------------------
// Screen Layout (pixels)
// ---------------------------------------------------------------------------
pub const GUIDE_RECT_X: i32 = 56; // centring guide, top-left corner
pub const GUIDE_RECT_Y: i32 = 25;
pub const GUIDE_RECT_SIZE: u32 = 16;
pub const TILT_TEXT_ROW: i32 = 54;   // pitch/roll readout, top of glyphs
pub const BANNER_INSET_PX: i32 = 15; // "Level!" starts this far left of centre

// ---------------------------------------------------------------------------
// MPU6050 Sensor Scale Factors
// ---------------------------------------------------------------------------
pub const ACCEL_SCALE_2G: f32 = 16384.0; // LSB/g at ±2 g
