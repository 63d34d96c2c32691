// Spirit Level — Hardware Drivers

use std::sync::Mutex;

use esp_idf_hal::i2c::I2cDriver;

pub mod display;
pub mod imu;

/// Thread-safe handle to the I2C bus shared by the IMU and the OLED.
pub type SharedBus = &'static Mutex<I2cDriver<'static>>;
