// Spirit Level — Boot & Control Loop
//
// Boot sequence:
//   1. Initialise logging and validate the mapping configuration.
//   2. Bring up the shared I2C bus (MPU6050 + SSD1306).
//   3. Check the sensor is answering, initialise it, then the panel.
//   4. Enter the control loop: read accel, compute the bubble frame,
//      draw it, flush it, sleep out the rest of the 100 ms period.
//
// The loop runs for the life of the device. There is no menu, no sleep
// mode; power off is the off switch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use esp_idf_hal::i2c::{I2cConfig, I2cDriver};
use esp_idf_hal::prelude::*;

use spiritlevel::config::*;
use spiritlevel::level::{CalibrationOffsets, DisplayGeometry, LevelConfig, LevelFrame};
use spiritlevel::render;

use crate::drivers::display::OledDisplay;
use crate::drivers::imu::Mpu6050;
use crate::drivers::SharedBus;

pub fn run() -> anyhow::Result<()> {
    // Link esp-idf-sys runtime patches and initialise logging.
    esp_idf_svc::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();
    log::info!("Spirit level firmware starting…");

    // Validate the geometry before touching any hardware.
    let cfg = LevelConfig::new(
        CalibrationOffsets {
            pitch: PITCH_ERROR_DEG,
            roll: ROLL_ERROR_DEG,
        },
        DisplayGeometry::new(SCREEN_WIDTH, SCREEN_HEIGHT, BUBBLE_RADIUS)?,
        MAX_TILT_DEG,
    )
    .context("invalid level configuration")?;

    // ---- I2C bus (shared between MPU6050 and OLED) ------------------------
    let peripherals = Peripherals::take()?;
    let i2c_config = I2cConfig::new().baudrate(400u32.kHz().into());
    let i2c = I2cDriver::new(
        peripherals.i2c0,
        peripherals.pins.gpio6, // SDA
        peripherals.pins.gpio7, // SCL
        &i2c_config,
    )?;
    // SAFETY: The I2C peripheral is a singleton obtained from `Peripherals::take()`.
    // It will live for the entire programme duration (embedded firmware never exits).
    let i2c_bus: SharedBus =
        Box::leak(Box::new(Mutex::new(unsafe { core::mem::transmute(i2c) })));

    // ---- Sensor ------------------------------------------------------------
    let imu = Mpu6050::new(i2c_bus);
    if !imu.is_connected() {
        log::warn!("MPU6050 WHO_AM_I mismatch, check wiring and address");
    }
    imu.init().context("MPU6050 init failed")?;

    // ---- Panel -------------------------------------------------------------
    let mut display = OledDisplay::new(i2c_bus);
    display.init().context("SSD1306 init failed")?;

    // Never raised in normal operation; the loop checks it once per pass so
    // a future input source can stop the device cleanly.
    let shutdown = AtomicBool::new(false);

    log::info!("Boot complete, entering control loop ({} ms period)", FRAME_INTERVAL_MS);
    control_loop(&imu, &mut display, &cfg, &shutdown)
}

/// Fixed-period loop: one sensor reading becomes one frame.
///
/// A failed read skips the frame and leaves the previous one on the panel;
/// a failed flush is logged and the loop carries on. Only a cancellation
/// request ends the loop.
pub fn control_loop(
    imu: &Mpu6050,
    display: &mut OledDisplay,
    cfg: &LevelConfig,
    shutdown: &AtomicBool,
) -> anyhow::Result<()> {
    let interval = Duration::from_millis(FRAME_INTERVAL_MS);

    while !shutdown.load(Ordering::Relaxed) {
        let tick_start = Instant::now();

        match imu.read_accel() {
            Ok(sample) => {
                let frame = LevelFrame::from_sample(sample, cfg);
                log::debug!(
                    "pitch={:.1} roll={:.1} -> ({}, {}) level={}",
                    frame.angles.pitch,
                    frame.angles.roll,
                    frame.x,
                    frame.y,
                    frame.is_level
                );

                // Drawing into the in-memory buffer cannot fail; only the
                // bus transfer can.
                let _ = render::draw_frame(display.frame_mut(), &frame);
                if let Err(e) = display.flush() {
                    log::error!("Display flush failed: {}", e);
                }
            }
            Err(e) => {
                log::warn!("Accel read failed, keeping previous frame: {}", e);
            }
        }

        // Sleep for the remainder of the refresh interval.
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }

    log::info!("Cancellation requested, leaving control loop");
    Ok(())
}
