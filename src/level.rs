// Spirit Level — Tilt Geometry Pipeline
//
// Pure math from a raw acceleration vector to a bubble position on the
// panel. No hardware access, no retained state between readings.

use std::f32::consts::PI;

use crate::config::LEVEL_WINDOW_PX;

// ---------------------------------------------------------------------------
// Data Types
// ---------------------------------------------------------------------------

/// One 3-axis accelerometer reading, in g.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccelSample {
    pub ax: f32,
    pub ay: f32,
    pub az: f32,
}

/// Calibrated tilt angles in degrees. Unclamped; the display mapping
/// saturates later.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TiltAngles {
    pub pitch: f32,
    pub roll: f32,
}

/// Additive corrections for sensor mounting bias, in degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalibrationOffsets {
    pub pitch: f32,
    pub roll: f32,
}

/// Inclusive band of valid bubble-centre positions along one display axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRange {
    pub min: i32,
    pub max: i32,
}

/// Panel dimensions plus the bubble radius that shrinks the usable area.
#[derive(Debug, Clone, Copy)]
pub struct DisplayGeometry {
    pub cols: u32,
    pub rows: u32,
    pub bubble_radius: u32,
}

impl DisplayGeometry {
    /// Both axes must leave room for a whole bubble: dimension >= 2r + 1.
    pub fn new(cols: u32, rows: u32, bubble_radius: u32) -> anyhow::Result<Self> {
        let needed = 2 * bubble_radius + 1;
        anyhow::ensure!(
            cols >= needed && rows >= needed,
            "{}x{} display cannot fit a bubble of radius {}",
            cols,
            rows,
            bubble_radius
        );
        Ok(Self {
            cols,
            rows,
            bubble_radius,
        })
    }

    /// Column band for the bubble centre (pitch axis).
    pub fn x_range(&self) -> AxisRange {
        AxisRange {
            min: self.bubble_radius as i32,
            max: (self.cols - 1 - self.bubble_radius) as i32,
        }
    }

    /// Row band for the bubble centre (roll axis).
    pub fn y_range(&self) -> AxisRange {
        AxisRange {
            min: self.bubble_radius as i32,
            max: (self.rows - 1 - self.bubble_radius) as i32,
        }
    }
}

/// Fixed mapping parameters, validated once at boot.
#[derive(Debug, Clone, Copy)]
pub struct LevelConfig {
    pub cal: CalibrationOffsets,
    pub geom: DisplayGeometry,
    pub max_tilt_deg: f32,
}

impl LevelConfig {
    pub fn new(
        cal: CalibrationOffsets,
        geom: DisplayGeometry,
        max_tilt_deg: f32,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(
            max_tilt_deg.is_finite() && max_tilt_deg > 0.0,
            "max tilt must be a positive number of degrees, got {}",
            max_tilt_deg
        );
        Ok(Self {
            cal,
            geom,
            max_tilt_deg,
        })
    }
}

// ---------------------------------------------------------------------------
// Pipeline Steps
// ---------------------------------------------------------------------------

/// Pitch and roll for one accelerometer reading, calibration applied.
///
/// Two-argument arctangent: the quadrant survives `az` going negative or
/// zero, where a plain atan(ay/az) would lose the sign or divide by zero.
/// `atan2(0, 0)` is 0 by convention, so even an all-zero reading still
/// produces an angle instead of a fault.
pub fn calculate_tilt(sample: AccelSample, cal: CalibrationOffsets) -> TiltAngles {
    TiltAngles {
        pitch: sample.ay.atan2(sample.az) * 180.0 / PI + cal.pitch,
        roll: sample.ax.atan2(sample.az) * 180.0 / PI + cal.roll,
    }
}

/// Map one tilt angle onto its display band.
///
/// Tilt beyond ±max_tilt_deg pins the bubble at the band edge instead of
/// running off screen. The affine scale truncates toward zero; the final
/// integer clamp keeps the result in band even if the float product lands
/// a fraction past `max`.
pub fn angle_to_coord(angle_deg: f32, max_tilt_deg: f32, range: AxisRange) -> i32 {
    let clamped = angle_deg.clamp(-max_tilt_deg, max_tilt_deg);
    let slope = (range.max - range.min) as f32 / (2.0 * max_tilt_deg);
    let coord = (slope * (clamped + max_tilt_deg) + range.min as f32) as i32;
    coord.clamp(range.min, range.max)
}

/// Whether the bubble centre sits inside the level window: within
/// ±LEVEL_WINDOW_PX of the screen centre on both axes, inclusive.
pub fn is_level(x: i32, y: i32, cols: u32, rows: u32) -> bool {
    let centre_x = (cols / 2) as i32;
    let centre_y = (rows / 2) as i32;
    (x - centre_x).abs() <= LEVEL_WINDOW_PX && (y - centre_y).abs() <= LEVEL_WINDOW_PX
}

// ---------------------------------------------------------------------------
// Per-Iteration Snapshot
// ---------------------------------------------------------------------------

/// Everything one loop pass hands to the renderer, by value.
#[derive(Debug, Clone, Copy)]
pub struct LevelFrame {
    pub x: i32,
    pub y: i32,
    pub is_level: bool,
    pub angles: TiltAngles,
}

impl LevelFrame {
    /// Run the whole pipeline for one reading: derive the tilt angles, map
    /// both axes, then evaluate the level flag on the result.
    pub fn from_sample(sample: AccelSample, cfg: &LevelConfig) -> Self {
        let angles = calculate_tilt(sample, cfg.cal);
        let x = angle_to_coord(angles.pitch, cfg.max_tilt_deg, cfg.geom.x_range());
        let y = angle_to_coord(angles.roll, cfg.max_tilt_deg, cfg.geom.y_range());
        Self {
            x,
            y,
            is_level: is_level(x, y, cfg.geom.cols, cfg.geom.rows),
            angles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn test_geometry() -> DisplayGeometry {
        DisplayGeometry::new(128, 64, 5).unwrap()
    }

    fn test_config() -> LevelConfig {
        LevelConfig::new(
            CalibrationOffsets {
                pitch: -0.2,
                roll: -3.2,
            },
            test_geometry(),
            20.0,
        )
        .unwrap()
    }

    #[test]
    fn flat_device_reads_zero_tilt() {
        let angles = calculate_tilt(
            AccelSample {
                ax: 0.0,
                ay: 0.0,
                az: 1.0,
            },
            CalibrationOffsets::default(),
        );
        assert_eq!(angles.pitch, 0.0);
        assert_eq!(angles.roll, 0.0);
    }

    #[test]
    fn device_on_its_side_reads_ninety_degrees_roll() {
        let angles = calculate_tilt(
            AccelSample {
                ax: 1.0,
                ay: 0.0,
                az: 0.0,
            },
            CalibrationOffsets::default(),
        );
        assert!((angles.roll - 90.0).abs() < EPS);
        assert!(angles.pitch.abs() < EPS);
    }

    #[test]
    fn quadrant_preserved_when_z_goes_negative() {
        // Upside down with a slight forward lean. A naive atan(ay/az) would
        // report a small negative angle; atan2 keeps the obtuse one.
        let angles = calculate_tilt(
            AccelSample {
                ax: 0.0,
                ay: 0.1,
                az: -1.0,
            },
            CalibrationOffsets::default(),
        );
        assert!(angles.pitch > 90.0);
    }

    #[test]
    fn all_zero_reading_maps_to_zero_angles() {
        // atan2(0, 0) == 0 by convention
        let angles = calculate_tilt(AccelSample::default(), CalibrationOffsets::default());
        assert_eq!(angles.pitch, 0.0);
        assert_eq!(angles.roll, 0.0);
    }

    #[test]
    fn calibration_offsets_are_added_to_raw_angles() {
        let angles = calculate_tilt(
            AccelSample {
                ax: 0.0,
                ay: 0.0,
                az: 1.0,
            },
            CalibrationOffsets {
                pitch: -0.2,
                roll: -3.2,
            },
        );
        assert!((angles.pitch + 0.2).abs() < EPS);
        assert!((angles.roll + 3.2).abs() < EPS);
    }

    #[test]
    fn zero_angle_maps_to_band_midpoint() {
        // 128 columns, radius 5: band 5..=122
        let x = AxisRange { min: 5, max: 122 };
        assert_eq!(angle_to_coord(0.0, 20.0, x), 5 + (122 - 5) / 2);
        // 64 rows, radius 5: band 5..=58
        let y = AxisRange { min: 5, max: 58 };
        assert_eq!(angle_to_coord(0.0, 20.0, y), 5 + (58 - 5) / 2);
    }

    #[test]
    fn extreme_angles_hit_the_band_edges_exactly() {
        let x = AxisRange { min: 5, max: 122 };
        assert_eq!(angle_to_coord(-20.0, 20.0, x), 5);
        assert_eq!(angle_to_coord(20.0, 20.0, x), 122);
    }

    #[test]
    fn over_range_angles_saturate_at_the_edge_value() {
        let x = AxisRange { min: 5, max: 122 };
        let at_max = angle_to_coord(20.0, 20.0, x);
        assert_eq!(angle_to_coord(21.0, 20.0, x), at_max);
        assert_eq!(angle_to_coord(90.0, 20.0, x), at_max);
        assert_eq!(angle_to_coord(1.0e30, 20.0, x), at_max);
        let at_min = angle_to_coord(-20.0, 20.0, x);
        assert_eq!(angle_to_coord(-21.0, 20.0, x), at_min);
        assert_eq!(angle_to_coord(-1.0e30, 20.0, x), at_min);
    }

    #[test]
    fn every_angle_lands_inside_the_band() {
        let y = AxisRange { min: 5, max: 58 };
        let mut deg = -100.0f32;
        while deg <= 100.0 {
            let c = angle_to_coord(deg, 20.0, y);
            assert!(c >= y.min && c <= y.max, "angle {} mapped to {}", deg, c);
            deg += 0.25;
        }
    }

    #[test]
    fn mapping_is_monotonic_across_the_tilt_range() {
        let x = AxisRange { min: 5, max: 122 };
        let mut prev = angle_to_coord(-20.0, 20.0, x);
        let mut deg = -19.5f32;
        while deg <= 20.0 {
            let c = angle_to_coord(deg, 20.0, x);
            assert!(c >= prev, "coordinate stepped backwards at {} deg", deg);
            prev = c;
            deg += 0.5;
        }
    }

    #[test]
    fn single_point_band_always_maps_to_that_point() {
        // Smallest legal display dimension is 2r + 1, which collapses the
        // band to a single position. Slope is zero, every angle maps there.
        let band = AxisRange { min: 5, max: 5 };
        assert_eq!(angle_to_coord(-20.0, 20.0, band), 5);
        assert_eq!(angle_to_coord(0.0, 20.0, band), 5);
        assert_eq!(angle_to_coord(20.0, 20.0, band), 5);
    }

    #[test]
    fn level_window_boundaries_are_inclusive() {
        // 128x64 centre is (64, 32); the window spans 62..=66 x 30..=34
        assert!(is_level(64, 32, 128, 64));
        assert!(is_level(62, 30, 128, 64));
        assert!(is_level(66, 34, 128, 64));
        assert!(!is_level(61, 30, 128, 64));
        assert!(!is_level(67, 32, 128, 64));
        assert!(!is_level(64, 29, 128, 64));
        assert!(!is_level(64, 35, 128, 64));
    }

    #[test]
    fn one_centred_axis_is_not_enough() {
        assert!(!is_level(64, 50, 128, 64));
        assert!(!is_level(10, 32, 128, 64));
    }

    #[test]
    fn geometry_rejects_a_display_too_small_for_the_bubble() {
        assert!(DisplayGeometry::new(10, 64, 5).is_err());
        assert!(DisplayGeometry::new(128, 10, 5).is_err());
        // 11 = 2*5 + 1 is the smallest workable dimension
        assert!(DisplayGeometry::new(11, 11, 5).is_ok());
    }

    #[test]
    fn config_rejects_a_degenerate_tilt_range() {
        let geom = test_geometry();
        let cal = CalibrationOffsets::default();
        assert!(LevelConfig::new(cal, geom, 0.0).is_err());
        assert!(LevelConfig::new(cal, geom, -5.0).is_err());
        assert!(LevelConfig::new(cal, geom, f32::NAN).is_err());
        assert!(LevelConfig::new(cal, geom, 20.0).is_ok());
    }

    #[test]
    fn flat_reading_with_device_calibration() {
        // The measured offsets push a perfectly flat reading off centre:
        // pitch -0.2 deg is about one column, roll -3.2 deg lands the
        // bubble rows above the window, so the banner must stay off.
        let frame = LevelFrame::from_sample(
            AccelSample {
                ax: 0.0,
                ay: 0.0,
                az: 1.0,
            },
            &test_config(),
        );
        assert!((frame.angles.pitch + 0.2).abs() < EPS);
        assert!((frame.angles.roll + 3.2).abs() < EPS);
        assert_eq!(frame.x, 62);
        assert_eq!(frame.y, 27);
        assert!(!frame.is_level);
    }

    #[test]
    fn reading_matching_the_mounting_bias_centres_the_bubble() {
        // A device tilted by exactly the bias the offsets correct for
        // reads as level.
        let sample = AccelSample {
            ax: 3.2f32.to_radians().tan(),
            ay: 0.2f32.to_radians().tan(),
            az: 1.0,
        };
        let frame = LevelFrame::from_sample(sample, &test_config());
        assert!(frame.angles.pitch.abs() < 1e-3);
        assert!(frame.angles.roll.abs() < 1e-3);
        assert_eq!(frame.x, 63);
        assert_eq!(frame.y, 31);
        assert!(frame.is_level);
    }

    #[test]
    fn reading_on_the_window_corner_still_reads_level() {
        // Roll 2.4 deg against the -3.2 deg bias lands the bubble at
        // (62, 30), the near corner of the inclusive window. Easing off
        // to 2.0 deg moves it one row outside and the banner must drop.
        let cfg = test_config();
        let corner = LevelFrame::from_sample(
            AccelSample {
                ax: 2.4f32.to_radians().tan(),
                ay: 0.0,
                az: 1.0,
            },
            &cfg,
        );
        assert_eq!(corner.x, 62);
        assert_eq!(corner.y, 30);
        assert!(corner.is_level);

        let outside = LevelFrame::from_sample(
            AccelSample {
                ax: 2.0f32.to_radians().tan(),
                ay: 0.0,
                az: 1.0,
            },
            &cfg,
        );
        assert_eq!(outside.x, 62);
        assert_eq!(outside.y, 29);
        assert!(!outside.is_level);
    }

    #[test]
    fn hard_roll_pins_the_bubble_at_the_row_edge() {
        let cfg = test_config();
        // Near 90 deg of roll saturates the row axis; pitch stays centred.
        let frame = LevelFrame::from_sample(
            AccelSample {
                ax: 10.0,
                ay: 0.0,
                az: 0.001,
            },
            &cfg,
        );
        assert_eq!(frame.y, cfg.geom.y_range().max);
        assert_eq!(frame.x, 62);
        assert!(!frame.is_level);
    }
}
