//! Core types and settings for the compass engine

use core::time::Duration;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::axes::ScreenRotation;
use crate::math::STANDARD_GRAVITY;

/// Kind of motion sensor delivering a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorKind {
    /// Acceleration including gravity, in m/s²
    Accelerometer,
    /// Ambient geomagnetic field, in µT
    MagneticField,
}

/// Requested delivery rate for a sensor registration
///
/// Mirrors the platform's delay tiers. The engine asks for
/// [`SensorDelay::Game`] unless configured otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SensorDelay {
    /// As fast as the hardware allows
    Fastest,
    /// Rate suitable for games (about 50 Hz)
    #[default]
    Game,
    /// Rate suitable for UI updates (about 15 Hz)
    Ui,
    /// Rate suitable for screen orientation changes (about 5 Hz)
    Normal,
}

impl SensorDelay {
    /// Nominal sampling period of the tier
    pub fn sampling_period(self) -> Duration {
        match self {
            SensorDelay::Fastest => Duration::ZERO,
            SensorDelay::Game => Duration::from_micros(20_000),
            SensorDelay::Ui => Duration::from_micros(66_667),
            SensorDelay::Normal => Duration::from_micros(200_000),
        }
    }
}

/// A single 3-axis sample from one sensor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEvent {
    pub kind: SensorKind,
    pub values: Vector3<f32>,
}

impl SensorEvent {
    pub fn new(kind: SensorKind, values: Vector3<f32>) -> Self {
        Self { kind, values }
    }

    pub fn accelerometer(x: f32, y: f32, z: f32) -> Self {
        Self::new(SensorKind::Accelerometer, Vector3::new(x, y, z))
    }

    pub fn magnetic_field(x: f32, y: f32, z: f32) -> Self {
        Self::new(SensorKind::MagneticField, Vector3::new(x, y, z))
    }
}

/// Compass engine settings
///
/// Configuration for the smoothing filter, the orientation solver thresholds
/// and the sensor registration.
///
/// # Example
/// ```
/// use compass_engine::{EngineSettings, ScreenRotation};
///
/// let settings = EngineSettings {
///     smoothing_factor: 0.9,                    // Faster response, more jitter
///     screen_rotation: ScreenRotation::Rotation90,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    /// Weight of the previous estimate in the low-pass filter (typically 0.97)
    ///
    /// Higher values reject more vibration but react slower to turns.
    /// Values outside `[0, 1]` are clamped.
    pub smoothing_factor: f32,
    /// Delivery rate requested from the sensor source
    pub sensor_delay: SensorDelay,
    /// Rotation of the screen relative to the device's natural orientation
    pub screen_rotation: ScreenRotation,
    /// Minimum gravity magnitude in m/s² below which the device is
    /// considered in free fall and no heading is produced
    pub free_fall_threshold: f32,
    /// Minimum magnitude of `geomagnetic × gravity` below which the two
    /// vectors are treated as collinear
    pub min_field_cross: f32,
    /// Constant correction in degrees added to every solved heading
    pub azimuth_fix: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            smoothing_factor: 0.97,
            sensor_delay: SensorDelay::default(),
            screen_rotation: ScreenRotation::default(),
            free_fall_threshold: 0.1 * STANDARD_GRAVITY,
            min_field_cross: 0.1,
            azimuth_fix: 0.0,
        }
    }
}

/// Snapshot of the heading outputs
///
/// `dazimuth` is only meaningful while `target_active` is true.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingState {
    /// Last emitted heading relative to magnetic north, `[0, 360)`
    pub azimuth: f32,
    /// Last emitted heading relative to the target bearing, `[0, 360)`
    pub dazimuth: f32,
    /// Whether the coordinator is pointing at a target
    pub target_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EngineSettings::default();
        assert_eq!(settings.smoothing_factor, 0.97);
        assert_eq!(settings.sensor_delay, SensorDelay::Game);
        assert_eq!(settings.screen_rotation, ScreenRotation::Rotation0);
        assert!((settings.free_fall_threshold - 0.980665).abs() < 1e-6);
        assert_eq!(settings.azimuth_fix, 0.0);
    }

    #[test]
    fn test_sensor_delay_periods_are_ordered() {
        let tiers = [
            SensorDelay::Fastest,
            SensorDelay::Game,
            SensorDelay::Ui,
            SensorDelay::Normal,
        ];
        for pair in tiers.windows(2) {
            assert!(pair[0].sampling_period() < pair[1].sampling_period());
        }
        assert_eq!(SensorDelay::Game.sampling_period().as_millis(), 20);
    }
}
