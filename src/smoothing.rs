//! Exponential low-pass filtering of the gravity and geomagnetic vectors

use nalgebra::Vector3;

use crate::types::SensorKind;

/// Default weight of the previous estimate
pub const DEFAULT_SMOOTHING_FACTOR: f32 = 0.97;

/// First-order IIR low-pass step: `alpha * previous + (1 - alpha) * sample`.
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use compass_engine::smoothing::smooth;
///
/// let previous = Vector3::new(0.0, 0.0, 10.0);
/// let sample = Vector3::new(0.0, 0.0, 0.0);
/// let next = smooth(previous, sample, 0.9);
/// assert!((next.z - 9.0).abs() < 1e-6);
/// ```
#[inline]
pub fn smooth(previous: Vector3<f32>, sample: Vector3<f32>, alpha: f32) -> Vector3<f32> {
    previous * alpha + sample * (1.0 - alpha)
}

/// Smoothed gravity and geomagnetic estimates
///
/// Both estimates start at the zero vector. The orientation solver rejects
/// zero vectors, so no heading is produced until both streams have warmed up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingState {
    alpha: f32,
    gravity: Vector3<f32>,
    geomagnetic: Vector3<f32>,
}

impl Default for SmoothingState {
    fn default() -> Self {
        Self::new(DEFAULT_SMOOTHING_FACTOR)
    }
}

impl SmoothingState {
    /// Create a state with the given smoothing factor, clamped to `[0, 1]`
    pub fn new(alpha: f32) -> Self {
        Self {
            alpha: clamp_alpha(alpha),
            gravity: Vector3::zeros(),
            geomagnetic: Vector3::zeros(),
        }
    }

    /// Fold a sample into the estimate of its kind
    pub fn update(&mut self, kind: SensorKind, sample: Vector3<f32>) {
        let estimate = match kind {
            SensorKind::Accelerometer => &mut self.gravity,
            SensorKind::MagneticField => &mut self.geomagnetic,
        };
        *estimate = smooth(*estimate, sample, self.alpha);
    }

    /// Change the smoothing factor without touching the estimates
    pub fn set_alpha(&mut self, alpha: f32) {
        self.alpha = clamp_alpha(alpha);
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    pub fn geomagnetic(&self) -> Vector3<f32> {
        self.geomagnetic
    }

    /// Drop both estimates back to zero
    pub fn reset(&mut self) {
        self.gravity = Vector3::zeros();
        self.geomagnetic = Vector3::zeros();
    }
}

fn clamp_alpha(alpha: f32) -> f32 {
    if alpha.is_nan() {
        DEFAULT_SMOOTHING_FACTOR
    } else {
        alpha.clamp(0.0, 1.0)
    }
}
