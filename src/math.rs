//! Angle and vector helpers shared by the solver and the coordinator

use nalgebra::Vector3;

/// Mathematical constants
pub const DEG_TO_RAD: f32 = core::f32::consts::PI / 180.0;
pub const RAD_TO_DEG: f32 = 180.0 / core::f32::consts::PI;

/// Standard gravity in m/s²
pub const STANDARD_GRAVITY: f32 = 9.80665;

/// Wrap an angle in degrees into `[0, 360)`.
///
/// Equivalent to `(deg + 360) % 360` for inputs in `(-360, 360)`, but also
/// handles any finite value and the rounding case where the remainder lands
/// exactly on 360.
///
/// # Example
/// ```
/// use compass_engine::normalize_degrees;
///
/// assert_eq!(normalize_degrees(370.0), 10.0);
/// assert!((normalize_degrees(-0.001) - 359.999).abs() < 1e-3);
/// ```
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Same as [`normalize_degrees`] for `f64` angles (geographic math).
pub fn normalize_degrees_f64(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Extension trait for Vector3 operations
pub trait Vector3Ext {
    /// Normalize the vector, returning zero vector if magnitude is zero
    fn safe_normalize(&self) -> Vector3<f32>;

    /// True when every component is finite
    fn is_finite(&self) -> bool;
}

impl Vector3Ext for Vector3<f32> {
    fn safe_normalize(&self) -> Vector3<f32> {
        let mag = self.magnitude();
        if mag > 0.0 {
            *self / mag
        } else {
            Vector3::zeros()
        }
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|c| c.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_degrees_wraps_negative() {
        let wrapped = normalize_degrees(-0.001);
        assert!((wrapped - 359.999).abs() < 1e-3);
        assert!(wrapped < 360.0);
    }

    #[test]
    fn test_normalize_degrees_range() {
        for raw in [-720.0, -360.0, -180.5, 0.0, 359.999, 360.0, 1080.25] {
            let wrapped = normalize_degrees(raw);
            assert!(
                (0.0..360.0).contains(&wrapped),
                "{raw} normalized to {wrapped}"
            );
        }
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
    }

    #[test]
    fn test_normalize_tiny_negative_does_not_reach_360() {
        // -1e-8 + 360 rounds to 360.0 in f32
        let wrapped = normalize_degrees(-1e-8);
        assert!((0.0..360.0).contains(&wrapped));
    }

    #[test]
    fn test_vector_extensions() {
        let v = Vector3::new(3.0f32, 4.0, 0.0);
        let normalized = v.safe_normalize();
        assert!((normalized.magnitude() - 1.0).abs() < 1e-6);
        assert_eq!(Vector3::<f32>::zeros().safe_normalize(), Vector3::zeros());

        assert!(v.is_finite());
        assert!(!Vector3::new(f32::NAN, 0.0, 0.0).is_finite());
    }
}
