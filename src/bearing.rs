//! Great-circle initial bearing between geographic points

use serde::{Deserialize, Serialize};

use crate::math::normalize_degrees_f64;

/// A latitude/longitude pair in degrees
///
/// # Example
/// ```
/// use compass_engine::GeoPoint;
///
/// let warsaw = GeoPoint::new(52.2297, 21.0122);
/// assert!(warsaw.is_finite());
/// assert_eq!(GeoPoint::default(), GeoPoint::new(0.0, 0.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Initial bearing from this point toward `other`
    pub fn bearing_to(&self, other: &GeoPoint) -> f64 {
        bearing(*self, *other)
    }
}

/// Initial bearing (forward azimuth) of the great circle from `start` to `end`
///
/// Clockwise from true north, in degrees within `[0, 360)`. This is the
/// direction to set off in, not a constant rhumb-line course.
///
/// `bearing(p, p)` is exactly `0.0`: both atan2 arguments evaluate to `+0.0`.
/// Non-finite coordinates propagate as NaN; callers decide what to skip.
///
/// # Example
/// ```
/// use compass_engine::{GeoPoint, bearing};
///
/// let origin = GeoPoint::new(0.0, 0.0);
/// assert!((bearing(origin, GeoPoint::new(0.0, 90.0)) - 90.0).abs() < 1e-9);
/// assert!(bearing(origin, GeoPoint::new(90.0, 0.0)).abs() < 1e-9);
/// ```
pub fn bearing(start: GeoPoint, end: GeoPoint) -> f64 {
    let latitude1 = start.latitude.to_radians();
    let latitude2 = end.latitude.to_radians();
    let longitude_diff = (end.longitude - start.longitude).to_radians();

    let y = longitude_diff.sin() * latitude2.cos();
    let x = latitude1.cos() * latitude2.sin() - latitude1.sin() * latitude2.cos() * longitude_diff.cos();

    normalize_degrees_f64(y.atan2(x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const WARSAW: GeoPoint = GeoPoint::new(52.2297, 21.0122);
    const NEW_YORK: GeoPoint = GeoPoint::new(40.7128, -74.0060);
    const LONDON: GeoPoint = GeoPoint::new(51.5074, -0.1278);
    const TOKYO: GeoPoint = GeoPoint::new(35.6762, 139.6503);

    #[test]
    fn test_same_point_is_zero() {
        for point in [GeoPoint::default(), WARSAW, TOKYO, GeoPoint::new(-33.9, 151.2)] {
            assert_eq!(bearing(point, point), 0.0, "bearing({point:?}, itself)");
        }
    }

    #[test]
    fn test_axis_aligned_bearings() {
        let origin = GeoPoint::new(0.0, 0.0);
        assert_abs_diff_eq!(bearing(origin, GeoPoint::new(0.0, 90.0)), 90.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bearing(origin, GeoPoint::new(90.0, 0.0)), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bearing(origin, GeoPoint::new(0.0, -1.0)), 270.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bearing(origin, GeoPoint::new(-1.0, 0.0)), 180.0, epsilon = 1e-9);
    }

    #[test]
    fn test_city_pairs_match_reference() {
        // References computed with the n-vector method
        assert_abs_diff_eq!(bearing(WARSAW, NEW_YORK), 300.900835, epsilon = 1e-3);
        assert_abs_diff_eq!(bearing(NEW_YORK, WARSAW), 43.896561, epsilon = 1e-3);
        assert_abs_diff_eq!(bearing(LONDON, TOKYO), 31.726451, epsilon = 1e-3);
        assert_abs_diff_eq!(bearing(TOKYO, LONDON), 336.238937, epsilon = 1e-3);
    }

    #[test]
    fn test_bearing_is_not_reciprocal() {
        // On a sphere the return course is not the forward course reversed
        let forward = bearing(WARSAW, NEW_YORK);
        let back = bearing(NEW_YORK, WARSAW);
        assert!((normalize_degrees_f64(forward - 180.0) - back).abs() > 1.0);
        assert!((forward - (180.0 - back)).abs() > 1.0);
    }

    #[test]
    fn test_bearing_range() {
        for lat in (-80..=80).step_by(20) {
            for lon in (-180..=180).step_by(45) {
                let b = bearing(LONDON, GeoPoint::new(lat as f64, lon as f64));
                assert!((0.0..360.0).contains(&b), "bearing {b} out of range");
            }
        }
    }

    #[test]
    fn test_nan_propagates() {
        assert!(bearing(GeoPoint::new(f64::NAN, 0.0), WARSAW).is_nan());
        assert!(WARSAW.bearing_to(&GeoPoint::new(0.0, f64::NAN)).is_nan());
        assert!(!GeoPoint::new(f64::NAN, 0.0).is_finite());
    }

    #[test]
    fn test_geo_point_serde_field_names() {
        let json = serde_json::to_string(&WARSAW).unwrap();
        assert!(json.contains("\"latitude\""));
        assert!(json.contains("\"longitude\""));
        let parsed: GeoPoint = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, WARSAW);
    }
}
