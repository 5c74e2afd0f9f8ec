//! Orientation solver: rotation matrix and heading from gravity and geomagnetic vectors
//!
//! The world frame is East-North-Up. The heading (azimuth) is the angle
//! between magnetic north and the device Y axis, i.e. the top of the screen
//! in the device's natural orientation, increasing clockwise.

use nalgebra::{Matrix3, Vector3};

use crate::error::Unsolvable;
use crate::math::{RAD_TO_DEG, STANDARD_GRAVITY, Vector3Ext, normalize_degrees};

/// Default free-fall threshold in m/s² (a tenth of standard gravity)
pub const DEFAULT_FREE_FALL_THRESHOLD: f32 = 0.1 * STANDARD_GRAVITY;

/// Default minimum magnitude of `geomagnetic × gravity`
pub const DEFAULT_MIN_FIELD_CROSS: f32 = 0.1;

/// Thresholds that decide when the rotation matrix is solvable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolverLimits {
    /// Minimum gravity magnitude in m/s²
    pub free_fall_threshold: f32,
    /// Minimum magnitude of the unnormalized east vector
    pub min_field_cross: f32,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            free_fall_threshold: DEFAULT_FREE_FALL_THRESHOLD,
            min_field_cross: DEFAULT_MIN_FIELD_CROSS,
        }
    }
}

/// Device rotation relative to the East-North-Up world frame
///
/// Rows are the world east, north and up axes expressed in device
/// coordinates, so `R * device_vector` yields world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationMatrix {
    matrix: Matrix3<f32>,
    inclination: f32,
}

impl RotationMatrix {
    /// Build the rotation matrix from gravity and geomagnetic vectors
    ///
    /// `gravity` is the accelerometer reading at rest (pointing up in device
    /// coordinates), in m/s². `geomagnetic` is the magnetometer reading in µT.
    pub fn from_vectors(
        gravity: Vector3<f32>,
        geomagnetic: Vector3<f32>,
        limits: SolverLimits,
    ) -> Result<Self, Unsolvable> {
        if !gravity.is_finite() || !geomagnetic.is_finite() {
            return Err(Unsolvable::NonFinite);
        }

        let gravity_magnitude = gravity.magnitude();
        if gravity_magnitude < limits.free_fall_threshold {
            return Err(Unsolvable::FreeFall {
                magnitude: gravity_magnitude,
            });
        }

        // East: geomagnetic × gravity
        let east = geomagnetic.cross(&gravity);
        let east_magnitude = east.magnitude();
        if east_magnitude < limits.min_field_cross {
            return Err(Unsolvable::Degenerate {
                magnitude: east_magnitude,
            });
        }
        let east = east / east_magnitude;
        let up = gravity / gravity_magnitude;

        // North: up × east, already unit length
        let north = up.cross(&east);

        let matrix = Matrix3::from_rows(&[east.transpose(), north.transpose(), up.transpose()]);

        // Dip of the field below the horizontal plane
        let field = geomagnetic.safe_normalize();
        let inclination = field.dot(&up).atan2(field.dot(&north));

        Ok(Self {
            matrix,
            inclination,
        })
    }

    /// Underlying 3x3 matrix
    pub fn matrix(&self) -> &Matrix3<f32> {
        &self.matrix
    }

    /// Azimuth, pitch and roll in radians
    pub fn orientation(&self) -> Orientation {
        let r = &self.matrix;
        Orientation {
            azimuth: r[(0, 1)].atan2(r[(1, 1)]),
            pitch: (-r[(2, 1)]).clamp(-1.0, 1.0).asin(),
            roll: (-r[(2, 0)]).atan2(r[(2, 2)]),
            inclination: self.inclination,
        }
    }

    /// Magnetic inclination (dip angle) in radians, negative when the field
    /// points below the horizon
    pub fn inclination(&self) -> f32 {
        self.inclination
    }
}

/// Device orientation angles, all in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// Rotation about the up axis, 0 = north, clockwise positive, `(-π, π]`
    pub azimuth: f32,
    /// Rotation about the device X axis, `[-π/2, π/2]`
    pub pitch: f32,
    /// Rotation about the device Y axis, `(-π, π]`
    pub roll: f32,
    /// Magnetic field dip angle
    pub inclination: f32,
}

impl Orientation {
    /// Azimuth converted to compass degrees in `[0, 360)`
    pub fn heading_degrees(&self) -> f32 {
        normalize_degrees(self.azimuth * RAD_TO_DEG)
    }
}

/// Solve the compass heading with default limits
///
/// # Returns
/// Heading in degrees, `[0, 360)`, or the reason it could not be solved
///
/// # Example
/// ```
/// use nalgebra::Vector3;
/// use compass_engine::solve;
///
/// let gravity = Vector3::new(0.0, 0.0, 9.81);      // Lying flat
/// let field = Vector3::new(0.0, 22.0, -41.0);      // Top of screen faces north
/// let heading = solve(gravity, field).unwrap();
/// assert!(heading.abs() < 1e-3);
///
/// assert!(solve(Vector3::zeros(), field).is_err());
/// ```
pub fn solve(gravity: Vector3<f32>, geomagnetic: Vector3<f32>) -> Result<f32, Unsolvable> {
    solve_with_limits(gravity, geomagnetic, SolverLimits::default())
}

/// Solve the compass heading with explicit limits
pub fn solve_with_limits(
    gravity: Vector3<f32>,
    geomagnetic: Vector3<f32>,
    limits: SolverLimits,
) -> Result<f32, Unsolvable> {
    let rotation = RotationMatrix::from_vectors(gravity, geomagnetic, limits)?;
    Ok(rotation.orientation().heading_degrees())
}
