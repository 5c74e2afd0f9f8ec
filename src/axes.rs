//! Screen rotation remapping
//!
//! Headings are measured along the device Y axis, which is the top of the
//! screen in the device's natural (portrait) orientation. When the UI is
//! rotated, samples are remapped into screen axes before smoothing so the
//! needle keeps pointing along the top of whatever the user is looking at.
//!
//! # Example
//! ```
//! use nalgebra::Vector3;
//! use compass_engine::ScreenRotation;
//!
//! let device = Vector3::new(1.0, 2.0, 3.0);
//!
//! // Landscape, screen top is the device's left edge
//! let screen = ScreenRotation::Rotation90.remap(device);
//!
//! assert_eq!(screen.x, 2.0);   // Screen X = Device Y
//! assert_eq!(screen.y, -1.0);  // Screen Y = -Device X
//! assert_eq!(screen.z, 3.0);   // Screen Z = Device Z
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Rotation of the screen relative to the device's natural orientation,
/// counter-clockwise as reported by the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScreenRotation {
    /// Natural orientation (no remapping)
    #[default]
    Rotation0,
    /// Rotated a quarter turn counter-clockwise
    Rotation90,
    /// Upside down
    Rotation180,
    /// Rotated a quarter turn clockwise
    Rotation270,
}

impl ScreenRotation {
    /// Rotation for a display angle in degrees (0, 90, 180 or 270).
    ///
    /// Returns `None` for any other angle.
    pub fn from_degrees(degrees: u16) -> Option<Self> {
        match degrees {
            0 => Some(ScreenRotation::Rotation0),
            90 => Some(ScreenRotation::Rotation90),
            180 => Some(ScreenRotation::Rotation180),
            270 => Some(ScreenRotation::Rotation270),
            _ => None,
        }
    }

    /// Display angle in degrees
    pub fn degrees(self) -> u16 {
        match self {
            ScreenRotation::Rotation0 => 0,
            ScreenRotation::Rotation90 => 90,
            ScreenRotation::Rotation180 => 180,
            ScreenRotation::Rotation270 => 270,
        }
    }

    /// Express a device-frame sample in screen axes.
    ///
    /// The Z axis always points out of the screen, so only X and Y move.
    #[inline]
    pub fn remap(self, device: Vector3<f32>) -> Vector3<f32> {
        match self {
            ScreenRotation::Rotation0 => device,
            ScreenRotation::Rotation90 => Vector3::new(device.y, -device.x, device.z),
            ScreenRotation::Rotation180 => Vector3::new(-device.x, -device.y, device.z),
            ScreenRotation::Rotation270 => Vector3::new(-device.y, device.x, device.z),
        }
    }
}
