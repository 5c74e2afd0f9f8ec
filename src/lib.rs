//! Compass Engine - turns accelerometer and magnetometer samples into a compass heading
//!
//! The engine low-pass filters the gravity and geomagnetic vectors, solves the
//! device rotation matrix from them, and reports the heading of the top of the
//! screen relative to magnetic north. With a target set, it also reports the
//! heading relative to the great-circle bearing from the user to the target, so
//! a second needle can point at a destination.
//!
//! # Features
//!
//! - Exponential smoothing of both sensor streams
//! - Rotation matrix, pitch, roll and magnetic inclination from gravity and field
//! - Great-circle initial bearing between geographic points
//! - North/target state machine with NaN-safe target heading
//! - Screen rotation remapping for landscape layouts
//! - Thread-safe engine: concurrent sensor producers, synchronous stop
//!
//! # Quick Start
//!
//! ```rust
//! use compass_engine::{CompassEngine, EngineSettings, FnListener, GeoPoint, SensorEvent};
//!
//! let engine = CompassEngine::manual(EngineSettings::default());
//! engine.set_listener(FnListener::new(
//!     |azimuth| println!("north: {azimuth:.1}°"),
//!     |dazimuth| println!("target: {dazimuth:.1}°"),
//! ));
//!
//! engine.set_user_position(GeoPoint::new(52.2297, 21.0122));   // Warsaw
//! engine.set_target_position(GeoPoint::new(40.7128, -74.0060)); // New York
//! engine.set_target(true);
//! engine.start().unwrap();
//!
//! // Forward platform sensor callbacks
//! engine.on_sensor_changed(SensorEvent::accelerometer(0.0, 0.0, 9.81)); // m/s²
//! engine.on_sensor_changed(SensorEvent::magnetic_field(0.0, 22.0, -41.0)); // µT
//!
//! engine.stop();
//! ```

pub mod axes;
pub mod bearing;
pub mod cardinal;
pub mod coordinator;
pub mod engine;
pub mod error;
pub mod listener;
mod math;
pub mod orientation;
pub mod smoothing;
mod types;

// Re-export all public types and functions
pub use axes::ScreenRotation;
pub use bearing::{GeoPoint, bearing};
pub use cardinal::{CardinalDirection, format_heading};
pub use coordinator::{HeadingCoordinator, HeadingUpdate, TargetMode};
pub use engine::{CompassEngine, ManualSource, SampleSink, SensorSource};
pub use error::{EngineError, EngineResult, Unsolvable};
pub use listener::{ChannelListener, CompassListener, FnListener, HeadingEvent};
pub use math::{DEG_TO_RAD, RAD_TO_DEG, STANDARD_GRAVITY, Vector3Ext, normalize_degrees};
pub use orientation::{Orientation, RotationMatrix, SolverLimits, solve};
pub use smoothing::{SmoothingState, smooth};
pub use types::*;
