//! Error types for the compass engine

use thiserror::Error;

use crate::types::SensorKind;

/// Reasons the orientation solver could not produce a heading for a tick.
///
/// These never reach listeners; the coordinator skips the tick and waits
/// for the next sample.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum Unsolvable {
    /// Gravity estimate too small: free fall, or no accelerometer data yet
    #[error("gravity magnitude {magnitude} below free-fall threshold")]
    FreeFall { magnitude: f32 },

    /// Gravity and geomagnetic vectors (near-)collinear, or no field data yet
    #[error("gravity and geomagnetic vectors are degenerate (cross magnitude {magnitude})")]
    Degenerate { magnitude: f32 },

    /// A component of either input is NaN or infinite
    #[error("non-finite sensor vector")]
    NonFinite,
}

/// Errors surfaced by the engine lifecycle
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("sensor not available: {0:?}")]
    SensorUnavailable(SensorKind),

    #[error("sensor registration failed: {0}")]
    RegistrationFailed(String),
}

/// Result type for engine lifecycle operations
pub type EngineResult<T> = Result<T, EngineError>;
