//! Heading coordinator: north/target state machine over the smoothed sensor stream

use log::{debug, trace};

use crate::bearing::{GeoPoint, bearing};
use crate::listener::CompassListener;
use crate::math::{RAD_TO_DEG, Vector3Ext, normalize_degrees};
use crate::orientation::{Orientation, RotationMatrix, SolverLimits};
use crate::smoothing::SmoothingState;
use crate::types::{EngineSettings, HeadingState, SensorEvent};

/// What the needle points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetMode {
    /// Only the north heading is produced
    #[default]
    North,
    /// North heading plus heading toward the target position
    Target,
}

/// Outputs of one solved tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingUpdate {
    /// Heading relative to magnetic north, `[0, 360)`
    pub azimuth: f32,
    /// Heading relative to the target bearing, present in target mode
    pub dazimuth: Option<f32>,
}

impl HeadingUpdate {
    /// Notify a listener, target heading first
    pub fn dispatch(&self, listener: &dyn CompassListener) {
        if let Some(dazimuth) = self.dazimuth {
            listener.on_new_dazimuth(dazimuth);
        }
        listener.on_new_azimuth(self.azimuth);
    }
}

/// Owns the smoothing state, positions and mode, and turns sensor events
/// into heading updates.
///
/// Not synchronized on its own; the engine keeps it behind a mutex.
///
/// # Example
/// ```
/// use compass_engine::{EngineSettings, GeoPoint, HeadingCoordinator, SensorEvent};
///
/// let mut coordinator = HeadingCoordinator::new(EngineSettings::default());
/// coordinator.set_target_position(GeoPoint::new(0.0, 1.0));
/// coordinator.set_target(true);
///
/// let mut last = None;
/// for _ in 0..20 {
///     coordinator.process(SensorEvent::accelerometer(0.0, 0.0, 9.81));
///     last = coordinator.process(SensorEvent::magnetic_field(0.0, 22.0, -41.0));
/// }
///
/// let update = last.unwrap();
/// assert!(update.azimuth < 0.01 || update.azimuth > 359.99);
/// assert!((update.dazimuth.unwrap() - 270.0).abs() < 0.01);
/// ```
#[derive(Debug, Clone)]
pub struct HeadingCoordinator {
    settings: EngineSettings,
    smoothing: SmoothingState,
    mode: TargetMode,
    user_position: GeoPoint,
    target_position: GeoPoint,
    heading: HeadingState,
    orientation: Option<Orientation>,
}

impl Default for HeadingCoordinator {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl HeadingCoordinator {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            smoothing: SmoothingState::new(settings.smoothing_factor),
            mode: TargetMode::North,
            user_position: GeoPoint::default(),
            target_position: GeoPoint::default(),
            heading: HeadingState::default(),
            orientation: None,
        }
    }

    /// Replace the settings; smoothed estimates are kept
    pub fn set_settings(&mut self, settings: EngineSettings) {
        self.settings = settings;
        self.smoothing.set_alpha(settings.smoothing_factor);
    }

    pub fn settings(&self) -> EngineSettings {
        self.settings
    }

    /// Switch between north and target mode. Idempotent.
    pub fn set_target(&mut self, active: bool) {
        let mode = if active {
            TargetMode::Target
        } else {
            TargetMode::North
        };
        if mode != self.mode {
            debug!("target mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.heading.target_active = active;
    }

    pub fn mode(&self) -> TargetMode {
        self.mode
    }

    pub fn is_target_active(&self) -> bool {
        self.mode == TargetMode::Target
    }

    /// Last known position of the user; used from the next tick on
    pub fn set_user_position(&mut self, position: GeoPoint) {
        debug!("user position {position:?}");
        self.user_position = position;
    }

    /// Destination the needle should point at; used from the next tick on
    pub fn set_target_position(&mut self, position: GeoPoint) {
        debug!("target position {position:?}");
        self.target_position = position;
    }

    pub fn user_position(&self) -> GeoPoint {
        self.user_position
    }

    pub fn target_position(&self) -> GeoPoint {
        self.target_position
    }

    /// Constant correction in degrees added to every solved heading
    pub fn set_azimuth_fix(&mut self, fix: f32) {
        self.settings.azimuth_fix = fix;
    }

    pub fn reset_azimuth_fix(&mut self) {
        self.set_azimuth_fix(0.0);
    }

    pub fn azimuth_fix(&self) -> f32 {
        self.settings.azimuth_fix
    }

    /// Last emitted headings and the mode flag
    pub fn heading_state(&self) -> HeadingState {
        self.heading
    }

    /// Orientation from the last solved tick
    pub fn orientation(&self) -> Option<Orientation> {
        self.orientation
    }

    pub fn smoothing(&self) -> &SmoothingState {
        &self.smoothing
    }

    /// Clear the smoothed estimates and last orientation
    pub fn reset(&mut self) {
        self.smoothing.reset();
        self.orientation = None;
    }

    /// Fold one sensor sample in and solve the heading
    ///
    /// Returns `None` when the tick produced nothing to report: the sample
    /// was not finite, the vectors are not solvable yet, or the heading came
    /// out non-finite. Non-finite samples are not folded into the estimates.
    pub fn process(&mut self, event: SensorEvent) -> Option<HeadingUpdate> {
        if !event.values.is_finite() {
            trace!("dropping non-finite {:?} sample", event.kind);
            return None;
        }
        let sample = self.settings.screen_rotation.remap(event.values);
        self.smoothing.update(event.kind, sample);

        let limits = SolverLimits {
            free_fall_threshold: self.settings.free_fall_threshold,
            min_field_cross: self.settings.min_field_cross,
        };
        let rotation = match RotationMatrix::from_vectors(
            self.smoothing.gravity(),
            self.smoothing.geomagnetic(),
            limits,
        ) {
            Ok(rotation) => rotation,
            Err(reason) => {
                trace!("skipping {:?} tick: {reason}", event.kind);
                return None;
            }
        };

        let orientation = rotation.orientation();
        let azimuth = normalize_degrees(orientation.azimuth * RAD_TO_DEG + self.settings.azimuth_fix);
        if !azimuth.is_finite() {
            trace!("skipping tick with non-finite azimuth");
            return None;
        }

        self.orientation = Some(orientation);
        self.heading.azimuth = azimuth;

        let dazimuth = match self.mode {
            TargetMode::North => None,
            TargetMode::Target => self.target_heading(azimuth),
        };
        if let Some(dazimuth) = dazimuth {
            self.heading.dazimuth = dazimuth;
        }

        Some(HeadingUpdate { azimuth, dazimuth })
    }

    /// Heading minus the bearing from the user to the target
    fn target_heading(&self, azimuth: f32) -> Option<f32> {
        let target_bearing = bearing(self.user_position, self.target_position);
        let dazimuth = normalize_degrees((f64::from(azimuth) - target_bearing) as f32);
        if dazimuth.is_finite() {
            Some(dazimuth)
        } else {
            debug!(
                "skipping target heading, bearing {target_bearing} from {:?} to {:?}",
                self.user_position, self.target_position
            );
            None
        }
    }
}
