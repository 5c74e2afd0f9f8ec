//! Compass engine: lifecycle, sensor registration and exclusive access to the coordinator

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, info, trace, warn};

use crate::bearing::GeoPoint;
use crate::coordinator::{HeadingCoordinator, TargetMode};
use crate::error::EngineResult;
use crate::listener::CompassListener;
use crate::orientation::Orientation;
use crate::types::{EngineSettings, HeadingState, SensorDelay, SensorEvent, SensorKind};

/// Sensors the engine registers on start
pub const REQUIRED_SENSORS: [SensorKind; 2] = [SensorKind::Accelerometer, SensorKind::MagneticField];

/// Platform seam delivering motion sensor samples
///
/// `register` hands the source a [`SampleSink`] to push samples into, from
/// any thread. `unregister_all` must be synchronous: once it returns, the
/// source no longer calls any sink it was given.
pub trait SensorSource: Send {
    fn register(&mut self, kind: SensorKind, delay: SensorDelay, sink: SampleSink) -> EngineResult<()>;

    fn unregister_all(&mut self);
}

/// Source for hosts that push samples through [`CompassEngine::on_sensor_changed`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ManualSource;

impl SensorSource for ManualSource {
    fn register(&mut self, _kind: SensorKind, _delay: SensorDelay, _sink: SampleSink) -> EngineResult<()> {
        Ok(())
    }

    fn unregister_all(&mut self) {}
}

struct EngineState {
    coordinator: HeadingCoordinator,
    listener: Option<Box<dyn CompassListener>>,
    running: bool,
}

struct Shared {
    state: Mutex<EngineState>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, EngineState> {
        lock(&self.state)
    }

    /// Smooth, solve and emit under one lock
    fn handle(&self, event: SensorEvent) {
        let mut state = self.lock();
        if !state.running {
            trace!("dropping {:?} sample, engine stopped", event.kind);
            return;
        }

        let EngineState {
            coordinator,
            listener,
            ..
        } = &mut *state;
        if let Some(update) = coordinator.process(event) {
            if let Some(listener) = listener.as_deref() {
                update.dispatch(listener);
            }
        }
    }
}

/// Handle a sensor source pushes samples into
///
/// Cheap to clone. Holds the engine weakly, so a source that outlives the
/// engine just drops its samples.
#[derive(Clone)]
pub struct SampleSink {
    shared: Weak<Shared>,
}

impl SampleSink {
    pub fn deliver(&self, event: SensorEvent) {
        if let Some(shared) = self.shared.upgrade() {
            shared.handle(event);
        }
    }
}

/// Orientation engine
///
/// Owns a [`HeadingCoordinator`] behind a mutex. Every sample runs the full
/// smooth, solve and emit sequence while holding it, so samples from
/// concurrent accelerometer and magnetometer threads are processed one at a
/// time.
///
/// # Example
/// ```
/// use compass_engine::{ChannelListener, CompassEngine, EngineSettings, HeadingEvent, SensorEvent};
///
/// let engine = CompassEngine::manual(EngineSettings::default());
/// let (listener, events) = ChannelListener::unbounded();
/// engine.set_listener(listener);
/// engine.start().unwrap();
///
/// for _ in 0..20 {
///     engine.on_sensor_changed(SensorEvent::accelerometer(0.0, 0.0, 9.81));
///     engine.on_sensor_changed(SensorEvent::magnetic_field(-22.0, 0.0, -41.0));
/// }
/// engine.stop();
///
/// let last = events.try_iter().last().unwrap();
/// assert!(matches!(last, HeadingEvent::Azimuth(a) if (a - 90.0).abs() < 0.01));
/// ```
pub struct CompassEngine {
    shared: Arc<Shared>,
    source: Mutex<Box<dyn SensorSource>>,
}

impl CompassEngine {
    /// Create a stopped engine attached to a sensor source
    pub fn new<S: SensorSource + 'static>(source: S, settings: EngineSettings) -> Self {
        let state = EngineState {
            coordinator: HeadingCoordinator::new(settings),
            listener: None,
            running: false,
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
            }),
            source: Mutex::new(Box::new(source)),
        }
    }

    /// Engine fed through [`CompassEngine::on_sensor_changed`]
    pub fn manual(settings: EngineSettings) -> Self {
        Self::new(ManualSource, settings)
    }

    /// Register with the sensor source
    ///
    /// Starting a running engine is a no-op. If a sensor cannot be
    /// registered, everything registered so far is undone and the engine
    /// stays stopped. Samples delivered before every sensor is registered
    /// are dropped.
    pub fn start(&self) -> EngineResult<()> {
        let mut source = lock(&self.source);
        let delay = {
            let state = self.shared.lock();
            if state.running {
                debug!("compass engine already started");
                return Ok(());
            }
            state.coordinator.settings().sensor_delay
        };

        for kind in REQUIRED_SENSORS {
            if let Err(err) = source.register(kind, delay, self.sink()) {
                warn!("failed to register {kind:?}: {err}");
                source.unregister_all();
                return Err(err);
            }
        }

        self.shared.lock().running = true;
        info!("compass engine started ({delay:?})");
        Ok(())
    }

    /// Unregister from the sensor source
    ///
    /// No listener is called once this returns. Safe to call when not started.
    pub fn stop(&self) {
        let mut source = lock(&self.source);
        {
            let mut state = self.shared.lock();
            if !state.running {
                debug!("compass engine not running");
                return;
            }
            state.running = false;
        }
        source.unregister_all();
        info!("compass engine stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shared.lock().running
    }

    /// New sink feeding this engine
    pub fn sink(&self) -> SampleSink {
        SampleSink {
            shared: Arc::downgrade(&self.shared),
        }
    }

    /// Process one sample; ignored while stopped
    pub fn on_sensor_changed(&self, event: SensorEvent) {
        self.shared.handle(event);
    }

    pub fn set_listener<L: CompassListener + 'static>(&self, listener: L) {
        self.shared.lock().listener = Some(Box::new(listener));
    }

    pub fn clear_listener(&self) {
        self.shared.lock().listener = None;
    }

    pub fn set_target(&self, active: bool) {
        self.shared.lock().coordinator.set_target(active);
    }

    pub fn target_mode(&self) -> TargetMode {
        self.shared.lock().coordinator.mode()
    }

    pub fn set_user_position(&self, position: GeoPoint) {
        self.shared.lock().coordinator.set_user_position(position);
    }

    pub fn set_target_position(&self, position: GeoPoint) {
        self.shared.lock().coordinator.set_target_position(position);
    }

    pub fn set_azimuth_fix(&self, fix: f32) {
        self.shared.lock().coordinator.set_azimuth_fix(fix);
    }

    pub fn reset_azimuth_fix(&self) {
        self.shared.lock().coordinator.reset_azimuth_fix();
    }

    pub fn settings(&self) -> EngineSettings {
        self.shared.lock().coordinator.settings()
    }

    /// Replace the settings. A new sensor delay applies on the next start.
    pub fn set_settings(&self, settings: EngineSettings) {
        self.shared.lock().coordinator.set_settings(settings);
    }

    pub fn heading_state(&self) -> HeadingState {
        self.shared.lock().coordinator.heading_state()
    }

    pub fn orientation(&self) -> Option<Orientation> {
        self.shared.lock().coordinator.orientation()
    }
}

impl Drop for CompassEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The guarded data stays consistent across a panicking listener, so a
/// poisoned lock is recovered rather than propagated.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;
    use crate::error::EngineError;
    use crate::listener::ChannelListener;

    #[derive(Default)]
    struct RefusingSource {
        registered: Vec<SensorKind>,
        unregistered: bool,
    }

    impl SensorSource for RefusingSource {
        fn register(&mut self, kind: SensorKind, _delay: SensorDelay, _sink: SampleSink) -> EngineResult<()> {
            match kind {
                SensorKind::Accelerometer => {
                    self.registered.push(kind);
                    Ok(())
                }
                SensorKind::MagneticField => Err(EngineError::SensorUnavailable(kind)),
            }
        }

        fn unregister_all(&mut self) {
            self.unregistered = true;
        }
    }

    #[test]
    fn test_missing_sensor_keeps_engine_stopped() {
        let engine = CompassEngine::new(RefusingSource::default(), EngineSettings::default());
        assert_eq!(
            engine.start(),
            Err(EngineError::SensorUnavailable(SensorKind::MagneticField))
        );
        assert!(!engine.is_running());
    }

    /// Pushes a sample pair from inside `register`, like a platform that
    /// starts dispatching before registration returns
    struct EagerSource {
        busy_magnetometer: Arc<AtomicBool>,
        unregistered: Arc<AtomicUsize>,
    }

    impl SensorSource for EagerSource {
        fn register(&mut self, kind: SensorKind, _delay: SensorDelay, sink: SampleSink) -> EngineResult<()> {
            sink.deliver(SensorEvent::accelerometer(0.0, 0.0, 9.81));
            sink.deliver(SensorEvent::magnetic_field(-22.0, 0.0, -41.0));
            if kind == SensorKind::MagneticField && self.busy_magnetometer.load(Ordering::SeqCst) {
                return Err(EngineError::RegistrationFailed("magnetometer busy".into()));
            }
            Ok(())
        }

        fn unregister_all(&mut self) {
            self.unregistered.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_failed_start_after_warm_session_emits_nothing() {
        let busy = Arc::new(AtomicBool::new(false));
        let unregistered = Arc::new(AtomicUsize::new(0));
        let engine = CompassEngine::new(
            EagerSource {
                busy_magnetometer: Arc::clone(&busy),
                unregistered: Arc::clone(&unregistered),
            },
            EngineSettings::default(),
        );
        let (listener, events) = ChannelListener::unbounded();
        engine.set_listener(listener);

        engine.start().unwrap();
        // Samples pushed during registration never reach the estimates
        assert_eq!(engine.shared.lock().coordinator.smoothing().gravity(), nalgebra::Vector3::zeros());
        assert_eq!(events.try_iter().count(), 0);

        for _ in 0..20 {
            engine.on_sensor_changed(SensorEvent::accelerometer(0.0, 0.0, 9.81));
            engine.on_sensor_changed(SensorEvent::magnetic_field(-22.0, 0.0, -41.0));
        }
        assert!(events.try_iter().count() > 0);
        engine.stop();

        busy.store(true, Ordering::SeqCst);
        let err = engine.start().unwrap_err();
        assert_eq!(err, EngineError::RegistrationFailed("magnetometer busy".into()));
        assert_eq!(err.to_string(), "sensor registration failed: magnetometer busy");
        assert!(!engine.is_running());
        assert_eq!(unregistered.load(Ordering::SeqCst), 2);
        assert_eq!(events.try_iter().count(), 0);
    }

    #[test]
    fn test_stop_before_start_is_noop() {
        let engine = CompassEngine::manual(EngineSettings::default());
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());
    }

    #[test]
    fn test_samples_ignored_while_stopped() {
        let engine = CompassEngine::manual(EngineSettings::default());
        for _ in 0..20 {
            engine.on_sensor_changed(SensorEvent::accelerometer(0.0, 0.0, 9.81));
        }
        assert_eq!(engine.shared.lock().coordinator.smoothing().gravity(), nalgebra::Vector3::zeros());
    }

    #[test]
    fn test_sink_outliving_engine_is_harmless() {
        let engine = CompassEngine::manual(EngineSettings::default());
        let sink = engine.sink();
        drop(engine);
        sink.deliver(SensorEvent::accelerometer(0.0, 0.0, 9.81));
    }
}
