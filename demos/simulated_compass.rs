use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use compass_engine::{
    ChannelListener, CompassEngine, EngineError, EngineResult, EngineSettings, GeoPoint, HeadingEvent, SampleSink,
    SensorDelay, SensorEvent, SensorKind, SensorSource, format_heading,
};

const TURN_RATE: f32 = 30.0; // deg/s

/// Sensor source with one producer thread per sensor, like a platform
/// dispatching accelerometer and magnetometer callbacks independently.
#[derive(Default)]
struct SimulatedSource {
    running: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl SensorSource for SimulatedSource {
    fn register(&mut self, kind: SensorKind, delay: SensorDelay, sink: SampleSink) -> EngineResult<()> {
        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let period = delay.sampling_period().max(Duration::from_millis(1));
        let started = Instant::now();

        let worker = thread::Builder::new()
            .name(format!("{kind:?}").to_lowercase())
            .spawn(move || {
                while running.load(Ordering::SeqCst) {
                    let heading = (started.elapsed().as_secs_f32() * TURN_RATE).to_radians();
                    let event = match kind {
                        SensorKind::Accelerometer => SensorEvent::accelerometer(0.0, 0.0, 9.81),
                        SensorKind::MagneticField => {
                            SensorEvent::magnetic_field(-22.0 * heading.sin(), 22.0 * heading.cos(), -41.0)
                        }
                    };
                    sink.deliver(event);
                    thread::sleep(period);
                }
            })
            .map_err(|err| EngineError::RegistrationFailed(format!("{kind:?} worker: {err}")))?;
        self.workers.push(worker);
        Ok(())
    }

    fn unregister_all(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

fn main() {
    env_logger::init();

    let engine = CompassEngine::new(SimulatedSource::default(), EngineSettings::default());
    let (listener, events) = ChannelListener::bounded(64);
    engine.set_listener(listener);

    engine.set_user_position(GeoPoint::new(52.2297, 21.0122)); // Warsaw
    engine.set_target_position(GeoPoint::new(40.7128, -74.0060)); // New York
    engine.set_target(true);

    if let Err(err) = engine.start() {
        eprintln!("cannot start compass: {err}");
        return;
    }

    // The UI thread drains updates at its own pace
    let deadline = Instant::now() + Duration::from_secs(3);
    let mut printed = Instant::now();
    while Instant::now() < deadline {
        if let Ok(event) = events.recv_timeout(Duration::from_millis(100)) {
            if printed.elapsed() >= Duration::from_millis(250) {
                match event {
                    HeadingEvent::Azimuth(azimuth) => println!("north  {}", format_heading(azimuth)),
                    HeadingEvent::Dazimuth(dazimuth) => println!("target {dazimuth:.1}°"),
                }
                printed = Instant::now();
            }
        }
    }

    engine.stop();
    println!("final state: {:?}", engine.heading_state());
}
