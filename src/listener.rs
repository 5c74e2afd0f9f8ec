//! Heading listeners
//!
//! Listeners run on whichever thread delivered the sensor sample, while the
//! engine lock is held. They must return quickly and must not call back into
//! the engine. [`ChannelListener`] hands events to another thread instead.

use crossbeam::channel::{self, Receiver, Sender, TrySendError};

/// Receiver of heading updates
pub trait CompassListener: Send {
    /// Heading relative to magnetic north, `[0, 360)`, on every solved tick
    fn on_new_azimuth(&self, azimuth: f32);

    /// Heading relative to the target bearing, `[0, 360)`, on every solved
    /// tick while a target is active
    fn on_new_dazimuth(&self, dazimuth: f32);
}

/// Heading update as a tagged value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingEvent {
    Azimuth(f32),
    Dazimuth(f32),
}

impl HeadingEvent {
    pub fn degrees(&self) -> f32 {
        match *self {
            HeadingEvent::Azimuth(degrees) | HeadingEvent::Dazimuth(degrees) => degrees,
        }
    }
}

/// Listener built from two closures
///
/// # Example
/// ```
/// use compass_engine::{CompassListener, FnListener};
///
/// let listener = FnListener::new(
///     |azimuth| println!("north at {azimuth}"),
///     |dazimuth| println!("target at {dazimuth}"),
/// );
/// listener.on_new_azimuth(10.0);
/// ```
pub struct FnListener<A, D> {
    on_azimuth: A,
    on_dazimuth: D,
}

impl<A, D> FnListener<A, D>
where
    A: Fn(f32) + Send,
    D: Fn(f32) + Send,
{
    pub fn new(on_azimuth: A, on_dazimuth: D) -> Self {
        Self {
            on_azimuth,
            on_dazimuth,
        }
    }
}

impl<A, D> CompassListener for FnListener<A, D>
where
    A: Fn(f32) + Send,
    D: Fn(f32) + Send,
{
    fn on_new_azimuth(&self, azimuth: f32) {
        (self.on_azimuth)(azimuth)
    }

    fn on_new_dazimuth(&self, dazimuth: f32) {
        (self.on_dazimuth)(dazimuth)
    }
}

/// Listener that forwards events over a crossbeam channel
///
/// The sensor thread never blocks on it: with a bounded channel, events are
/// dropped while the receiver is full.
pub struct ChannelListener {
    sender: Sender<HeadingEvent>,
}

impl ChannelListener {
    /// Unbounded channel
    pub fn unbounded() -> (Self, Receiver<HeadingEvent>) {
        let (sender, receiver) = channel::unbounded();
        (Self { sender }, receiver)
    }

    /// Bounded channel holding at most `capacity` pending events
    pub fn bounded(capacity: usize) -> (Self, Receiver<HeadingEvent>) {
        let (sender, receiver) = channel::bounded(capacity);
        (Self { sender }, receiver)
    }

    fn forward(&self, event: HeadingEvent) {
        match self.sender.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => log::trace!("heading channel full, dropping {event:?}"),
            Err(TrySendError::Disconnected(_)) => {
                log::trace!("heading receiver gone, dropping {event:?}")
            }
        }
    }
}

impl CompassListener for ChannelListener {
    fn on_new_azimuth(&self, azimuth: f32) {
        self.forward(HeadingEvent::Azimuth(azimuth));
    }

    fn on_new_dazimuth(&self, dazimuth: f32) {
        self.forward(HeadingEvent::Dazimuth(dazimuth));
    }
}
