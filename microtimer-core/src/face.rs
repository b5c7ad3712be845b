//! The contract between a watch face and the host that schedules it.

use crate::sound::SequenceStep;

/// Wall-clock time in seconds since the Unix epoch.
pub type Timestamp = u64;

/// Identifies a face to the host scheduler. Wake-ups are keyed by it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct FaceId(pub usize);

/// Discrete events the host delivers to the active face.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Event {
    /// The face just became visible.
    Activate,
    /// Periodic tick at the most recently requested frequency.
    Tick,
    AlarmButtonUp,
    AlarmLongPress,
    /// A scheduled wake-up for this face came due.
    BackgroundTask,
    ModeButtonUp,
    LightButtonDown,
    /// No input for a while; the host may return to its first face.
    Timeout,
}

/// Rendering primitives of a 10-position segment display.
pub trait SegmentDisplay {
    fn display_string(&mut self, text: &str, position: usize);
    fn set_colon(&mut self);
    fn clear_colon(&mut self);
    fn set_pixel(&mut self, x: u8, y: u8);
}

/// Services the host provides to a face while it handles an event.
pub trait Movement: SegmentDisplay {
    fn current_time(&self) -> Timestamp;
    /// Ask for ticks at `hz`. Holds for all later ticks until changed again.
    fn request_tick_frequency(&mut self, hz: u8);
    /// Arm a wake-up at an absolute time, replacing any pending one for `owner`.
    fn schedule_wakeup(&mut self, owner: FaceId, at: Timestamp);
    fn cancel_wakeup(&mut self, owner: FaceId);
    fn play_alarm_sound(&mut self, sequence: &'static [SequenceStep]);
    /// Standard handling for events a face does not care about.
    fn default_loop_handler(&mut self, event: Event);
}

/// Entry points the host calls at face lifecycle points.
pub trait WatchFace {
    fn on_create(&mut self, host: &mut dyn Movement);
    fn on_activate(&mut self, host: &mut dyn Movement);
    /// Handle one event. Returns whether the device may go back to sleep.
    fn on_event(&mut self, event: Event, host: &mut dyn Movement) -> bool;
    fn on_deactivate(&mut self, host: &mut dyn Movement);
}
