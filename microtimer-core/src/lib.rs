//! Pure timing logic for the MicroTimer face, with no platform dependencies.
//! Testable on host, usable on Xous target.
//!
//! Press the add button repeatedly to pick an amount of time. The amount for the
//! current press shows until input pauses, then it is added to the running countdown
//! and a wake-up is scheduled for the moment it reaches zero.

mod controller;
mod face;
mod render;
mod sound;

pub use controller::MicroTimer;
pub use face::{Event, FaceId, Movement, SegmentDisplay, Timestamp, WatchFace};
pub use render::{DayField, Frame, MAX_DISPLAY_DAYS};
pub use sound::{flatten_sequence, BuzzerNote, SequenceStep, ALARM_SEQUENCE, BUZZER_TICK_HZ};

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;
const SECS_PER_DAY: u64 = 24 * SECS_PER_HOUR;

/// Seconds added for each step of a burst. Index 0 is unused so that the
/// step number indexes the table directly.
const STEP_TABLE: [u64; 11] = [
    0,    // unused
    30,   //    :30
    60,   //   1:00
    120,  //   2:00
    180,  //   3:00
    240,  //   4:00
    300,  //   5:00
    600,  //  10:00
    900,  //  15:00
    1200, //  20:00
    1800, //  30:00
];

/// Timing knobs for the accumulate/settle cycle.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Config {
    /// Ticks without a press before a burst is committed.
    pub settle_ticks: u16,
    /// Tick rate requested while a burst is in progress.
    pub accumulate_tick_hz: u8,
    /// Tick rate requested once the burst is committed.
    pub normal_tick_hz: u8,
}

impl Default for Config {
    fn default() -> Self {
        // 8 ticks at 8 Hz: about one second of quiet commits the burst
        Self {
            settle_ticks: 8,
            accumulate_tick_hz: 8,
            normal_tick_hz: 1,
        }
    }
}

/// Seconds to add for the given 1-based step of a burst.
///
/// The first ten steps come from a fixed table (30s up to 30min). Every step
/// past the table adds one more hour, so step 11 is 1h, step 12 is 2h and so on.
pub fn step_duration(step: u32) -> u64 {
    let step = step as u64;
    let table_len = STEP_TABLE.len() as u64;
    if step < table_len {
        STEP_TABLE[step as usize]
    } else {
        (step - table_len + 1) * SECS_PER_HOUR
    }
}

/// A span of seconds broken down for a days + HH:MM:SS display.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct WatchDuration {
    pub days: u64,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
}

impl WatchDuration {
    pub fn from_secs(secs: u64) -> Self {
        Self {
            days: secs / SECS_PER_DAY,
            hours: ((secs % SECS_PER_DAY) / SECS_PER_HOUR) as u8,
            minutes: ((secs % SECS_PER_HOUR) / SECS_PER_MINUTE) as u8,
            seconds: (secs % SECS_PER_MINUTE) as u8,
        }
    }

    pub fn total_secs(&self) -> u64 {
        self.days * SECS_PER_DAY
            + self.hours as u64 * SECS_PER_HOUR
            + self.minutes as u64 * SECS_PER_MINUTE
            + self.seconds as u64
    }
}

/// Format a duration as "HHMMSS" for the six main digits.
pub fn format_hhmmss(duration: &WatchDuration) -> String {
    format!(
        "{:02}{:02}{:02}",
        duration.hours, duration.minutes, duration.seconds
    )
}
