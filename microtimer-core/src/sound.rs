//! The alarm chirp, as a note sequence for the buzzer.

/// Buzzer durations are counted in ticks of this rate.
pub const BUZZER_TICK_HZ: u32 = 64;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BuzzerNote {
    /// C8, 4186 Hz
    C8,
    Rest,
}

impl BuzzerNote {
    pub fn frequency_hz(&self) -> Option<u32> {
        match self {
            BuzzerNote::C8 => Some(4186),
            BuzzerNote::Rest => None,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SequenceStep {
    /// Play a note for a number of buzzer ticks.
    Note(BuzzerNote, u8),
    /// Jump back `back` steps and play them `times` more times.
    Repeat { back: u8, times: u8 },
}

use BuzzerNote::{Rest, C8};
use SequenceStep::{Note, Repeat};

/// Two bursts of three quick chirps and a longer one.
pub const ALARM_SEQUENCE: &[SequenceStep] = &[
    Note(C8, 3),
    Note(Rest, 3),
    Repeat { back: 2, times: 2 },
    Note(C8, 5),
    Note(Rest, 25),
    Note(C8, 3),
    Note(Rest, 3),
    Repeat { back: 2, times: 2 },
    Note(C8, 5),
    Note(Rest, 25),
];

/// Expand repeat markers into the plain list of notes to play, in order.
pub fn flatten_sequence(sequence: &[SequenceStep]) -> Vec<(BuzzerNote, u8)> {
    let mut notes = Vec::new();
    // Index into `notes` where each step's output starts
    let mut starts = Vec::with_capacity(sequence.len());

    for (i, step) in sequence.iter().enumerate() {
        starts.push(notes.len());
        match *step {
            Note(note, ticks) => notes.push((note, ticks)),
            Repeat { back, times } => {
                let back = back as usize;
                if back == 0 || back > i {
                    log::warn!("ignoring repeat of {} steps at step {}", back, i);
                    continue;
                }
                let segment = notes[starts[i - back]..].to_vec();
                for _ in 0..times {
                    notes.extend_from_slice(&segment);
                }
            }
        }
    }
    notes
}
