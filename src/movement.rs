use std::time::{SystemTime, UNIX_EPOCH};

use num_traits::ToPrimitive;

use microtimer_core::{Event, FaceId, Movement, SegmentDisplay, SequenceStep, Timestamp};

use crate::alerts::play_sequence;
use crate::ui::SegmentLcd;
use crate::wakeup::WakeupOp;

#[derive(Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum PumpOp {
    /// arg1: interval in ms
    Start = 0,
    Stop,
    Quit,
}

/// Face switches requested by the default handler, applied after dispatch returns.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FaceChange {
    Next,
    First,
}

pub fn unix_now() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Host side of the face contract: ticks, wake-ups, buzzer and display.
pub struct XousMovement {
    pump_conn: xous::CID,
    wakeup_conn: xous::CID,
    pub lcd: SegmentLcd,
    tick_hz: u8,
    face_change: Option<FaceChange>,
}

impl XousMovement {
    pub fn new(pump_conn: xous::CID, wakeup_conn: xous::CID) -> Self {
        Self {
            pump_conn,
            wakeup_conn,
            lcd: SegmentLcd::new(),
            tick_hz: 0,
            face_change: None,
        }
    }

    pub fn tick_hz(&self) -> u8 {
        self.tick_hz
    }

    pub fn take_face_change(&mut self) -> Option<FaceChange> {
        self.face_change.take()
    }

    fn send_pump(&self, op: PumpOp, arg: usize) {
        xous::send_message(
            self.pump_conn,
            xous::Message::new_scalar(op.to_usize().unwrap_or(0), arg, 0, 0, 0),
        )
        .ok();
    }

    pub fn quit(&mut self) {
        self.send_pump(PumpOp::Quit, 0);
        xous::send_message(
            self.wakeup_conn,
            xous::Message::new_scalar(WakeupOp::Quit.to_usize().unwrap_or(0), 0, 0, 0, 0),
        )
        .ok();
    }
}

impl SegmentDisplay for XousMovement {
    fn display_string(&mut self, text: &str, position: usize) {
        self.lcd.display_string(text, position);
    }

    fn set_colon(&mut self) {
        self.lcd.set_colon();
    }

    fn clear_colon(&mut self) {
        self.lcd.clear_colon();
    }

    fn set_pixel(&mut self, x: u8, y: u8) {
        self.lcd.set_pixel(x, y);
    }
}

impl Movement for XousMovement {
    fn current_time(&self) -> Timestamp {
        unix_now()
    }

    fn request_tick_frequency(&mut self, hz: u8) {
        if hz == self.tick_hz {
            return;
        }
        log::debug!("tick frequency {} -> {} Hz", self.tick_hz, hz);
        self.tick_hz = hz;
        if hz == 0 {
            self.send_pump(PumpOp::Stop, 0);
        } else {
            self.send_pump(PumpOp::Start, 1000 / hz as usize);
        }
    }

    fn schedule_wakeup(&mut self, owner: FaceId, at: Timestamp) {
        // usize is 32 bits on target, so the timestamp goes in two halves
        xous::send_message(
            self.wakeup_conn,
            xous::Message::new_scalar(
                WakeupOp::Schedule.to_usize().unwrap_or(0),
                owner.0,
                (at & 0xFFFF_FFFF) as usize,
                (at >> 32) as usize,
                0,
            ),
        )
        .ok();
    }

    fn cancel_wakeup(&mut self, owner: FaceId) {
        xous::send_message(
            self.wakeup_conn,
            xous::Message::new_scalar(WakeupOp::Cancel.to_usize().unwrap_or(0), owner.0, 0, 0, 0),
        )
        .ok();
    }

    fn play_alarm_sound(&mut self, sequence: &'static [SequenceStep]) {
        play_sequence(sequence);
    }

    fn default_loop_handler(&mut self, event: Event) {
        match event {
            Event::ModeButtonUp => self.face_change = Some(FaceChange::Next),
            Event::Timeout => self.face_change = Some(FaceChange::First),
            Event::LightButtonDown => {
                let on = !self.lcd.backlight();
                self.lcd.set_backlight(on);
            }
            _ => {}
        }
    }
}
