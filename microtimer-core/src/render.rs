use crate::face::SegmentDisplay;
use crate::{format_hhmmss, WatchDuration};

/// Largest day count the two-character day field can show.
pub const MAX_DISPLAY_DAYS: u64 = 39;

const HEADER: &str = "uT";
const HEADER_POS: usize = 0;
const DAY_POS: usize = 2;
const DIGITS_POS: usize = 4;

/// Bars drawn in the day field when the count does not fit.
const OVERFLOW_PIXELS: [(u8, u8); 4] = [(1, 9), (0, 7), (1, 8), (2, 6)];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum DayField {
    Blank,
    Count(u64),
    Overflow,
}

/// Everything the face shows, as computed from the timer state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Frame {
    pub duration: WatchDuration,
    pub colon: bool,
}

impl Frame {
    pub fn day_field(&self) -> DayField {
        match self.duration.days {
            0 => DayField::Blank,
            days if days <= MAX_DISPLAY_DAYS => DayField::Count(days),
            _ => DayField::Overflow,
        }
    }

    pub fn draw<D: SegmentDisplay + ?Sized>(&self, display: &mut D) {
        if self.colon {
            display.set_colon();
        } else {
            display.clear_colon();
        }

        display.display_string(HEADER, HEADER_POS);
        display.display_string(&format_hhmmss(&self.duration), DIGITS_POS);

        match self.day_field() {
            DayField::Blank => display.display_string("  ", DAY_POS),
            DayField::Count(days) => display.display_string(&format!("{:>2}", days), DAY_POS),
            DayField::Overflow => {
                // The count is still right, there is just no room to show it
                display.display_string("  ", DAY_POS);
                for (x, y) in OVERFLOW_PIXELS {
                    display.set_pixel(x, y);
                }
            }
        }
    }
}
