use microtimer_core::SegmentDisplay;

const POSITIONS: usize = 10;

/// Text stand-in for the watch's segment LCD. Frames are written to the log.
pub struct SegmentLcd {
    chars: [char; POSITIONS],
    colon: bool,
    pixels: Vec<(u8, u8)>,
    dirty: bool,
    backlight: bool,
}

impl SegmentLcd {
    pub fn new() -> Self {
        Self {
            chars: [' '; POSITIONS],
            colon: false,
            pixels: Vec::new(),
            dirty: false,
            backlight: false,
        }
    }

    pub fn clear(&mut self) {
        self.chars = [' '; POSITIONS];
        self.colon = false;
        self.pixels.clear();
        self.dirty = true;
    }

    pub fn backlight(&self) -> bool {
        self.backlight
    }

    pub fn set_backlight(&mut self, on: bool) {
        if self.backlight != on {
            self.backlight = on;
            self.dirty = true;
        }
    }

    /// Renders as "uT DD HH:MM:SS": header, day field, then the clock digits.
    pub fn line(&self) -> String {
        let c = &self.chars;
        let sep = if self.colon { ':' } else { ' ' };
        format!(
            "{}{} {}{} {}{}{}{}{}{}{}{}",
            c[0], c[1], c[2], c[3], c[4], c[5], sep, c[6], c[7], sep, c[8], c[9]
        )
    }

    /// Log the frame if anything changed since the last flush.
    pub fn flush(&mut self) {
        if !self.dirty {
            return;
        }
        self.dirty = false;
        let light = if self.backlight { "*" } else { " " };
        if self.pixels.is_empty() {
            log::info!("{}[{}]", light, self.line());
        } else {
            log::info!("{}[{}] px {:?}", light, self.line(), self.pixels);
        }
        // Pixels are only lit for the frame that asked for them
        self.pixels.clear();
    }
}

impl SegmentDisplay for SegmentLcd {
    fn display_string(&mut self, text: &str, position: usize) {
        for (i, ch) in text.chars().enumerate() {
            match self.chars.get_mut(position + i) {
                Some(slot) => *slot = ch,
                None => break,
            }
        }
        self.dirty = true;
    }

    fn set_colon(&mut self) {
        self.colon = true;
        self.dirty = true;
    }

    fn clear_colon(&mut self) {
        self.colon = false;
        self.dirty = true;
    }

    fn set_pixel(&mut self, x: u8, y: u8) {
        self.pixels.push((x, y));
        self.dirty = true;
    }
}
