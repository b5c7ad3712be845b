use microtimer_core::{flatten_sequence, SequenceStep, BUZZER_TICK_HZ};

/// Play a note sequence on a worker thread so the caller never waits on it.
///
/// There is no piezo on this hardware, so each note is logged and timed out
/// with the ticktimer instead.
pub fn play_sequence(sequence: &'static [SequenceStep]) {
    std::thread::spawn(move || {
        let tt = match ticktimer_server::Ticktimer::new() {
            Ok(tt) => tt,
            Err(e) => {
                log::error!("buzzer can't reach ticktimer: {:?}", e);
                return;
            }
        };
        for (note, ticks) in flatten_sequence(sequence) {
            let ms = ticks as u32 * 1000 / BUZZER_TICK_HZ;
            match note.frequency_hz() {
                Some(hz) => log::info!("buzzer: {} Hz for {} ms", hz, ms),
                None => log::debug!("buzzer: rest {} ms", ms),
            }
            tt.sleep_ms(ms as usize).ok();
        }
    });
}
