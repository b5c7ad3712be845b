use crate::face::{Event, FaceId, Movement, Timestamp, WatchFace};
use crate::render::Frame;
use crate::sound::ALARM_SEQUENCE;
use crate::{step_duration, Config, WatchDuration};

/// Countdown timer that is set by tapping the add button.
///
/// Each tap within a burst moves one step further along the duration table
/// and restarts the settle countdown. When the settle countdown runs out, the
/// duration for the last step is added to the target and a wake-up is armed.
pub struct MicroTimer {
    owner: FaceId,
    config: Config,

    // Burst state; both are zero when no burst is in progress
    step: u32,
    ticks_left: u16,

    now: Timestamp,
    target: Timestamp,
}

impl MicroTimer {
    pub fn new(owner: FaceId) -> Self {
        Self::with_config(owner, Config::default())
    }

    pub fn with_config(owner: FaceId, config: Config) -> Self {
        Self {
            owner,
            config,
            step: 0,
            ticks_left: 0,
            now: 0,
            target: 0,
        }
    }

    pub fn owner(&self) -> FaceId {
        self.owner
    }

    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// When the countdown reaches zero. 0 if nothing is armed.
    pub fn target(&self) -> Timestamp {
        self.target
    }

    pub fn step(&self) -> u32 {
        self.step
    }

    pub fn ticks_left(&self) -> u16 {
        self.ticks_left
    }

    pub fn is_accumulating(&self) -> bool {
        self.step != 0
    }

    pub fn remaining_secs(&self) -> u64 {
        self.target.saturating_sub(self.now)
    }

    pub fn refresh_clock(&mut self, now: Timestamp) {
        self.now = now;
    }

    pub fn reset(&mut self, host: &mut dyn Movement) {
        if self.is_accumulating() {
            // Don't leave the host ticking fast for a burst that no longer exists
            host.request_tick_frequency(self.config.normal_tick_hz);
        }
        self.step = 0;
        self.ticks_left = 0;
        self.target = 0;
        host.cancel_wakeup(self.owner);
        log::debug!("{:?} reset", self.owner);
    }

    pub fn add_press(&mut self, host: &mut dyn Movement) {
        if self.step == 0 {
            log::debug!("{:?} burst started", self.owner);
            host.request_tick_frequency(self.config.accumulate_tick_hz);
        }
        self.step = self.step.saturating_add(1);
        self.ticks_left = self.config.settle_ticks.max(1);
    }

    pub fn tick(&mut self, host: &mut dyn Movement) {
        match self.ticks_left {
            0 => {}
            1 => self.commit(host),
            _ => self.ticks_left -= 1,
        }
    }

    fn commit(&mut self, host: &mut dyn Movement) {
        if self.target < self.now {
            // The previous countdown already ran out; count from now instead
            self.target = self.now;
        }
        let added = step_duration(self.step);
        self.target = self.target.saturating_add(added);

        self.step = 0;
        self.ticks_left = 0;

        log::debug!(
            "{:?} added {}s, fires at {} ({}s left)",
            self.owner,
            added,
            self.target,
            self.remaining_secs()
        );
        host.request_tick_frequency(self.config.normal_tick_hz);
        host.schedule_wakeup(self.owner, self.target);
    }

    /// Commit a burst in progress right now, without waiting for it to settle.
    pub fn settle_now(&mut self, host: &mut dyn Movement) {
        if self.is_accumulating() {
            self.ticks_left = 1;
            self.tick(host);
        }
    }

    pub fn render(&self) -> Frame {
        if self.is_accumulating() {
            Frame {
                duration: WatchDuration::from_secs(step_duration(self.step)),
                colon: self.ticks_left % 2 == 0,
            }
        } else {
            Frame {
                duration: WatchDuration::from_secs(self.remaining_secs()),
                colon: true,
            }
        }
    }

    /// Returns false so the device stays awake while the alarm plays.
    pub fn alarm_fired(&mut self, host: &mut dyn Movement) -> bool {
        log::info!("{:?} countdown finished", self.owner);
        host.play_alarm_sound(ALARM_SEQUENCE);
        false
    }
}

impl WatchFace for MicroTimer {
    fn on_create(&mut self, host: &mut dyn Movement) {
        self.reset(host);
    }

    fn on_activate(&mut self, host: &mut dyn Movement) {
        self.refresh_clock(host.current_time());
    }

    fn on_event(&mut self, event: Event, host: &mut dyn Movement) -> bool {
        self.refresh_clock(host.current_time());

        match event {
            Event::Activate | Event::Tick => {
                self.tick(host);
                self.render().draw(host);
                true
            }
            Event::AlarmButtonUp => {
                self.add_press(host);
                self.render().draw(host);
                true
            }
            Event::AlarmLongPress => {
                self.reset(host);
                self.render().draw(host);
                true
            }
            Event::BackgroundTask => self.alarm_fired(host),
            _ => {
                host.default_loop_handler(event);
                true
            }
        }
    }

    fn on_deactivate(&mut self, host: &mut dyn Movement) {
        self.settle_now(host);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::face::SegmentDisplay;
    use crate::sound::SequenceStep;

    const OWNER: FaceId = FaceId(3);

    #[derive(Clone, Copy, PartialEq, Debug)]
    enum Call {
        Frequency(u8),
        Schedule(FaceId, Timestamp),
        Cancel(FaceId),
        Alarm,
        Default(Event),
    }

    #[derive(Default)]
    struct RecordingHost {
        time: Timestamp,
        calls: Vec<Call>,
        colon: bool,
        digits: String,
    }

    impl RecordingHost {
        fn at(time: Timestamp) -> Self {
            Self {
                time,
                ..Default::default()
            }
        }

        fn schedules(&self) -> Vec<Timestamp> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Schedule(_, at) => Some(*at),
                    _ => None,
                })
                .collect()
        }

        fn frequencies(&self) -> Vec<u8> {
            self.calls
                .iter()
                .filter_map(|c| match c {
                    Call::Frequency(hz) => Some(*hz),
                    _ => None,
                })
                .collect()
        }
    }

    impl SegmentDisplay for RecordingHost {
        fn display_string(&mut self, text: &str, position: usize) {
            if position == 4 {
                self.digits = text.to_string();
            }
        }
        fn set_colon(&mut self) {
            self.colon = true;
        }
        fn clear_colon(&mut self) {
            self.colon = false;
        }
        fn set_pixel(&mut self, _x: u8, _y: u8) {}
    }

    impl Movement for RecordingHost {
        fn current_time(&self) -> Timestamp {
            self.time
        }
        fn request_tick_frequency(&mut self, hz: u8) {
            self.calls.push(Call::Frequency(hz));
        }
        fn schedule_wakeup(&mut self, owner: FaceId, at: Timestamp) {
            self.calls.push(Call::Schedule(owner, at));
        }
        fn cancel_wakeup(&mut self, owner: FaceId) {
            self.calls.push(Call::Cancel(owner));
        }
        fn play_alarm_sound(&mut self, sequence: &'static [SequenceStep]) {
            assert_eq!(sequence, ALARM_SEQUENCE);
            self.calls.push(Call::Alarm);
        }
        fn default_loop_handler(&mut self, event: Event) {
            self.calls.push(Call::Default(event));
        }
    }

    fn created(host: &mut RecordingHost) -> MicroTimer {
        let mut timer = MicroTimer::new(OWNER);
        timer.on_create(host);
        timer.on_activate(host);
        host.calls.clear();
        timer
    }

    fn settle(timer: &mut MicroTimer, host: &mut RecordingHost) {
        for _ in 0..Config::default().settle_ticks {
            timer.on_event(Event::Tick, host);
        }
    }

    #[test]
    fn test_zero_state_render() {
        let mut host = RecordingHost::at(0);
        let mut timer = created(&mut host);
        assert_eq!(timer.target(), 0);
        assert_eq!(timer.step(), 0);

        let frame = timer.render();
        assert_eq!(frame.duration, WatchDuration::default());
        assert!(frame.colon);

        assert!(timer.on_event(Event::Tick, &mut host));
        assert_eq!(host.digits, "000000");
        assert!(host.colon);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_reset_idempotent() {
        let mut host = RecordingHost::at(1000);
        let mut timer = created(&mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        settle(&mut timer, &mut host);

        timer.reset(&mut host);
        let once = (timer.target(), timer.step(), timer.ticks_left());
        timer.reset(&mut host);
        let twice = (timer.target(), timer.step(), timer.ticks_left());
        assert_eq!(once, (0, 0, 0));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_single_press_commits_after_settle() {
        let mut host = RecordingHost::at(1000);
        let mut timer = created(&mut host);

        timer.on_event(Event::AlarmButtonUp, &mut host);
        assert_eq!(host.frequencies(), vec![8]);
        assert_eq!(timer.ticks_left(), 8);

        for _ in 0..7 {
            timer.on_event(Event::Tick, &mut host);
        }
        assert_eq!(timer.target(), 0);
        assert_eq!(timer.ticks_left(), 1);
        assert!(host.schedules().is_empty());

        timer.on_event(Event::Tick, &mut host);
        assert_eq!(timer.target(), 1030);
        assert!(!timer.is_accumulating());
        assert_eq!(timer.ticks_left(), 0);
        assert_eq!(host.frequencies(), vec![8, 1]);
        assert_eq!(host.calls.last(), Some(&Call::Schedule(OWNER, 1030)));
        assert_eq!(host.digits, "000030");
    }

    #[test]
    fn test_commit_after_expired_counts_from_now() {
        let mut host = RecordingHost::at(100);
        let mut timer = created(&mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        settle(&mut timer, &mut host);
        assert_eq!(timer.target(), 130);

        // The countdown ran out long ago and was never reset
        host.time = 500;
        timer.on_event(Event::AlarmButtonUp, &mut host);
        settle(&mut timer, &mut host);
        assert_eq!(timer.target(), 530);
        assert_eq!(host.schedules(), vec![130, 530]);
    }

    #[test]
    fn test_commit_extends_running_countdown() {
        let mut host = RecordingHost::at(100);
        let mut timer = created(&mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        settle(&mut timer, &mut host);
        assert_eq!(timer.target(), 160);

        host.time = 120;
        timer.on_event(Event::AlarmButtonUp, &mut host);
        settle(&mut timer, &mut host);
        assert_eq!(timer.target(), 190);
        assert_eq!(timer.remaining_secs(), 70);
    }

    #[test]
    fn test_burst_shows_current_step_only() {
        let mut host = RecordingHost::at(0);
        let mut timer = created(&mut host);
        for _ in 0..3 {
            timer.on_event(Event::AlarmButtonUp, &mut host);
        }
        assert_eq!(timer.step(), 3);
        assert_eq!(timer.render().duration.total_secs(), 120);
        assert_eq!(host.digits, "000200");
        // Fast ticks are requested once per burst, not per press
        assert_eq!(host.frequencies(), vec![8]);

        settle(&mut timer, &mut host);
        assert_eq!(timer.target(), 120);
        assert_eq!(host.schedules(), vec![120]);
    }

    #[test]
    fn test_press_restarts_settle_window() {
        let mut host = RecordingHost::at(0);
        let mut timer = created(&mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        for _ in 0..5 {
            timer.on_event(Event::Tick, &mut host);
        }
        timer.on_event(Event::AlarmButtonUp, &mut host);
        assert_eq!(timer.ticks_left(), 8);
        for _ in 0..7 {
            timer.on_event(Event::Tick, &mut host);
        }
        assert!(timer.is_accumulating());
        timer.on_event(Event::Tick, &mut host);
        assert_eq!(timer.target(), 60);
    }

    #[test]
    fn test_colon_blinks_while_accumulating() {
        let mut host = RecordingHost::at(0);
        let mut timer = created(&mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        assert!(host.colon);
        timer.on_event(Event::Tick, &mut host);
        assert!(!host.colon);
        timer.on_event(Event::Tick, &mut host);
        assert!(host.colon);
    }

    #[test]
    fn test_deactivate_commits_burst_once() {
        let mut host = RecordingHost::at(50);
        let mut timer = created(&mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        timer.on_event(Event::Tick, &mut host);

        timer.on_deactivate(&mut host);
        assert_eq!(timer.target(), 50 + step_duration(2));
        assert_eq!(timer.step(), 0);
        assert_eq!(timer.ticks_left(), 0);
        assert_eq!(host.schedules(), vec![110]);

        // Later ticks and another deactivate do not add it again
        timer.on_event(Event::Tick, &mut host);
        timer.on_deactivate(&mut host);
        assert_eq!(timer.target(), 110);
        assert_eq!(host.schedules(), vec![110]);
    }

    #[test]
    fn test_deactivate_when_idle_does_nothing() {
        let mut host = RecordingHost::at(50);
        let mut timer = created(&mut host);
        timer.on_deactivate(&mut host);
        assert_eq!(timer.target(), 0);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn test_long_press_resets() {
        let mut host = RecordingHost::at(10);
        let mut timer = created(&mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        settle(&mut timer, &mut host);
        host.calls.clear();

        timer.on_event(Event::AlarmLongPress, &mut host);
        assert_eq!(timer.target(), 0);
        assert_eq!(host.calls, vec![Call::Cancel(OWNER)]);
        assert_eq!(host.digits, "000000");
    }

    #[test]
    fn test_long_press_mid_burst_restores_normal_ticks() {
        let mut host = RecordingHost::at(10);
        let mut timer = created(&mut host);
        timer.on_event(Event::AlarmButtonUp, &mut host);
        timer.on_event(Event::AlarmLongPress, &mut host);
        assert!(!timer.is_accumulating());
        assert_eq!(host.frequencies(), vec![8, 1]);

        settle(&mut timer, &mut host);
        assert_eq!(timer.target(), 0);
        assert!(host.schedules().is_empty());
    }

    #[test]
    fn test_countdown_display() {
        let mut host = RecordingHost::at(1000);
        let mut timer = created(&mut host);
        for _ in 0..4 {
            timer.on_event(Event::AlarmButtonUp, &mut host);
        }
        settle(&mut timer, &mut host);
        assert_eq!(host.digits, "000300");

        host.time = 1061;
        timer.on_event(Event::Tick, &mut host);
        assert_eq!(host.digits, "000159");

        host.time = 5000;
        timer.on_event(Event::Tick, &mut host);
        assert_eq!(host.digits, "000000");
        assert_eq!(timer.remaining_secs(), 0);
    }

    #[test]
    fn test_alarm_keeps_device_awake() {
        let mut host = RecordingHost::at(1000);
        let mut timer = created(&mut host);
        assert!(!timer.on_event(Event::BackgroundTask, &mut host));
        assert_eq!(host.calls, vec![Call::Alarm]);
    }

    #[test]
    fn test_other_events_go_to_default_handler() {
        let mut host = RecordingHost::at(1000);
        let mut timer = created(&mut host);
        assert!(timer.on_event(Event::ModeButtonUp, &mut host));
        assert!(timer.on_event(Event::LightButtonDown, &mut host));
        assert_eq!(
            host.calls,
            vec![
                Call::Default(Event::ModeButtonUp),
                Call::Default(Event::LightButtonDown)
            ]
        );
    }

    #[test]
    fn test_clock_refreshed_every_event() {
        let mut host = RecordingHost::at(42);
        let mut timer = created(&mut host);
        assert_eq!(timer.now(), 42);
        host.time = 43;
        timer.on_event(Event::ModeButtonUp, &mut host);
        assert_eq!(timer.now(), 43);
    }

    #[test]
    fn test_many_presses_reach_days() {
        let mut host = RecordingHost::at(0);
        let mut timer = created(&mut host);
        for _ in 0..34 {
            timer.on_event(Event::AlarmButtonUp, &mut host);
        }
        assert_eq!(timer.render().duration.days, 1);
        settle(&mut timer, &mut host);
        assert_eq!(timer.target(), 86_400);
    }

    #[test]
    fn test_overflow_days_keep_count() {
        let mut host = RecordingHost::at(0);
        let mut timer = created(&mut host);
        // 24 hours per burst of 34 presses, 41 bursts
        for _ in 0..41 {
            for _ in 0..34 {
                timer.on_event(Event::AlarmButtonUp, &mut host);
            }
            settle(&mut timer, &mut host);
        }
        let frame = timer.render();
        assert_eq!(frame.duration.days, 41);
        assert_eq!(frame.day_field(), crate::DayField::Overflow);
        assert_eq!(timer.target(), 41 * 86_400);
    }
}
