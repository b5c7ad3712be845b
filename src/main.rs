#![cfg_attr(target_os = "none", no_std)]
#![cfg_attr(target_os = "none", no_main)]

mod alerts;
mod movement;
mod ui;
mod wakeup;

use num_traits::{FromPrimitive, ToPrimitive};

use microtimer_core::{Event, FaceId, MicroTimer, Movement, WatchFace};

use crate::movement::{FaceChange, PumpOp, XousMovement};

const SERVER_NAME: &str = "_MicroTimer_";

/// Tick rate every face starts with when it comes into view.
const DEFAULT_TICK_HZ: u8 = 1;

#[derive(Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub(crate) enum AppOp {
    Tick = 0,
    AlarmButton,
    AlarmLongPress,
    ModeButton,
    LightButton,
    /// arg1: index of the face whose wake-up came due
    BackgroundTask,
    Timeout,
    Quit,
}

struct MicroTimerApp {
    faces: Vec<Box<dyn WatchFace>>,
    active: usize,
    movement: XousMovement,
    stay_awake: bool,
}

impl MicroTimerApp {
    fn new(mut movement: XousMovement) -> Self {
        let mut faces: Vec<Box<dyn WatchFace>> = vec![Box::new(MicroTimer::new(FaceId(0)))];
        for face in faces.iter_mut() {
            face.on_create(&mut movement);
        }

        Self {
            faces,
            active: 0,
            movement,
            stay_awake: false,
        }
    }

    fn activate(&mut self, index: usize) {
        self.active = index;
        self.movement.lcd.clear();
        self.movement.request_tick_frequency(DEFAULT_TICK_HZ);
        self.faces[index].on_activate(&mut self.movement);
        self.dispatch(Event::Activate);
    }

    fn move_to(&mut self, index: usize) {
        log::debug!("face {} -> {}", self.active, index);
        self.faces[self.active].on_deactivate(&mut self.movement);
        self.activate(index);
    }

    fn dispatch(&mut self, event: Event) {
        let ok_to_sleep = self.faces[self.active].on_event(event, &mut self.movement);
        self.after_event(ok_to_sleep);
    }

    /// Wake-ups go to the face that asked for them, shown or not.
    fn dispatch_background(&mut self, owner: FaceId) {
        let ok_to_sleep = match self.faces.get_mut(owner.0) {
            Some(face) => face.on_event(Event::BackgroundTask, &mut self.movement),
            None => {
                log::error!("wake-up for unknown face {:?}", owner);
                true
            }
        };
        self.after_event(ok_to_sleep);
    }

    fn after_event(&mut self, ok_to_sleep: bool) {
        if ok_to_sleep == self.stay_awake {
            self.stay_awake = !ok_to_sleep;
            log::debug!("ok to sleep: {}", ok_to_sleep);
        }
        self.movement.lcd.flush();

        match self.movement.take_face_change() {
            Some(FaceChange::Next) => self.move_to((self.active + 1) % self.faces.len()),
            Some(FaceChange::First) if self.active != 0 => self.move_to(0),
            _ => {}
        }
    }

    fn shutdown(&mut self) {
        self.faces[self.active].on_deactivate(&mut self.movement);
        self.movement.lcd.flush();
        self.movement.quit();
    }
}

fn pump_thread(pump_sid: xous::SID, main_conn: xous::CID) {
    let tt = ticktimer_server::Ticktimer::new().unwrap();
    let mut interval_ms = 1000u64;
    let mut running = false;

    loop {
        if running {
            tt.sleep_ms(interval_ms as usize).ok();
            xous::send_message(
                main_conn,
                xous::Message::new_scalar(AppOp::Tick.to_usize().unwrap(), 0, 0, 0, 0),
            ).ok();
        }

        // Check for control messages (non-blocking when running, blocking when stopped)
        let envelope = if running {
            match xous::try_receive_message(pump_sid) {
                Ok(Some(env)) => Some(env),
                _ => None,
            }
        } else {
            xous::receive_message(pump_sid).ok()
        };

        if let Some(env) = envelope {
            if let xous::Message::Scalar(scalar) = &env.body {
                match FromPrimitive::from_usize(scalar.id) {
                    Some(PumpOp::Start) => {
                        interval_ms = scalar.arg1 as u64;
                        if interval_ms == 0 { interval_ms = 125; }
                        running = true;
                    }
                    Some(PumpOp::Stop) => {
                        running = false;
                    }
                    Some(PumpOp::Quit) => break,
                    None => {}
                }
            }
        }
    }
}

fn main() -> ! {
    log_server::init_wait().unwrap();
    log::set_max_level(log::LevelFilter::Info);
    log::info!("MicroTimer PID is {}", xous::process::id());

    let xns = xous_names::XousNames::new().unwrap();
    let sid = xns.register_name(SERVER_NAME, None).expect("can't register server");
    let main_conn = xous::connect(sid).expect("can't connect to self");

    let pump_sid = xous::create_server().expect("can't create pump server");
    std::thread::spawn(move || {
        pump_thread(pump_sid, main_conn);
    });
    let wakeup_sid = xous::create_server().expect("can't create wake-up server");
    std::thread::spawn(move || {
        wakeup::wakeup_thread(wakeup_sid, main_conn);
    });

    let pump_conn = xous::connect(pump_sid).expect("can't connect to pump");
    let wakeup_conn = xous::connect(wakeup_sid).expect("can't connect to wake-up server");

    let mut app = MicroTimerApp::new(XousMovement::new(pump_conn, wakeup_conn));
    app.activate(0);

    loop {
        let msg = xous::receive_message(sid).unwrap();
        match FromPrimitive::from_usize(msg.body.id()) {
            Some(AppOp::Tick) => app.dispatch(Event::Tick),
            Some(AppOp::AlarmButton) => app.dispatch(Event::AlarmButtonUp),
            Some(AppOp::AlarmLongPress) => app.dispatch(Event::AlarmLongPress),
            Some(AppOp::ModeButton) => app.dispatch(Event::ModeButtonUp),
            Some(AppOp::LightButton) => app.dispatch(Event::LightButtonDown),
            Some(AppOp::Timeout) => app.dispatch(Event::Timeout),
            Some(AppOp::BackgroundTask) => xous::msg_scalar_unpack!(msg, owner, _, _, _, {
                app.dispatch_background(FaceId(owner));
            }),
            Some(AppOp::Quit) => break,
            _ => log::error!("unknown opcode: {:?}", msg),
        }
    }

    // Clean up
    log::info!("quitting at {} Hz", app.movement.tick_hz());
    app.shutdown();
    xns.unregister_server(sid).unwrap();
    unsafe { xous::destroy_server(sid).unwrap() };
    xous::terminate_process(0)
}
