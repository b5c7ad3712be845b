use std::collections::BTreeMap;

use num_traits::{FromPrimitive, ToPrimitive};

use microtimer_core::Timestamp;

use crate::movement::unix_now;
use crate::AppOp;

// Upper bound on one sleep, so schedule/cancel messages are picked up promptly
const POLL_MS: u64 = 250;

#[derive(Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum WakeupOp {
    /// arg1: owner, arg2/arg3: low/high 32 bits of the timestamp
    Schedule = 0,
    /// arg1: owner
    Cancel,
    Quit,
}

/// Keeps at most one deadline per owner and sends `BackgroundTask(owner)`
/// to the main server when it comes due.
pub fn wakeup_thread(wakeup_sid: xous::SID, main_conn: xous::CID) {
    let tt = ticktimer_server::Ticktimer::new().unwrap();
    let mut pending: BTreeMap<usize, Timestamp> = BTreeMap::new();

    loop {
        if !pending.is_empty() {
            let now = unix_now();
            let due: Vec<usize> = pending
                .iter()
                .filter(|(_, at)| **at <= now)
                .map(|(owner, _)| *owner)
                .collect();
            for owner in due {
                pending.remove(&owner);
                log::info!("wake-up due for face {}", owner);
                xous::send_message(
                    main_conn,
                    xous::Message::new_scalar(
                        AppOp::BackgroundTask.to_usize().unwrap_or(0),
                        owner,
                        0,
                        0,
                        0,
                    ),
                )
                .ok();
            }

            if let Some(next) = pending.values().min() {
                let wait_ms = next.saturating_sub(now).saturating_mul(1000).min(POLL_MS);
                tt.sleep_ms(wait_ms.max(1) as usize).ok();
            }
        }

        // Block when nothing is armed, otherwise just drain what has arrived
        let mut envelopes = Vec::new();
        if pending.is_empty() {
            if let Ok(env) = xous::receive_message(wakeup_sid) {
                envelopes.push(env);
            }
        }
        while let Ok(Some(env)) = xous::try_receive_message(wakeup_sid) {
            envelopes.push(env);
        }

        for env in envelopes {
            if let xous::Message::Scalar(scalar) = &env.body {
                match FromPrimitive::from_usize(scalar.id) {
                    Some(WakeupOp::Schedule) => {
                        let at = (scalar.arg2 as u64) | ((scalar.arg3 as u64) << 32);
                        log::debug!("wake-up for face {} at {}", scalar.arg1, at);
                        pending.insert(scalar.arg1, at);
                    }
                    Some(WakeupOp::Cancel) => {
                        if pending.remove(&scalar.arg1).is_some() {
                            log::debug!("wake-up for face {} cancelled", scalar.arg1);
                        }
                    }
                    Some(WakeupOp::Quit) => return,
                    None => log::error!("unknown wake-up opcode: {}", scalar.id),
                }
            }
        }
    }
}
