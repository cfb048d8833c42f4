//! Per-question countdown driver.
//!
//! Sends one tick per period to a shared engine until the run it was started
//! for ends, is abandoned, or the handle is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use crate::domain::engine::{RunTicket, ScenarioEngine, TickOutcome, Transition};

/// An engine shared between the countdown task and the input source.
pub type SharedEngine = Arc<Mutex<ScenarioEngine>>;

/// Owns a running countdown task. Dropping the handle stops the countdown.
#[derive(Debug)]
pub struct CountdownHandle {
    task: JoinHandle<()>,
}

impl CountdownHandle {
    /// Whether the countdown has stopped on its own.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stops the countdown.
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for CountdownHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawns a task that ticks `engine` once every `period` on behalf of the run
/// identified by `ticket`.
///
/// The task exits once a tick comes back `Stale` or `Ignored`, or once the
/// timeout policy completes the run. Must be called from within a Tokio
/// runtime.
#[must_use = "dropping the handle stops the countdown"]
pub fn spawn_countdown(
    engine: SharedEngine,
    ticket: RunTicket,
    period: Duration,
) -> CountdownHandle {
    let task = tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        loop {
            interval.tick().await;
            let outcome = engine.lock().await.tick(ticket);
            match outcome {
                TickOutcome::Counting { .. }
                | TickOutcome::Expired
                | TickOutcome::TimedOut(Transition::Advanced { .. }) => {}
                TickOutcome::TimedOut(Transition::Completed(_)) => {
                    debug!("countdown finished with the run");
                    break;
                }
                TickOutcome::Ignored | TickOutcome::Stale => {
                    debug!(?outcome, "countdown no longer current");
                    break;
                }
            }
        }
    });
    CountdownHandle { task }
}
