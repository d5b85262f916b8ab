//! Once-per-second "time left today" ticker for display.
//! It never triggers a rollover check; that only happens when a quest is opened.
use crate::clock::Clock;
use crate::constants::COUNTDOWN_TICK_MILLIS;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running countdown. Dropping it stops the background task.
pub struct MidnightCountdown {
    rx: watch::Receiver<u64>,
    handle: JoinHandle<()>,
}

impl MidnightCountdown {
    /// Spawns the ticker. Must be called inside a tokio runtime.
    pub fn start(clock: Arc<dyn Clock>) -> Self {
        let (tx, rx) = watch::channel(clock.seconds_until_midnight());
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(COUNTDOWN_TICK_MILLIS));
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval.tick().await;
            loop {
                interval.tick().await;
                if tx.send(clock.seconds_until_midnight()).is_err() {
                    break;
                }
            }
        });
        Self { rx, handle }
    }

    pub fn remaining(&self) -> u64 {
        *self.rx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.rx.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Consumes the handle; the task is aborted on drop.
    pub fn stop(self) {}
}

impl Drop for MidnightCountdown {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
