//! Periodic status refresh.
//!
//! A background task sweeps the whole roster through
//! [`Dispatcher::refresh_all`] once per period. The first sweep runs one
//! full period after start, never immediately; callers that want an
//! up-front refresh issue one themselves before starting the loop.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::dispatcher::Dispatcher;

/// Wall-clock period between automatic refresh sweeps.
pub const DEFAULT_REFRESH_PERIOD: Duration = Duration::from_secs(30);

/// Owns the background refresh task.
pub struct RefreshScheduler {
    handle: Option<JoinHandle<()>>,
}

impl RefreshScheduler {
    pub fn new() -> Self {
        Self { handle: None }
    }

    /// Spawns the refresh loop. Returns false without spawning when a loop
    /// is already running.
    pub fn start(&mut self, dispatcher: Arc<Dispatcher>, period: Duration) -> bool {
        if self.is_running() {
            return false;
        }
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // an empty roster skips the sweep without logging
                if dispatcher.device_count().await > 0 {
                    dispatcher.refresh_all().await;
                }
            }
        }));
        true
    }

    /// Stops any running loop and starts a fresh one, e.g. after a period
    /// change.
    pub fn restart(&mut self, dispatcher: Arc<Dispatcher>, period: Duration) {
        self.stop();
        self.start(dispatcher, period);
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Default for RefreshScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
