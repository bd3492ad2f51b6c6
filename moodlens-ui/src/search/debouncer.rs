//! Cancel-and-reschedule timer for search requests

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Single-shot timer that runs an action after a quiet period
///
/// Arming the timer again before it fires invalidates the previous action,
/// so only the action from the most recent quiet period ever runs. Once the
/// timer fires the action is spawned as its own task: re-arming afterwards
/// does not abort work that has already started.
pub struct SearchDebouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm the timer with `action`, replacing any armed action
    pub fn schedule<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            trace!("Debounce timer fired");
            tokio::spawn(action);
        }));
    }

    /// Disarm the timer; returns true if an action was still waiting
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) => {
                let was_armed = !handle.is_finished();
                handle.abort();
                was_armed
            }
            None => false,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.pending
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
