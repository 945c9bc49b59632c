use std::time::Duration;

use tokio::runtime::Handle;

use crate::{Timer, TimerCallback, TimerError, TimerHandle};

/// Timer backed by Tokio's time driver. Each scheduled callback is a task
/// that sleeps for the delay; cancelling aborts the task.
///
/// Because it relies on [`tokio::time::sleep`], it follows the runtime's
/// clock, including paused time in tests.
#[derive(Debug, Clone)]
pub struct TokioTimer {
    handle: Handle,
}

impl TokioTimer {
    /// Creates a timer spawning onto the given runtime.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Creates a timer spawning onto the runtime of the current thread.
    pub fn try_current() -> Result<Self, TimerError> {
        Ok(Self::new(Handle::try_current()?))
    }
}

impl Timer for TokioTimer {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        let task = self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        });
        let abort = task.abort_handle();
        TimerHandle::new(move || abort.abort())
    }
}
