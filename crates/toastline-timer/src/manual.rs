use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{Timer, TimerCallback, TimerHandle};

/// A timer that only fires when told to.
///
/// Every call to [`Timer::schedule`] is recorded in order. Tests inspect the
/// recorded delays and fire entries by index, including entries whose handle
/// was cancelled, to reproduce a timer racing its own cancellation.
#[derive(Default)]
pub struct ManualTimer {
    scheduled: Mutex<Vec<ScheduledTimer>>,
}

struct ScheduledTimer {
    delay: Duration,
    callback: Option<TimerCallback>,
    cancelled: Arc<AtomicBool>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers scheduled so far.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Delay requested for the timer at `index`.
    pub fn delay(&self, index: usize) -> Option<Duration> {
        self.lock().get(index).map(|timer| timer.delay)
    }

    /// Whether the handle of the timer at `index` was cancelled.
    pub fn is_cancelled(&self, index: usize) -> bool {
        self.lock()
            .get(index)
            .is_some_and(|timer| timer.cancelled.load(Ordering::SeqCst))
    }

    /// Fires the timer at `index` if it is not cancelled. Returns whether the
    /// callback ran.
    pub fn fire(&self, index: usize) -> bool {
        if self.is_cancelled(index) {
            return false;
        }
        self.force_fire(index)
    }

    /// Fires the timer at `index` even if its handle was cancelled, as if the
    /// expiry had already been in flight. Each callback still runs at most
    /// once.
    pub fn force_fire(&self, index: usize) -> bool {
        // Taken out before running so the callback may schedule new timers.
        let callback = self
            .lock()
            .get_mut(index)
            .and_then(|timer| timer.callback.take());
        match callback {
            Some(callback) => {
                callback();
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ScheduledTimer>> {
        // A panicking callback never runs under the lock, so poisoning only
        // means a test already failed elsewhere.
        self.scheduled
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Timer for ManualTimer {
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle {
        log::trace!("Recording manual timer for {delay:?}");
        let cancelled = Arc::new(AtomicBool::new(false));
        self.lock().push(ScheduledTimer {
            delay,
            callback: Some(callback),
            cancelled: cancelled.clone(),
        });
        TimerHandle::new(move || cancelled.store(true, Ordering::SeqCst))
    }
}
