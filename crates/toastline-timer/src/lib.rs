//! One-shot timers with cancellation handles.
//!
//! The scheduler never sleeps itself: it asks a [`Timer`] to run a callback
//! after a delay and keeps the returned [`TimerHandle`] so the callback can be
//! called off when the toast goes away early. Two implementations ship here:
//! - [`runtime::TokioTimer`] spawns a task per timer on a Tokio runtime.
//! - [`manual::ManualTimer`] records timers and fires them on request, for
//!   tests that need to control interleavings exactly.

pub mod manual;
pub mod runtime;

use std::fmt;
use std::time::Duration;

/// Callback run when a timer expires.
pub type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// Errors produced while setting up a timer facility.
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    /// The Tokio timer was requested outside of a Tokio runtime.
    #[error("no tokio runtime is running on this thread")]
    NoRuntime(#[from] tokio::runtime::TryCurrentError),
}

/// A monotonic timer facility.
///
/// Implementations must not run the callback synchronously from within
/// [`Timer::schedule`], even for a zero delay.
pub trait Timer: Send + Sync {
    /// Runs `callback` once `delay` has elapsed, unless the returned handle is
    /// cancelled first.
    fn schedule(&self, delay: Duration, callback: TimerCallback) -> TimerHandle;
}

/// Cancels a scheduled callback.
///
/// Cancelling is idempotent and cancelling a timer that already fired does
/// nothing. Dropping the handle does *not* cancel the timer.
pub struct TimerHandle {
    cancel: Option<Box<dyn FnOnce() + Send + 'static>>,
}

impl TimerHandle {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Cancels the timer. Subsequent calls are no-ops.
    pub fn cancel(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }

    /// Whether [`TimerHandle::cancel`] was already called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_none()
    }
}

impl fmt::Debug for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerHandle")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
