use toastline_blocker::Blocker;
use toastline_bridge::toast::{ToastId, ToastRequest};
use toastline_timer::TimerHandle;

/// Where the scheduler is in a toast's lifecycle.
#[derive(Debug)]
pub(crate) enum Phase {
    /// Nothing on screen and nothing to show.
    Idle,
    /// Requests are queued; waiting for the registry to report that no toast
    /// blocker is active.
    WaitingForBlocker,
    /// A toast is on screen and its dismiss timer is armed.
    Displaying(ActiveToast),
}

impl Phase {
    pub fn kind(&self) -> SchedulerPhase {
        match self {
            Phase::Idle => SchedulerPhase::Idle,
            Phase::WaitingForBlocker => SchedulerPhase::WaitingForBlocker,
            Phase::Displaying(_) => SchedulerPhase::Displaying,
        }
    }
}

/// The toast currently on screen.
#[derive(Debug)]
pub(crate) struct ActiveToast {
    pub request: ToastRequest,
    /// Held from display until the grace period after the hide.
    pub blocker: Blocker,
    pub dismiss_timer: TimerHandle,
}

/// Blocker of a hidden toast, kept until its exit animation is over.
#[derive(Debug)]
pub(crate) struct PendingRelease {
    pub blocker: Blocker,
    pub grace_timer: TimerHandle,
}

/// Timer expiries routed back into the scheduler loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerEvent {
    /// The visible duration of a toast is over.
    DismissDue(ToastId),
    /// The grace period of a hidden toast's blocker is over.
    GraceElapsed(toastline_blocker::BlockerId),
}

/// Why the active toast is being hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DismissReason {
    Timeout,
    Swiped,
    ActionTapped,
}

/// Data-only view of [`Phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SchedulerPhase {
    Idle,
    WaitingForBlocker,
    Displaying,
}

/// Point-in-time view of the scheduler, for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SchedulerSnapshot {
    pub phase: SchedulerPhase,
    /// Requests waiting in the queue, not counting the active toast.
    pub queued: usize,
    /// Id of the toast on screen, if any.
    pub active: Option<ToastId>,
    /// Whether a hidden toast still holds its blocker.
    pub releasing: bool,
}
