//! The toast state machine.
//!
//! [`ToastScheduler`] is plain synchronous state owned by one task. It never
//! waits: blocker readiness and timer expiries are delivered to it as calls
//! by the loop in [`crate::app`], and the events it produces for the
//! presentation layer accumulate in an outbox the loop drains after each
//! call.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use toastline_blocker::{Blocker, BlockerRegistry, BlockerType};
use toastline_bridge::MessageFromScheduler;
use toastline_bridge::toast::{ActionCallback, ToastId, ToastPresentation, ToastRequest};
use toastline_timer::{Timer, TimerHandle};

use crate::callbacks::ActionCallbacks;
use crate::queue::ToastQueue;
use crate::state::{
    ActiveToast, DismissReason, PendingRelease, Phase, SchedulerSnapshot, TimerEvent,
};

/// Blocker types the scheduler waits on. It never touches any other type.
pub(crate) const TOAST_BLOCKERS: &[BlockerType] = &[BlockerType::Toast];

pub(crate) struct ToastScheduler {
    registry: Arc<BlockerRegistry>,
    timer: Arc<dyn Timer>,
    timer_tx: UnboundedSender<TimerEvent>,
    grace_period: Duration,

    queue: ToastQueue,
    callbacks: ActionCallbacks,
    phase: Phase,
    releasing: Option<PendingRelease>,
    outbox: Vec<MessageFromScheduler>,
}

impl ToastScheduler {
    pub fn new(
        registry: Arc<BlockerRegistry>,
        timer: Arc<dyn Timer>,
        timer_tx: UnboundedSender<TimerEvent>,
        grace_period: Duration,
    ) -> Self {
        Self {
            registry,
            timer,
            timer_tx,
            grace_period,
            queue: ToastQueue::new(),
            callbacks: ActionCallbacks::new(),
            phase: Phase::Idle,
            releasing: None,
            outbox: Vec::new(),
        }
    }

    /// Whether the loop should be waiting for blocker readiness.
    pub fn is_waiting_for_blocker(&self) -> bool {
        matches!(self.phase, Phase::WaitingForBlocker)
    }

    /// Events produced since the last call, in order.
    pub fn take_events(&mut self) -> Vec<MessageFromScheduler> {
        std::mem::take(&mut self.outbox)
    }

    pub fn snapshot(&self) -> SchedulerSnapshot {
        SchedulerSnapshot {
            phase: self.phase.kind(),
            queued: self.queue.len(),
            active: self.active_id(),
            releasing: self.releasing.is_some(),
        }
    }

    /// Accepts a new request behind everything already queued.
    pub fn show(&mut self, request: ToastRequest, callback: Option<ActionCallback>) {
        log::debug!(
            "Queueing {} for {:?} ({} already queued)",
            request.id,
            request.duration_visible,
            self.queue.len()
        );
        self.callbacks.register(request.id, callback);
        self.queue.insert(request);
        if matches!(self.phase, Phase::Idle) {
            self.phase = Phase::WaitingForBlocker;
        }
    }

    /// Called once the registry reports that no toast blocker is active.
    pub fn on_blocker_ready(&mut self) {
        if !self.is_waiting_for_blocker() {
            return;
        }
        if self.queue.is_empty() {
            self.phase = Phase::Idle;
            return;
        }

        let blocker = Blocker::new(BlockerType::Toast);
        if !self.registry.try_add_exclusive(blocker.clone()) {
            // Another toast blocker appeared after readiness was reported.
            log::debug!("Toast blocker taken before {} could acquire it", blocker.id());
            return;
        }

        let Some(request) = self.queue.pop_first() else {
            self.registry.remove(&blocker);
            self.phase = Phase::Idle;
            return;
        };

        log::info!(
            "Displaying {} ({:?}: {:?}) for {:?}",
            request.id,
            request.payload.toast_type,
            request.payload.title,
            request.duration_visible
        );
        self.outbox
            .push(MessageFromScheduler::ToastToShow(Some(ToastPresentation {
                id: request.id,
                payload: request.payload.clone(),
                has_action: self.callbacks.has_callback(request.id),
            })));

        let id = request.id;
        let dismiss_timer = self.arm(request.duration_visible, TimerEvent::DismissDue(id));
        self.phase = Phase::Displaying(ActiveToast {
            request,
            blocker,
            dismiss_timer,
        });
    }

    /// Routes an expired timer.
    pub fn on_timer_event(&mut self, event: TimerEvent) {
        match event {
            TimerEvent::DismissDue(id) => {
                self.dismiss(id, DismissReason::Timeout);
            }
            TimerEvent::GraceElapsed(blocker_id) => {
                let Some(pending) = self.releasing.take_if(|p| p.blocker.id() == blocker_id)
                else {
                    log::trace!("Ignoring stale grace timer for {blocker_id}");
                    return;
                };
                log::debug!("Grace period over, releasing {blocker_id}");
                self.registry.remove(&pending.blocker);
            }
        }
    }

    /// The user swiped the toast away.
    pub fn on_swipe_dismissed(&mut self, id: ToastId) {
        self.dismiss(id, DismissReason::Swiped);
    }

    /// The user tapped the action button. Runs the callback and closes the
    /// toast.
    pub fn on_action_tapped(&mut self, id: ToastId) {
        if self.active_id() != Some(id) {
            log::debug!(
                "Ignoring action tap on {id} (not on screen, pending: {})",
                self.callbacks.contains(id)
            );
            return;
        }
        self.callbacks.invoke(id);
        self.dismiss(id, DismissReason::ActionTapped);
    }

    /// Tears down the active toast without waiting for the grace period, and
    /// releases a blocker still lingering from a previous toast. Queued
    /// requests are kept.
    pub fn clear_current_toast(&mut self) {
        if let Phase::Displaying(mut active) = std::mem::replace(&mut self.phase, Phase::Idle) {
            let id = active.request.id;
            log::info!("Clearing {id}");
            active.dismiss_timer.cancel();
            self.callbacks.clear(id);
            self.outbox.push(MessageFromScheduler::ToastToShow(None));
            self.registry.remove(&active.blocker);
        }
        if let Some(mut pending) = self.releasing.take() {
            log::debug!("Releasing {} before its grace period", pending.blocker.id());
            pending.grace_timer.cancel();
            self.registry.remove(&pending.blocker);
        }
        self.phase = self.phase_after_hide();
    }

    /// Hides the active toast if it is `id`. The first caller wins; later
    /// calls for the same toast find it gone and do nothing.
    fn dismiss(&mut self, id: ToastId, reason: DismissReason) -> bool {
        let mut active = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Displaying(active) if active.request.id == id => active,
            other => {
                self.phase = other;
                log::trace!("Ignoring {reason:?} for {id}, not on screen");
                return false;
            }
        };

        log::info!("Hiding {id} ({reason:?})");
        active.dismiss_timer.cancel();
        self.callbacks.clear(id);
        self.outbox.push(MessageFromScheduler::ToastToShow(None));

        let grace_timer = self.arm(
            self.grace_period,
            TimerEvent::GraceElapsed(active.blocker.id()),
        );
        let previous = self.releasing.replace(PendingRelease {
            blocker: active.blocker,
            grace_timer,
        });
        if let Some(mut previous) = previous {
            previous.grace_timer.cancel();
            self.registry.remove(&previous.blocker);
        }

        self.phase = self.phase_after_hide();
        true
    }

    fn phase_after_hide(&self) -> Phase {
        if self.queue.is_empty() {
            Phase::Idle
        } else {
            Phase::WaitingForBlocker
        }
    }

    fn active_id(&self) -> Option<ToastId> {
        match &self.phase {
            Phase::Displaying(active) => Some(active.request.id),
            _ => None,
        }
    }

    fn arm(&self, delay: Duration, event: TimerEvent) -> TimerHandle {
        let tx = self.timer_tx.clone();
        self.timer.schedule(
            delay,
            Box::new(move || {
                // The loop owns the receiver; if it is gone nobody cares.
                let _ = tx.send(event);
            }),
        )
    }
}
