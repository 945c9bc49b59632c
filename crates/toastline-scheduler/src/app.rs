//! Scheduler context and message dispatching.
//!
//! The context owns the [`ToastScheduler`] and is the single consumer of
//! every event source: commands from the bridge, timer expiries and blocker
//! readiness. All mutations of the queue, the active toast and the callback
//! map therefore happen on this one task.

use std::sync::Arc;

use toastline_blocker::BlockerRegistry;
use toastline_bridge::{MessageFromScheduler, MessageToScheduler};
use tokio::sync::mpsc::{Sender, UnboundedReceiver};

use crate::scheduler::{TOAST_BLOCKERS, ToastScheduler};
use crate::state::TimerEvent;

pub(crate) struct AppContext {
    pub scheduler: ToastScheduler,
    pub registry: Arc<BlockerRegistry>,
    /// Outbound channel to the presentation layer.
    pub tx: Sender<MessageFromScheduler>,
}

impl AppContext {
    /// Runs until every command sender is dropped.
    pub async fn consume_bridge_messages(
        mut self,
        mut rx: UnboundedReceiver<MessageToScheduler>,
        mut timer_rx: UnboundedReceiver<TimerEvent>,
    ) {
        loop {
            let waiting = self.scheduler.is_waiting_for_blocker();
            // Only register with the registry while a toast is actually queued.
            let blocker_ready = waiting.then(|| self.registry.wait_for_non_blocker(TOAST_BLOCKERS));

            tokio::select! {
                biased;

                message = rx.recv() => match message {
                    Some(message) => {
                        log::debug!("Got a scheduler message: {message:?}");
                        self.dispatch_message(message);
                    }
                    None => break,
                },
                Some(event) = timer_rx.recv() => {
                    log::trace!("Timer expired: {event:?}");
                    self.scheduler.on_timer_event(event);
                }
                () = async move {
                    if let Some(ready) = blocker_ready {
                        ready.await;
                    }
                }, if waiting => {
                    self.scheduler.on_blocker_ready();
                }
            }

            self.flush().await;
            let state = self.scheduler.snapshot();
            log::trace!(
                "Scheduler {:?}: {} queued, active {:?}, releasing {}",
                state.phase,
                state.queued,
                state.active,
                state.releasing
            );
        }

        log::info!("All toast clients are gone, stopping the scheduler");
        self.scheduler.clear_current_toast();
        self.flush().await;
    }

    /// Dispatches a command down to the state machine.
    fn dispatch_message(&mut self, message: MessageToScheduler) {
        match message {
            MessageToScheduler::ShowToast { request, callback } => {
                self.scheduler.show(request, callback);
            }
            MessageToScheduler::ClearCurrentToast => {
                self.scheduler.clear_current_toast();
            }
            MessageToScheduler::ActionTapped(id) => {
                self.scheduler.on_action_tapped(id);
            }
            MessageToScheduler::SwipeDismissed(id) => {
                self.scheduler.on_swipe_dismissed(id);
            }
        }
    }

    /// Sends the events produced by the last transition to the presentation
    /// layer.
    ///
    /// The event channel is bounded: when it is full this waits for the
    /// presenter, and no command or timer is handled in the meantime.
    async fn flush(&mut self) {
        for message in self.scheduler.take_events() {
            if let Err(error) = self.tx.send(message).await {
                log::warn!("Presentation layer is gone, dropping {:?}", error.0);
            }
        }
    }
}
