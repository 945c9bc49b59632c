//! Communication bridge between the toast scheduler and the rest of the SDK.
//!
//! This crate defines the types and protocols used to connect three parties:
//! - Callers anywhere in the SDK, which request toasts through a
//!   [`ToastService`].
//! - The presentation layer, which mounts and unmounts the banner and reports
//!   taps and swipes back through a [`PresenterHandle`].
//! - The scheduler, which consumes [`MessageToScheduler`] and pushes
//!   [`MessageFromScheduler`] events.
//!
//! Commands travel over an unbounded [`tokio::sync::mpsc`] channel so that
//! requesting a toast never blocks the caller. Events to the presentation
//! layer use a bounded channel, providing back-pressure. Both are bundled in
//! [`BridgeChannels`].

pub mod config;
pub mod toast;

use std::time::Duration;

use tokio::sync::mpsc::{self, Receiver, Sender, UnboundedReceiver, UnboundedSender};

use crate::toast::{ActionCallback, ToastId, ToastPayload, ToastPresentation, ToastRequest};

/// Errors reported by the client handles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// The scheduler loop is gone, so the command could not be delivered.
    #[error("toast scheduler is no longer running")]
    SchedulerClosed,
}

/// Events emitted by the scheduler to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageFromScheduler {
    /// `Some` when a toast becomes active and should be mounted, `None` when
    /// the active toast is hidden and the banner should be dismissed.
    ToastToShow(Option<ToastPresentation>),
}

/// Commands accepted by the scheduler.
#[derive(Debug)]
pub enum MessageToScheduler {
    /// Enqueue a toast, with an optional completion for its action button.
    ShowToast {
        request: ToastRequest,
        callback: Option<ActionCallback>,
    },
    /// Tear the active toast down immediately, skipping the grace period.
    ClearCurrentToast,
    /// The user tapped the action button of the given toast.
    ActionTapped(ToastId),
    /// The user swiped the given toast past the dismiss threshold.
    SwipeDismissed(ToastId),
}

/// Cloneable handle used by SDK code to request toasts.
#[derive(Debug, Clone)]
pub struct ToastService {
    tx: UnboundedSender<MessageToScheduler>,
    default_visible: Duration,
}

impl ToastService {
    /// Wraps a command sender. The default visible duration comes from
    /// [`config::SchedulerConfig::default`].
    pub fn new(tx: UnboundedSender<MessageToScheduler>) -> Self {
        let default_visible = config::SchedulerConfig::default()
            .default_visible_duration()
            .unwrap_or(FALLBACK_VISIBLE_DURATION);
        Self {
            tx,
            default_visible,
        }
    }

    /// Overrides the duration used by [`ToastService::show_toast_default`].
    pub fn with_default_visible(mut self, duration: Duration) -> Self {
        self.default_visible = duration;
        self
    }

    /// Enqueues a toast and returns its id right away.
    ///
    /// The callback, if any, runs at most once, when the user taps the action
    /// button while the toast is on screen.
    pub fn show_toast(
        &self,
        payload: ToastPayload,
        duration_visible: Duration,
        callback: Option<ActionCallback>,
    ) -> Result<ToastId, BridgeError> {
        let request = ToastRequest {
            id: ToastId::next(),
            payload,
            duration_visible,
        };
        let id = request.id;
        self.send(MessageToScheduler::ShowToast { request, callback })?;
        Ok(id)
    }

    /// Same as [`ToastService::show_toast`] with the default visible duration.
    pub fn show_toast_default(
        &self,
        payload: ToastPayload,
        callback: Option<ActionCallback>,
    ) -> Result<ToastId, BridgeError> {
        self.show_toast(payload, self.default_visible, callback)
    }

    /// Forces immediate teardown of the active toast.
    pub fn clear_current_toast(&self) -> Result<(), BridgeError> {
        self.send(MessageToScheduler::ClearCurrentToast)
    }

    fn send(&self, message: MessageToScheduler) -> Result<(), BridgeError> {
        self.tx
            .send(message)
            .map_err(|_| BridgeError::SchedulerClosed)
    }
}

/// Used when the configured default visible duration is not representable.
const FALLBACK_VISIBLE_DURATION: Duration = Duration::from_secs(5);

/// Handle used by the presentation layer to report user interaction.
#[derive(Debug, Clone)]
pub struct PresenterHandle {
    tx: UnboundedSender<MessageToScheduler>,
}

impl PresenterHandle {
    pub fn new(tx: UnboundedSender<MessageToScheduler>) -> Self {
        Self { tx }
    }

    /// Reports a tap on the action button of `id`.
    pub fn action_tapped(&self, id: ToastId) -> Result<(), BridgeError> {
        self.tx
            .send(MessageToScheduler::ActionTapped(id))
            .map_err(|_| BridgeError::SchedulerClosed)
    }

    /// Reports that `id` was swiped past the dismiss threshold.
    pub fn swipe_dismissed(&self, id: ToastId) -> Result<(), BridgeError> {
        self.tx
            .send(MessageToScheduler::SwipeDismissed(id))
            .map_err(|_| BridgeError::SchedulerClosed)
    }
}

/// Paired channels connecting the scheduler with its clients.
pub struct BridgeChannels {
    /// Receiver used by the presentation layer to get toast events.
    pub presenter_rx: Receiver<MessageFromScheduler>,
    /// Sender shared by callers and the presentation layer to issue commands.
    /// The scheduler stops once this and every handle cloned from it are
    /// dropped.
    pub client_tx: UnboundedSender<MessageToScheduler>,

    /// Receiver used by the scheduler to get commands.
    pub scheduler_rx: UnboundedReceiver<MessageToScheduler>,
    /// Sender used by the scheduler to push events to the presentation layer.
    pub scheduler_tx: Sender<MessageFromScheduler>,

    default_visible: Duration,
}

impl BridgeChannels {
    /// Creates a new set of bridged channels. `buffer` bounds the event
    /// channel towards the presentation layer.
    pub fn new(buffer: usize) -> Self {
        let (to_scheduler_tx, to_scheduler_rx) = mpsc::unbounded_channel();
        let (to_presenter_tx, to_presenter_rx) = mpsc::channel(buffer);
        Self {
            client_tx: to_scheduler_tx,
            presenter_rx: to_presenter_rx,
            scheduler_rx: to_scheduler_rx,
            scheduler_tx: to_presenter_tx,
            default_visible: FALLBACK_VISIBLE_DURATION,
        }
    }

    /// Creates channels sized by `config`, handing out services that use its
    /// default visible duration.
    pub fn from_config(config: &config::SchedulerConfig) -> Self {
        let mut channels = Self::new(config.presenter_buffer);
        if let Some(duration) = config.default_visible_duration() {
            channels.default_visible = duration;
        }
        channels
    }

    /// A [`ToastService`] feeding this bridge.
    pub fn toast_service(&self) -> ToastService {
        ToastService::new(self.client_tx.clone()).with_default_visible(self.default_visible)
    }

    /// A [`PresenterHandle`] feeding this bridge.
    pub fn presenter_handle(&self) -> PresenterHandle {
        PresenterHandle::new(self.client_tx.clone())
    }
}

impl Default for BridgeChannels {
    fn default() -> Self {
        Self::from_config(&config::SchedulerConfig::default())
    }
}
