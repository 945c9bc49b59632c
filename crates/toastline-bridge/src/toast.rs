use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Unique identifier for a toast request.
///
/// Identifiers are allocated from a process-wide counter when the request is
/// accepted, so two toasts never share an id even across independent
/// [`crate::ToastService`] handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    /// Allocates the next unique toast id.
    pub fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast#{}", self.0)
    }
}

/// Severity or category of a toast.
///
/// The scheduler never looks at it; it only travels to the presentation
/// layer, which picks the icon and colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastType {
    /// Neutral informational message.
    #[default]
    Information,
    /// A successful operation, e.g. a user got muted.
    Success,
    /// A recoverable problem, usually paired with [`ToastAction::TryAgain`].
    Warning,
    /// A failure the user should know about.
    Error,
}

/// Optional action button rendered inside the toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastAction {
    /// No button.
    #[default]
    None,
    TryAgain,
    Undo,
    LearnMore,
    Close,
}

/// Display data for a single toast. Opaque to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastPayload {
    /// Category, determining the visual style.
    pub toast_type: ToastType,
    /// Action button shown next to the title.
    pub action: ToastAction,
    /// The text content to display to the user.
    pub title: String,
    /// Distance in points between the toast and the bottom of the host view.
    pub bottom_padding: f32,
}

impl ToastPayload {
    /// Creates a payload with no action button and the default padding.
    pub fn new(toast_type: ToastType, title: impl Into<String>) -> Self {
        Self {
            toast_type,
            action: ToastAction::None,
            title: title.into(),
            bottom_padding: DEFAULT_BOTTOM_PADDING,
        }
    }

    /// Sets the action button.
    pub fn with_action(mut self, action: ToastAction) -> Self {
        self.action = action;
        self
    }

    /// Sets the bottom padding.
    pub fn with_bottom_padding(mut self, bottom_padding: f32) -> Self {
        self.bottom_padding = bottom_padding;
        self
    }
}

/// Bottom padding used when the caller does not provide one.
pub const DEFAULT_BOTTOM_PADDING: f32 = 24.0;

/// A queued toast: what to show and for how long.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastRequest {
    /// Identity of this request, assigned at enqueue time.
    pub id: ToastId,
    /// Data handed to the presentation layer.
    pub payload: ToastPayload,
    /// How long the toast stays on screen before it is dismissed
    /// automatically. Zero is legal.
    pub duration_visible: Duration,
}

/// Completion invoked when the user taps the action inside a toast.
///
/// The closure is consumed by [`ActionCallback::invoke`], so it can run at
/// most once.
pub struct ActionCallback(Box<dyn FnOnce() + Send + 'static>);

impl ActionCallback {
    pub fn new(callback: impl FnOnce() + Send + 'static) -> Self {
        Self(Box::new(callback))
    }

    /// Runs the callback, consuming it.
    pub fn invoke(self) {
        (self.0)()
    }
}

impl fmt::Debug for ActionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionCallback(..)")
    }
}

/// What the presentation layer needs to mount a toast.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastPresentation {
    /// Id to reference when reporting taps or swipes back.
    pub id: ToastId,
    /// Display data.
    pub payload: ToastPayload,
    /// Whether an action callback is attached, i.e. whether tapping the
    /// action button does anything besides closing the toast.
    pub has_action: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toast_ids_are_unique_and_increasing() {
        let first = ToastId::next();
        let second = ToastId::next();
        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn payload_builder_sets_fields() {
        let payload = ToastPayload::new(ToastType::Warning, "Something went wrong")
            .with_action(ToastAction::TryAgain)
            .with_bottom_padding(80.0);
        assert_eq!(payload.toast_type, ToastType::Warning);
        assert_eq!(payload.action, ToastAction::TryAgain);
        assert_eq!(payload.title, "Something went wrong");
        assert_eq!(payload.bottom_padding, 80.0);
    }

    #[test]
    fn action_callback_runs_closure() {
        use std::sync::Arc;
        use std::sync::atomic::AtomicUsize;

        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let callback = ActionCallback::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        callback.invoke();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
