use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration of the toast scheduler.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// How long the blocker of a hidden toast is still held, in milliseconds.
    /// Matches the exit animation of the banner, so the next toast never
    /// appears while the previous one is sliding out.
    pub grace_period_milliseconds: u64,
    /// Visible duration used by [`crate::ToastService::show_toast_default`],
    /// in seconds.
    pub default_visible_seconds: f64,
    /// Capacity of the channel carrying events to the presentation layer.
    ///
    /// The scheduler waits for room in this channel before it handles the
    /// next command or timer. A presenter that stays alive but stops reading
    /// therefore stalls the whole scheduler once the buffer is full.
    pub presenter_buffer: usize,
}

impl SchedulerConfig {
    /// Grace period as a [`Duration`].
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_milliseconds)
    }

    /// Default visible duration, or `None` if the configured value is
    /// negative, NaN or too large to represent.
    pub fn default_visible_duration(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.default_visible_seconds).ok()
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            grace_period_milliseconds: 500,
            default_visible_seconds: 5.0,
            presenter_buffer: 64,
        }
    }
}
