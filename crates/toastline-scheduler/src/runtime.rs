//! Scheduler runtime setup and orchestration.
//!
//! This module wires together configuration, the injected blocker registry,
//! the timer facility and the dispatch loop that listens to bridge commands.

use std::sync::Arc;
use std::thread;

use toastline_blocker::BlockerRegistry;
use toastline_bridge::config::SchedulerConfig;
use toastline_bridge::{MessageFromScheduler, MessageToScheduler};
use toastline_timer::runtime::TokioTimer;
use toastline_timer::{Timer, TimerError};
use tokio::sync::mpsc::{self, Sender, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::app::AppContext;
use crate::scheduler::ToastScheduler;

/// Errors raised while bringing the scheduler up.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The dedicated runtime or its thread could not be created.
    #[error("failed to start the scheduler runtime: {0}")]
    Runtime(#[from] std::io::Error),
    /// [`spawn`] was called outside of a Tokio runtime.
    #[error("failed to set up scheduler timers: {0}")]
    Timer(#[from] TimerError),
}

/// Starts the scheduler loop on the current Tokio runtime, using Tokio timers.
///
/// Fails with [`SchedulerError::Timer`] when called outside of a Tokio
/// runtime.
pub fn spawn(
    config: &SchedulerConfig,
    registry: Arc<BlockerRegistry>,
    rx: UnboundedReceiver<MessageToScheduler>,
    tx: Sender<MessageFromScheduler>,
) -> Result<JoinHandle<()>, SchedulerError> {
    let timer = Arc::new(TokioTimer::try_current()?);
    Ok(spawn_with_timer(config, registry, timer, rx, tx))
}

/// Starts the scheduler loop on the current Tokio runtime with a custom timer
/// facility.
///
/// # Panics
/// Panics when called outside of a Tokio runtime.
pub fn spawn_with_timer(
    config: &SchedulerConfig,
    registry: Arc<BlockerRegistry>,
    timer: Arc<dyn Timer>,
    rx: UnboundedReceiver<MessageToScheduler>,
    tx: Sender<MessageFromScheduler>,
) -> JoinHandle<()> {
    let (timer_tx, timer_rx) = mpsc::unbounded_channel();
    let scheduler = ToastScheduler::new(registry.clone(), timer, timer_tx, config.grace_period());
    let context = AppContext {
        scheduler,
        registry,
        tx,
    };
    log::info!(
        "Starting toast scheduler (grace period {:?})",
        config.grace_period()
    );
    tokio::spawn(context.consume_bridge_messages(rx, timer_rx))
}

/// Run the scheduler until its clients go away.
async fn setup_scheduler(
    config: SchedulerConfig,
    registry: Arc<BlockerRegistry>,
    rx: UnboundedReceiver<MessageToScheduler>,
    tx: Sender<MessageFromScheduler>,
) {
    let task = match spawn(&config, registry, rx, tx) {
        Ok(task) => task,
        Err(error) => {
            log::error!("Failed to start the toast scheduler: {error}");
            return;
        }
    };

    if let Err(error) = task.await {
        log::error!("Toast scheduler task failed: {error}");
    }
}

/// Spawn a dedicated thread with its own runtime and run the scheduler there.
///
/// The thread finishes once every sender of `rx` is dropped. `config` is
/// usually the one returned by [`crate::config::load_config_or_default`],
/// also used to build the bridge channels.
pub fn run(
    config: SchedulerConfig,
    registry: Arc<BlockerRegistry>,
    rx: UnboundedReceiver<MessageToScheduler>,
    tx: Sender<MessageFromScheduler>,
) -> Result<thread::JoinHandle<()>, SchedulerError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("toast-scheduler-worker")
        .enable_all()
        .build()?;

    let handle = thread::Builder::new()
        .name("toast-scheduler".into())
        .spawn(move || {
            runtime.block_on(setup_scheduler(config, registry, rx, tx));
        })?;
    Ok(handle)
}
