//! Headless presentation layer.
//!
//! Mounts toasts by logging them and plays the part of the user: it taps the
//! action of toasts that carry one and swipes away toasts with a close
//! button. Everything else is left to auto-dismiss.

use std::sync::Arc;
use std::time::Duration;

use toastline_blocker::{Blocker, BlockerRegistry, BlockerType};
use toastline_bridge::toast::{
    ActionCallback, ToastAction, ToastPayload, ToastPresentation, ToastType,
};
use toastline_bridge::{MessageFromScheduler, PresenterHandle, ToastService};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::Receiver;

const TAP_DELAY: Duration = Duration::from_millis(1200);
const SWIPE_DELAY: Duration = Duration::from_millis(700);

/// Runs the demo on `runtime` until every toast was hidden.
///
/// The runtime is dropped on return together with any interaction still
/// pending, so no client handle outlives this call and the scheduler shuts
/// down.
pub fn run(
    runtime: Runtime,
    events: Receiver<MessageFromScheduler>,
    presenter: PresenterHandle,
    service: ToastService,
    registry: Arc<BlockerRegistry>,
) -> anyhow::Result<()> {
    runtime.block_on(present(events, presenter, service, registry))
}

async fn present(
    mut events: Receiver<MessageFromScheduler>,
    presenter: PresenterHandle,
    service: ToastService,
    registry: Arc<BlockerRegistry>,
) -> anyhow::Result<()> {
    let expected = enqueue_demo_toasts(&service)?;
    let login = tokio::spawn(login_flow(registry));

    let mut hidden = 0;
    while hidden < expected {
        let Some(MessageFromScheduler::ToastToShow(shown)) = events.recv().await else {
            log::warn!("Scheduler stopped before all toasts were shown");
            break;
        };
        match shown {
            Some(toast) => {
                mount(&toast);
                interact(&presenter, &toast);
            }
            None => {
                hidden += 1;
                log::info!("Toast hidden ({hidden}/{expected})");
            }
        }
    }

    login.await?;
    Ok(())
}

fn enqueue_demo_toasts(service: &ToastService) -> anyhow::Result<usize> {
    service.show_toast(
        ToastPayload::new(ToastType::Success, "Comment posted"),
        Duration::from_secs(2),
        None,
    )?;
    service.show_toast(
        ToastPayload::new(ToastType::Warning, "Something went wrong")
            .with_action(ToastAction::TryAgain),
        Duration::from_secs(4),
        Some(ActionCallback::new(|| log::info!("Retrying the vote"))),
    )?;
    service.show_toast(
        ToastPayload::new(ToastType::Information, "Swipe me away").with_action(ToastAction::Close),
        Duration::from_secs(5),
        None,
    )?;
    service.show_toast_default(
        ToastPayload::new(ToastType::Error, "Could not load the conversation")
            .with_bottom_padding(80.0),
        None,
    )?;
    Ok(4)
}

fn mount(toast: &ToastPresentation) {
    log::info!(
        "Showing {} [{:?}] {:?} (action: {:?}, padding {})",
        toast.id,
        toast.payload.toast_type,
        toast.payload.title,
        toast.payload.action,
        toast.payload.bottom_padding
    );
}

fn interact(presenter: &PresenterHandle, toast: &ToastPresentation) {
    let id = toast.id;
    let presenter = presenter.clone();
    if toast.has_action {
        tokio::spawn(async move {
            tokio::time::sleep(TAP_DELAY).await;
            log::info!("Tapping the action of {id}");
            if let Err(error) = presenter.action_tapped(id) {
                log::warn!("Could not report tap: {error}");
            }
        });
    } else if toast.payload.action == ToastAction::Close {
        tokio::spawn(async move {
            tokio::time::sleep(SWIPE_DELAY).await;
            log::info!("Swiping {id} away");
            if let Err(error) = presenter.swipe_dismissed(id) {
                log::warn!("Could not report swipe: {error}");
            }
        });
    }
}

/// Another exclusive feature: waits until no toast is on screen, then takes
/// the screen for a while.
async fn login_flow(registry: Arc<BlockerRegistry>) {
    tokio::time::sleep(Duration::from_millis(100)).await;
    registry
        .wait_for_non_blocker(&[BlockerType::Toast, BlockerType::Authentication])
        .await;

    let blocker = Blocker::new(BlockerType::Authentication);
    registry.add(blocker.clone());
    log::info!("Login flow presented");
    tokio::time::sleep(Duration::from_secs(1)).await;
    registry.remove(&blocker);
    log::info!("Login flow finished");
}
