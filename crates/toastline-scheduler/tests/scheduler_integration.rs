//! End-to-end behaviour of the scheduler loop on a paused Tokio clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use toastline_blocker::{Blocker, BlockerRegistry, BlockerType};
use toastline_bridge::config::SchedulerConfig;
use toastline_bridge::toast::{
    ActionCallback, ToastAction, ToastId, ToastPayload, ToastPresentation, ToastType,
};
use toastline_bridge::{BridgeChannels, MessageFromScheduler, PresenterHandle, ToastService};
use tokio::sync::mpsc::Receiver;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};

const GRACE: Duration = Duration::from_millis(500);
const TOAST: &[BlockerType] = &[BlockerType::Toast];

struct Fixture {
    registry: Arc<BlockerRegistry>,
    service: ToastService,
    presenter: PresenterHandle,
    events: Receiver<MessageFromScheduler>,
    task: JoinHandle<()>,
}

impl Fixture {
    fn start() -> Self {
        Self::start_with_registry(Arc::new(BlockerRegistry::new()))
    }

    fn start_with_registry(registry: Arc<BlockerRegistry>) -> Self {
        let config = SchedulerConfig {
            grace_period_milliseconds: GRACE.as_millis() as u64,
            ..SchedulerConfig::default()
        };
        Self::start_with(registry, config)
    }

    fn start_with(registry: Arc<BlockerRegistry>, config: SchedulerConfig) -> Self {
        let channels = BridgeChannels::from_config(&config);
        let service = channels.toast_service();
        let presenter = channels.presenter_handle();
        let BridgeChannels {
            presenter_rx,
            scheduler_rx,
            scheduler_tx,
            ..
        } = channels;
        let task = toastline_scheduler::spawn(&config, registry.clone(), scheduler_rx, scheduler_tx)
            .expect("inside a runtime");
        Self {
            registry,
            service,
            presenter,
            events: presenter_rx,
            task,
        }
    }

    fn show(&self, title: &str, secs: u64) -> ToastId {
        self.service
            .show_toast(
                ToastPayload::new(ToastType::Information, title),
                Duration::from_secs(secs),
                None,
            )
            .unwrap()
    }

    fn show_with_action(&self, secs: u64, calls: &Arc<AtomicUsize>) -> ToastId {
        let calls = calls.clone();
        self.service
            .show_toast(
                ToastPayload::new(ToastType::Warning, "Something went wrong")
                    .with_action(ToastAction::TryAgain),
                Duration::from_secs(secs),
                Some(ActionCallback::new(move || {
                    calls.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .unwrap()
    }

    async fn next_event(&mut self) -> Option<ToastPresentation> {
        let MessageFromScheduler::ToastToShow(shown) =
            timeout(Duration::from_secs(60), self.events.recv())
                .await
                .expect("scheduler produced no event")
                .expect("scheduler stopped");
        shown
    }

    async fn expect_show(&mut self) -> ToastPresentation {
        self.next_event().await.expect("expected a toast to be shown")
    }

    async fn expect_hide(&mut self) {
        let shown = self.next_event().await;
        assert!(shown.is_none(), "expected a hide, got {shown:?}");
    }

    /// Asserts that nothing is emitted for a long while.
    async fn expect_silence(&mut self) {
        let result = timeout(Duration::from_secs(30), self.events.recv()).await;
        assert!(result.is_err(), "unexpected event: {result:?}");
    }
}

fn assert_near(actual: Duration, expected: Duration) {
    let tolerance = Duration::from_millis(10);
    assert!(
        actual + tolerance >= expected && actual <= expected + tolerance,
        "expected about {expected:?}, got {actual:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn external_toast_blocker_delays_display_until_removed() {
    let registry = Arc::new(BlockerRegistry::new());
    let external = Blocker::new(BlockerType::Toast);
    registry.add(external.clone());
    let mut fixture = Fixture::start_with_registry(registry.clone());

    let id = fixture.show("T1", 5);
    fixture.expect_silence().await;

    let released_at = Instant::now();
    registry.remove(&external);

    let shown = fixture.expect_show().await;
    assert_eq!(shown.id, id);
    assert_near(released_at.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn back_to_back_toasts_respect_duration_and_grace_period() {
    let mut fixture = Fixture::start();
    let start = Instant::now();

    let first = fixture.show("T1", 2);
    let second = fixture.show("T2", 2);

    assert_eq!(fixture.expect_show().await.id, first);
    assert_near(start.elapsed(), Duration::ZERO);

    fixture.expect_hide().await;
    assert_near(start.elapsed(), Duration::from_secs(2));

    assert_eq!(fixture.expect_show().await.id, second);
    assert_near(start.elapsed(), Duration::from_secs(2) + GRACE);

    fixture.expect_hide().await;
    assert_near(start.elapsed(), Duration::from_secs(4) + GRACE);
}

#[tokio::test(start_paused = true)]
async fn swipe_dismisses_early_without_callback_or_duplicate_hide() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut fixture = Fixture::start();
    let start = Instant::now();

    let id = fixture.show_with_action(5, &calls);
    let shown = fixture.expect_show().await;
    assert_eq!(shown.id, id);
    assert!(shown.has_action);

    sleep(Duration::from_millis(500)).await;
    fixture.presenter.swipe_dismissed(id).unwrap();

    fixture.expect_hide().await;
    assert_near(start.elapsed(), Duration::from_millis(500));

    fixture.expect_silence().await;
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn action_tap_invokes_callback_exactly_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut fixture = Fixture::start();

    let id = fixture.show_with_action(5, &calls);
    fixture.expect_show().await;

    sleep(Duration::from_secs(1)).await;
    fixture.presenter.action_tapped(id).unwrap();
    fixture.presenter.action_tapped(id).unwrap();
    fixture.presenter.swipe_dismissed(id).unwrap();

    fixture.expect_hide().await;
    fixture.expect_silence().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn toasts_are_displayed_in_arrival_order() {
    let registry = Arc::new(BlockerRegistry::new());
    let external = Blocker::new(BlockerType::Toast);
    registry.add(external.clone());
    let mut fixture = Fixture::start_with_registry(registry.clone());

    let ids: Vec<ToastId> = (0..5).map(|n| fixture.show(&format!("T{n}"), 1)).collect();
    sleep(Duration::from_secs(1)).await;
    registry.remove(&external);

    let mut shown = Vec::new();
    for _ in &ids {
        shown.push(fixture.expect_show().await.id);
        fixture.expect_hide().await;
    }
    assert_eq!(shown, ids);
}

#[tokio::test(start_paused = true)]
async fn hide_always_precedes_next_display_by_the_grace_period() {
    let mut fixture = Fixture::start();
    for n in 0..4 {
        fixture.show(&format!("T{n}"), n);
    }

    let mut last_hide: Option<Instant> = None;
    for _ in 0..4 {
        fixture.expect_show().await;
        if let Some(hidden_at) = last_hide {
            assert!(hidden_at.elapsed() + Duration::from_millis(1) >= GRACE);
        }
        assert!(fixture.registry.is_blocked(TOAST));

        fixture.expect_hide().await;
        last_hide = Some(Instant::now());
        // The blocker outlives the hide.
        assert!(fixture.registry.is_blocked(TOAST));
        assert_eq!(
            fixture
                .registry
                .active_blockers()
                .iter()
                .filter(|blocker| blocker.blocker_type() == BlockerType::Toast)
                .count(),
            1
        );
    }

    sleep(GRACE + Duration::from_millis(10)).await;
    assert!(!fixture.registry.is_blocked(TOAST));
}

#[tokio::test(start_paused = true)]
async fn clear_current_toast_is_immediate_and_idempotent() {
    let mut fixture = Fixture::start();

    fixture.service.clear_current_toast().unwrap();
    fixture.show("T1", 10);
    fixture.expect_show().await;

    let cleared_at = Instant::now();
    fixture.service.clear_current_toast().unwrap();
    fixture.expect_hide().await;
    assert_near(cleared_at.elapsed(), Duration::ZERO);
    assert!(!fixture.registry.is_blocked(TOAST));

    fixture.service.clear_current_toast().unwrap();
    fixture.expect_silence().await;
    assert!(!fixture.registry.is_blocked(TOAST));
}

#[tokio::test(start_paused = true)]
async fn feature_waiting_on_toasts_gets_a_turn_between_queued_toasts() {
    let mut fixture = Fixture::start();
    fixture.show("T1", 2);
    fixture.show("T2", 2);
    fixture.expect_show().await;

    let login = tokio::spawn(fixture.registry.wait_for_non_blocker(TOAST));
    fixture.expect_hide().await;
    fixture.expect_show().await;

    // The scheduler took the blocker back right away, but the waiter was
    // released when the first toast's blocker went away.
    assert!(fixture.registry.is_blocked(TOAST));
    timeout(Duration::from_millis(1), login)
        .await
        .expect("waiter released during the hand-over")
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn full_presenter_buffer_holds_events_back_without_losing_them() {
    let config = SchedulerConfig {
        grace_period_milliseconds: GRACE.as_millis() as u64,
        presenter_buffer: 1,
        ..SchedulerConfig::default()
    };
    let mut fixture = Fixture::start_with(Arc::new(BlockerRegistry::new()), config);
    let ids: Vec<ToastId> = (0..3).map(|n| fixture.show(&format!("T{n}"), 1)).collect();

    // Nobody reads for a while; the loop waits on the full channel.
    sleep(Duration::from_secs(30)).await;

    for id in ids {
        assert_eq!(fixture.expect_show().await.id, id);
        fixture.expect_hide().await;
    }
}

#[tokio::test(start_paused = true)]
async fn other_blocker_types_are_neither_awaited_nor_released() {
    let registry = Arc::new(BlockerRegistry::new());
    let authentication = Blocker::new(BlockerType::Authentication);
    registry.add(authentication.clone());
    let mut fixture = Fixture::start_with_registry(registry.clone());

    let start = Instant::now();
    fixture.show("T1", 1);
    fixture.expect_show().await;
    assert_near(start.elapsed(), Duration::ZERO);

    fixture.expect_hide().await;
    fixture.service.clear_current_toast().unwrap();
    sleep(GRACE * 2).await;

    assert_eq!(registry.active_blockers(), vec![authentication]);
}

#[tokio::test(start_paused = true)]
async fn zero_duration_toast_is_shown_then_hidden() {
    let mut fixture = Fixture::start();
    let start = Instant::now();

    fixture.show("T0", 0);
    fixture.expect_show().await;
    fixture.expect_hide().await;

    assert_near(start.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn scheduler_stops_once_clients_are_gone() {
    let Fixture {
        service,
        presenter,
        mut events,
        task,
        ..
    } = Fixture::start();

    service
        .show_toast(
            ToastPayload::new(ToastType::Success, "Muted"),
            Duration::from_secs(30),
            None,
        )
        .unwrap();
    assert!(matches!(
        events.recv().await,
        Some(MessageFromScheduler::ToastToShow(Some(_)))
    ));

    drop(service);
    drop(presenter);

    timeout(Duration::from_secs(1), task)
        .await
        .expect("scheduler stopped")
        .unwrap();
    // The active toast is torn down on the way out.
    assert!(matches!(
        events.recv().await,
        Some(MessageFromScheduler::ToastToShow(None))
    ));
}

#[test]
fn dedicated_scheduler_thread_exits_when_clients_are_dropped() {
    let config = SchedulerConfig::default();
    let registry = Arc::new(BlockerRegistry::new());
    let channels = BridgeChannels::from_config(&config);
    let service = channels.toast_service();
    let BridgeChannels {
        mut presenter_rx,
        client_tx,
        scheduler_rx,
        scheduler_tx,
        ..
    } = channels;
    drop(client_tx);

    let thread = toastline_scheduler::run(config, registry.clone(), scheduler_rx, scheduler_tx)
        .expect("scheduler thread started");

    service
        .show_toast(
            ToastPayload::new(ToastType::Success, "Muted"),
            Duration::from_secs(30),
            None,
        )
        .unwrap();
    assert!(matches!(
        presenter_rx.blocking_recv(),
        Some(MessageFromScheduler::ToastToShow(Some(_)))
    ));

    drop(service);
    thread.join().expect("scheduler thread panicked");

    assert_eq!(
        presenter_rx.blocking_recv(),
        Some(MessageFromScheduler::ToastToShow(None))
    );
    assert_eq!(presenter_rx.blocking_recv(), None);
    assert!(!registry.is_blocked(TOAST));
}
