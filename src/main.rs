mod console;

use std::sync::Arc;

use toastline_blocker::BlockerRegistry;
use toastline_bridge::BridgeChannels;

fn main() -> anyhow::Result<()> {
    simple_logger::SimpleLogger::new()
        .with_colors(true)
        .with_threads(true)
        .with_local_timestamps()
        .init()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let config = runtime.block_on(toastline_scheduler::config::load_config_or_default());

    let registry = Arc::new(BlockerRegistry::new());
    let channels = BridgeChannels::from_config(&config);
    let service = channels.toast_service();
    let presenter = channels.presenter_handle();
    let BridgeChannels {
        presenter_rx,
        client_tx,
        scheduler_rx,
        scheduler_tx,
        ..
    } = channels;
    // Only the service and the presenter keep the scheduler alive from here.
    drop(client_tx);

    let scheduler = toastline_scheduler::run(config, registry.clone(), scheduler_rx, scheduler_tx)?;
    console::run(runtime, presenter_rx, presenter, service, registry)?;

    scheduler
        .join()
        .map_err(|_| anyhow::anyhow!("toast scheduler thread panicked"))?;
    Ok(())
}
