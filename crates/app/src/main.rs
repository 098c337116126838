mod radio;
mod setup;

use std::sync::Arc;
use std::time::Duration;

use folio_api::server::{AppState, start_server};
use folio_core::common::time::{Clock, SystemClock};
use folio_core::settings::port::ConfigStore;
use folio_feed::http::HttpSnapshotProvider;
use folio_monitor::context::Monitor;
use folio_monitor::runtime::MonitorRuntime;
use folio_notify::console::{LogAudible, LogIndicator, LogVisual};
use folio_notify::dispatcher::Outputs;
use folio_store::json::JsonConfigStore;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::radio::HostRadio;

const CONFIG_FILE: &str = "folio.toml";

/// # Summary
/// Process entry point and composition root.
///
/// # Logic
/// 1. Load `.env`, the config file and `FOLIO__*` overrides.
/// 2. Install tracing and the TLS crypto provider.
/// 3. Open the settings store and build the feed, radio and output adapters.
/// 4. Spawn the monitor loop, then serve the API until Ctrl-C.
/// 5. Stop the loop and wait for it to return.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();
    let config = setup::load_config(CONFIG_FILE)?;
    let _log_guard = setup::init_tracing(&config.log)?;
    info!("Folio monitor starting...");

    if rustls::crypto::ring::default_provider().install_default().is_err() {
        warn!("A TLS crypto provider was already installed");
    }

    let store = JsonConfigStore::open(&config.storage.data_dir)?;
    info!(path = %store.path().display(), networks = store.settings().networks.len(), "Settings loaded");

    let provider = HttpSnapshotProvider::new(
        store.settings().feed.clone(),
        Duration::from_millis(config.monitor.fetch_timeout_ms),
    )?;
    let outputs = Outputs {
        audible: Arc::new(LogAudible),
        indicator: Arc::new(LogIndicator),
        visual: Arc::new(LogVisual),
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let monitor = Monitor::new(
        Box::new(store),
        Box::new(HostRadio::new(config.radio.clone())),
        Arc::new(provider),
        outputs,
        &config.monitor,
        clock.now(),
    );

    let (runtime, handle) = MonitorRuntime::new(monitor, clock, Duration::from_millis(config.monitor.loop_cadence_ms));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx = Arc::new(shutdown_tx);

    let loop_task = tokio::spawn(runtime.run(stopped(shutdown_rx.clone())));

    let signal_tx = Arc::clone(&shutdown_tx);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Cannot listen for Ctrl-C");
            return;
        }
        info!("Shutdown signal received");
        signal_tx.send_replace(true);
    });

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let served = start_server(AppState { monitor: handle }, &bind_addr, stopped(shutdown_rx)).await;
    // Server gone for any reason: stop the loop too.
    shutdown_tx.send_replace(true);

    let monitor = loop_task.await?;
    info!(
        lost_connections = monitor.link().lost_connection_count(),
        fetches = monitor.stats().success_count,
        fetch_errors = monitor.stats().error_count,
        "Folio monitor stopped"
    );
    served?;
    Ok(())
}

/// Resolves once the shutdown flag is raised or its sender is gone.
async fn stopped(mut rx: watch::Receiver<bool>) {
    if rx.wait_for(|stop| *stop).await.is_err() {
        debug!("Shutdown sender dropped");
    }
}
