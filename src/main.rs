//! Headless console runner: config, logging, client, refresh loops, ctrl-c.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use rankey_console::console::ScanConsole;
use rankey_console::infrastructure::api_client::{HttpScanApi, ScanApi};
use rankey_console::infrastructure::config::ConfigManager;
use rankey_console::infrastructure::event_stream::spawn_event_stream;
use rankey_console::infrastructure::logging::init_logging_with_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let manager = ConfigManager::new()?;
    let config = manager.load().await?;
    init_logging_with_config(&config.logging)?;
    info!(api = %config.api.base_url, "starting rankey console");

    let http_api = HttpScanApi::new(&config.api).context("failed to build API client")?;
    let api: Arc<dyn ScanApi> = Arc::new(http_api.clone());

    let mut console = ScanConsole::new(api, &config);
    if let Err(error) = console.scans.fetch_page(1).await {
        warn!("initial scan list fetch failed: {error}");
    }
    console.start();

    let event_stream = spawn_event_stream(
        http_api.client().clone(),
        http_api.events_url(),
        console.refresh_handle(),
        console.shutdown_token(),
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    info!("shutting down");
    console.shutdown().await;
    let _ = event_stream.await;
    Ok(())
}
