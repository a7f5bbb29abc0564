//! Console wiring.
//!
//! Builds the synchronizers on top of one `ScanApi` and runs the refresh
//! loop: the server push stream, the poll fallback timer, and post-action
//! confirmations all funnel into a single channel of [`RefreshSignal`]s,
//! and only the consumer loop applies them to the scan list. Selection is
//! coordinated here so the detail tracker always follows the list.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::application::banner::StatusBanner;
use crate::application::categories::CategoryCatalog;
use crate::application::providers::ProviderSettings;
use crate::application::scan_detail::ScanDetailTracker;
use crate::application::scan_list::ScanListSynchronizer;
use crate::domain::entities::{Selection, ScanResultSet};
use crate::domain::events::RefreshSignal;
use crate::domain::value_objects::ScanId;
use crate::infrastructure::api_client::ScanApi;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::export::{build_report, ExportError, ReportArtifact};
use crate::infrastructure::request::RequestError;

/// Capacity of the refresh channel; refreshes coalesce, so backlog depth
/// carries no information.
const REFRESH_CHANNEL_CAPACITY: usize = 16;

/// The assembled client console core.
pub struct ScanConsole {
    pub scans: Arc<ScanListSynchronizer>,
    pub details: ScanDetailTracker,
    pub categories: CategoryCatalog,
    pub providers: ProviderSettings,
    pub banner: StatusBanner,
    api: Arc<dyn ScanApi>,
    refresh_tx: mpsc::Sender<RefreshSignal>,
    refresh_rx: Option<mpsc::Receiver<RefreshSignal>>,
    list_poll_interval: Duration,
    shutdown: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl ScanConsole {
    #[must_use]
    pub fn new(api: Arc<dyn ScanApi>, config: &AppConfig) -> Self {
        let (refresh_tx, refresh_rx) = mpsc::channel(REFRESH_CHANNEL_CAPACITY);
        Self {
            scans: Arc::new(ScanListSynchronizer::new(Arc::clone(&api))),
            details: ScanDetailTracker::new(
                Arc::clone(&api),
                Duration::from_secs(config.sync.detail_poll_interval_secs),
            ),
            categories: CategoryCatalog::new(Arc::clone(&api)),
            providers: ProviderSettings::new(Arc::clone(&api)),
            banner: StatusBanner::new(Duration::from_secs(config.sync.banner_clear_secs)),
            api,
            refresh_tx,
            refresh_rx: Some(refresh_rx),
            list_poll_interval: Duration::from_secs(config.sync.list_poll_interval_secs),
            shutdown: CancellationToken::new(),
            tasks: Vec::new(),
        }
    }

    /// Sender for external refresh triggers (the event stream subscriber).
    #[must_use]
    pub fn refresh_handle(&self) -> mpsc::Sender<RefreshSignal> {
        self.refresh_tx.clone()
    }

    #[must_use]
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Spawns the consumer loop and the poll fallback timer.
    ///
    /// # Panics
    /// Panics if called twice; the console runs one refresh loop.
    pub fn start(&mut self) {
        let mut rx = self
            .refresh_rx
            .take()
            .expect("console refresh loop already started");

        let scans = Arc::clone(&self.scans);
        let banner = self.banner.clone();
        let shutdown = self.shutdown.clone();
        self.tasks.push(tokio::spawn(async move {
            loop {
                let signal = tokio::select! {
                    () = shutdown.cancelled() => break,
                    signal = rx.recv() => match signal {
                        Some(signal) => signal,
                        None => break,
                    },
                };
                debug!(%signal, "refreshing scan list");
                if let Err(error) = scans.refresh().await {
                    if !error.is_cancelled() {
                        banner.show(error.to_string());
                    }
                }
            }
        }));

        let refresh_tx = self.refresh_tx.clone();
        let poll_interval = self.list_poll_interval;
        let shutdown = self.shutdown.clone();
        self.tasks.push(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll_interval);
            ticker.tick().await; // the initial fetch is not the timer's job
            loop {
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                // A full channel means a refresh is already queued; the
                // poll tick coalesces into it.
                let _ = refresh_tx.try_send(RefreshSignal::PollTick);
            }
        }));

        info!("console refresh loop started");
    }

    /// Selects a scan: list selection and detail tracking move together.
    pub async fn select_scan(&self, id: ScanId) {
        self.scans.select(id.clone()).await;
        self.details.select(Selection::Selected(id)).await;
    }

    /// Clears the selection and stops detail tracking.
    pub async fn clear_selection(&self) {
        self.scans.clear_selection().await;
        self.details.select(Selection::None).await;
    }

    /// Deletes a scan; when it was the selected one, detail tracking stops
    /// with the cleared selection.
    pub async fn delete_scan(&self, id: &ScanId) -> Result<(), RequestError> {
        let was_selected = self.scans.selection().await.is_selected(id);
        self.scans.delete(id).await?;
        if was_selected {
            self.details.select(Selection::None).await;
        }
        Ok(())
    }

    /// Deletes every scan and clears selection and detail tracking.
    pub async fn delete_all_scans(&self) -> Result<(), RequestError> {
        self.scans.delete_all().await?;
        self.details.select(Selection::None).await;
        Ok(())
    }

    /// Fetches a scan's result set and builds the export artifact.
    pub async fn export_report(&self, id: &ScanId) -> Result<ReportArtifact, ConsoleExportError> {
        let state = self.scans.snapshot().await;
        let scan = state
            .scans
            .iter()
            .find(|scan| &scan.id == id)
            .cloned()
            .ok_or_else(|| ConsoleExportError::UnknownScan(id.clone()))?;
        let results: ScanResultSet = self
            .api
            .fetch_results(id)
            .await
            .map_err(RequestError::from)?;
        Ok(build_report(&scan, &results)?)
    }

    /// Stops every owned task. Idempotent.
    pub async fn shutdown(&mut self) {
        self.shutdown.cancel();
        self.details.select(Selection::None).await;
        for task in self.tasks.drain(..) {
            if let Err(error) = task.await {
                if !error.is_cancelled() {
                    warn!("console task ended abnormally: {error}");
                }
            }
        }
        info!("console stopped");
    }
}

/// Export failures at the console level.
#[derive(Debug, thiserror::Error)]
pub enum ConsoleExportError {
    #[error("scan {0} is not in the current list")]
    UnknownScan(ScanId),
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Export(#[from] ExportError),
}
