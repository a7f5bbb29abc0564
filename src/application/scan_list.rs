//! Authoritative local scan list.
//!
//! The synchronizer owns the only client-side copy of the scan list. It is
//! fed by exactly one operation - an authoritative page fetch that replaces
//! the current page's contents wholesale - no matter whether the trigger was
//! a manual navigation, a server push, the poll fallback, or the forced
//! re-fetch after a lifecycle action. Repeating a fetch is idempotent, so
//! re-entrant triggers (a push arriving mid-refresh) cannot corrupt
//! pagination or selection state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::domain::entities::{Scan, ScanPage, Selection};
use crate::domain::scan_config::ScanConfig;
use crate::domain::value_objects::ScanId;
use crate::infrastructure::api_client::{ApiError, ScanApi};
use crate::infrastructure::request::{RequestError, RequestSlot};

/// Snapshot of the synchronized list state.
#[derive(Debug, Clone)]
pub struct ListState {
    pub scans: Vec<Scan>,
    pub total_pages: u32,
    pub current_page: u32,
    pub selection: Selection,
}

impl Default for ListState {
    fn default() -> Self {
        Self {
            scans: Vec::new(),
            total_pages: 1,
            current_page: 1,
            selection: Selection::None,
        }
    }
}

/// Keeps the local scan list consistent with the server.
pub struct ScanListSynchronizer {
    api: Arc<dyn ScanApi>,
    /// Single-flight slot for page fetches; a new fetch supersedes a
    /// pending one.
    fetch_slot: RequestSlot,
    /// Separate slot for lifecycle mutations so an action is not cancelled
    /// by a concurrent refresh.
    action_slot: RequestSlot,
    state: RwLock<ListState>,
}

impl ScanListSynchronizer {
    #[must_use]
    pub fn new(api: Arc<dyn ScanApi>) -> Self {
        Self {
            api,
            fetch_slot: RequestSlot::new(),
            action_slot: RequestSlot::new(),
            state: RwLock::new(ListState::default()),
        }
    }

    pub async fn snapshot(&self) -> ListState {
        self.state.read().await.clone()
    }

    pub async fn selection(&self) -> Selection {
        self.state.read().await.selection.clone()
    }

    /// The selected scan's current row, if it is on the fetched page.
    pub async fn selected_scan(&self) -> Option<Scan> {
        let state = self.state.read().await;
        let id = state.selection.id()?;
        state.scans.iter().find(|scan| &scan.id == id).cloned()
    }

    pub async fn select(&self, id: ScanId) {
        self.state.write().await.selection = Selection::Selected(id);
    }

    pub async fn clear_selection(&self) {
        self.state.write().await.selection.clear();
    }

    /// Authoritative pull: replaces the page contents and total-page count.
    ///
    /// The requested page is clamped against the freshest total so a page
    /// index is never left dangling past the end of the list.
    pub async fn fetch_page(&self, page: u32) -> Result<(), RequestError> {
        let requested = page.max(1);
        let fetched: ScanPage = self.fetch_slot.run(self.api.fetch_scans(requested)).await?;

        let mut state = self.state.write().await;
        state.total_pages = fetched.total_pages.max(1);
        state.current_page = requested.min(state.total_pages);
        state.scans = fetched.scans;
        debug!(
            page = state.current_page,
            total = state.total_pages,
            scans = state.scans.len(),
            "scan list replaced"
        );
        Ok(())
    }

    /// Re-fetches the current page.
    pub async fn refresh(&self) -> Result<(), RequestError> {
        let page = self.state.read().await.current_page;
        self.fetch_page(page).await
    }

    /// Submits a new scan configuration and optimistically inserts the
    /// enqueued scan until the forced re-fetch confirms it.
    pub async fn create(&self, config: &ScanConfig) -> Result<Scan, RequestError> {
        let scan = self.action_slot.run(self.api.enqueue_scan(config)).await?;
        info!(id = %scan.id, "scan enqueued");
        self.state.write().await.scans.insert(0, scan.clone());
        self.refresh_after_action().await;
        Ok(scan)
    }

    /// Deletes one scan. Clears the selection when it pointed at the
    /// deleted row, so later actions never operate on a stale selection.
    pub async fn delete(&self, id: &ScanId) -> Result<(), RequestError> {
        self.action_slot.run(self.api.delete_scan(id)).await?;
        {
            let mut state = self.state.write().await;
            if state.selection.is_selected(id) {
                state.selection.clear();
            }
            state.scans.retain(|scan| &scan.id != id);
        }
        self.refresh_after_action().await;
        Ok(())
    }

    /// Deletes every scan and clears the selection unconditionally.
    pub async fn delete_all(&self) -> Result<(), RequestError> {
        self.action_slot.run(self.api.delete_all_scans()).await?;
        {
            let mut state = self.state.write().await;
            state.selection.clear();
            state.scans.clear();
            state.total_pages = 1;
            state.current_page = 1;
        }
        self.refresh_after_action().await;
        Ok(())
    }

    /// Halts scan processing on the server.
    pub async fn halt(&self) -> Result<(), RequestError> {
        self.action_slot.run(self.api.halt_scans()).await?;
        self.refresh_after_action().await;
        Ok(())
    }

    /// Resumes scan processing on the server.
    pub async fn resume(&self) -> Result<(), RequestError> {
        self.action_slot.run(self.api.resume_scans()).await?;
        self.refresh_after_action().await;
        Ok(())
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.fetch_slot.is_loading()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<ApiError> {
        self.fetch_slot.last_error()
    }

    /// Fire-and-forget confirmation fetch after a mutation. A superseded
    /// fetch is fine - some fresher refresh already replaced it.
    async fn refresh_after_action(&self) {
        if let Err(error) = self.refresh().await {
            if !error.is_cancelled() {
                warn!("post-action refresh failed: {error}");
            }
        }
    }
}
