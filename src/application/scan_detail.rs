//! Live detail snapshot of the selected scan.
//!
//! On every selection change the tracker cancels whatever fetch is pending
//! for the previous selection, discards the previous snapshot, and fetches
//! a fresh one. While the snapshot reports the scan as active, a poll task
//! re-fetches it at a fixed cadence; the task is owned through a
//! cancellation token so every interval has exactly one matching teardown,
//! reachable on selection change, on drop, and on the scan leaving the
//! active state.
//!
//! Snapshots are replaced wholesale. Each outgoing fetch carries a
//! monotonic sequence number and only the latest issued sequence may
//! commit, so an out-of-order completion can never overwrite fresher data
//! with a stale snapshot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::domain::entities::{ScanDetail, Selection};
use crate::domain::value_objects::ScanId;
use crate::infrastructure::api_client::{ApiError, ScanApi};
use crate::infrastructure::request::{RequestError, RequestSlot};

#[derive(Debug)]
struct TrackerInner {
    snapshot: RwLock<Option<ScanDetail>>,
    selection: RwLock<Selection>,
    /// Latest issued fetch sequence; stale completions are discarded.
    issue: AtomicU64,
    poll_token: Mutex<CancellationToken>,
    slot: RequestSlot,
}

impl Drop for TrackerInner {
    fn drop(&mut self) {
        if let Ok(token) = self.poll_token.lock() {
            token.cancel();
        }
    }
}

/// Tracks the detail snapshot for the currently selected scan.
#[derive(Clone)]
pub struct ScanDetailTracker {
    api: Arc<dyn ScanApi>,
    poll_interval: Duration,
    inner: Arc<TrackerInner>,
}

impl ScanDetailTracker {
    #[must_use]
    pub fn new(api: Arc<dyn ScanApi>, poll_interval: Duration) -> Self {
        Self {
            api,
            poll_interval,
            inner: Arc::new(TrackerInner {
                snapshot: RwLock::new(None),
                selection: RwLock::new(Selection::None),
                issue: AtomicU64::new(0),
                poll_token: Mutex::new(CancellationToken::new()),
                slot: RequestSlot::new(),
            }),
        }
    }

    pub async fn snapshot(&self) -> Option<ScanDetail> {
        self.inner.snapshot.read().await.clone()
    }

    pub async fn selection(&self) -> Selection {
        self.inner.selection.read().await.clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.inner.slot.is_loading()
    }

    #[must_use]
    pub fn last_error(&self) -> Option<ApiError> {
        self.inner.slot.last_error()
    }

    /// Switches the tracked selection.
    ///
    /// Cancels the pending fetch and poll task of the previous selection,
    /// clears its snapshot, then fetches a fresh one and starts polling if
    /// the scan turns out to be active.
    pub async fn select(&self, selection: Selection) {
        self.stop_polling();
        self.inner.slot.cancel();
        // Invalidate any in-flight completion for the old selection.
        self.inner.issue.fetch_add(1, Ordering::SeqCst);

        *self.inner.snapshot.write().await = None;
        *self.inner.selection.write().await = selection.clone();

        let Selection::Selected(id) = selection else {
            return;
        };
        if let Some(detail) = self.refresh_once(&id).await {
            if detail.state.is_active() {
                self.spawn_poller(id);
            }
        }
    }

    /// One sequence-tagged fetch; commits only if still the latest issue
    /// for an unchanged selection.
    async fn refresh_once(&self, id: &ScanId) -> Option<ScanDetail> {
        let issue = self.inner.issue.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.inner.slot.run(self.api.fetch_detail(id)).await;

        match result {
            Ok(detail) => {
                if self.inner.issue.load(Ordering::SeqCst) != issue {
                    debug!(%id, "discarding stale detail snapshot");
                    return None;
                }
                if !self.inner.selection.read().await.is_selected(id) {
                    return None;
                }
                *self.inner.snapshot.write().await = Some(detail.clone());
                Some(detail)
            }
            Err(RequestError::Cancelled) => None,
            Err(RequestError::Api(error)) => {
                warn!(%id, "detail fetch failed: {error}");
                None
            }
        }
    }

    fn spawn_poller(&self, id: ScanId) {
        let token = {
            let mut guard = self.inner.poll_token.lock().expect("poll token lock");
            guard.cancel();
            *guard = CancellationToken::new();
            guard.clone()
        };

        let tracker = self.clone();
        let interval = self.poll_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // The selection fetch already produced a snapshot; skip the
            // immediate first tick.
            ticker.tick().await;
            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                match tracker.refresh_once(&id).await {
                    // Scan left the active state: no further poll is
                    // scheduled.
                    Some(detail) if !detail.state.is_active() => {
                        debug!(%id, state = ?detail.state, "detail polling finished");
                        break;
                    }
                    Some(_) => {}
                    // Superseded or failed; a newer selection owns the
                    // tracker now, or the next tick retries.
                    None => {
                        if token.is_cancelled() {
                            break;
                        }
                    }
                }
            }
        });
    }

    fn stop_polling(&self) {
        self.inner
            .poll_token
            .lock()
            .expect("poll token lock")
            .cancel();
    }
}
