//! Single-flight request lifecycle.
//!
//! A [`RequestSlot`] wraps one logical network slot (the scan list, the
//! detail panel, one settings action). Issuing a new call supersedes any
//! prior uncompleted call from the same slot; at most one invocation per
//! slot ever commits. Cancellation - explicit, by supersession, or by drop -
//! settles silently and never mutates the slot's observable state.
//!
//! Each invocation owns its own cancellation token and a monotonic sequence
//! number; there is no shared mutable controller reused across calls.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use tokio_util::sync::CancellationToken;

use crate::infrastructure::api_client::ApiError;

/// Observable state of the slot's most recent invocation.
#[derive(Debug, Clone, Default)]
pub struct RequestState {
    pub loading: bool,
    pub error: Option<ApiError>,
}

/// Settlement of one invocation.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// The call was cancelled or superseded; not a user-visible error.
    #[error("request cancelled")]
    Cancelled,
}

impl RequestError {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// One logical network slot with loading/error/cancel semantics.
#[derive(Debug)]
pub struct RequestSlot {
    token: Mutex<CancellationToken>,
    seq: AtomicU64,
    state: Mutex<RequestState>,
}

impl Default for RequestSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestSlot {
    #[must_use]
    pub fn new() -> Self {
        Self {
            token: Mutex::new(CancellationToken::new()),
            seq: AtomicU64::new(0),
            state: Mutex::new(RequestState::default()),
        }
    }

    /// Drives `fut` under this slot's lifecycle.
    ///
    /// Cancels any prior uncompleted invocation, sets `loading` for the
    /// duration, and settles with the payload, a structured error, or
    /// [`RequestError::Cancelled`]. A superseded invocation settles as
    /// cancelled even if its future happened to finish first: only the
    /// latest sequence number may commit state.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, RequestError>
    where
        F: std::future::Future<Output = Result<T, ApiError>>,
    {
        let token = {
            let mut guard = self.token.lock().expect("slot token lock");
            guard.cancel();
            *guard = CancellationToken::new();
            guard.clone()
        };
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.state.lock().expect("slot state lock");
            state.loading = true;
            state.error = None;
        }

        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => Err(RequestError::Cancelled),
            result = fut => result.map_err(RequestError::Api),
        };

        if self.seq.load(Ordering::SeqCst) != seq {
            // A newer invocation owns the slot now; this settlement must not
            // touch loading, error, or caller data.
            return Err(RequestError::Cancelled);
        }

        let mut state = self.state.lock().expect("slot state lock");
        state.loading = false;
        match &outcome {
            Ok(_) => state.error = None,
            Err(RequestError::Api(error)) => state.error = Some(error.clone()),
            // Explicit cancel of the latest call: stop loading, keep error
            // untouched so cancellation never surfaces as a failure.
            Err(RequestError::Cancelled) => {}
        }
        outcome
    }

    /// Cancels the pending invocation, if any. Idempotent.
    pub fn cancel(&self) {
        self.token.lock().expect("slot token lock").cancel();
    }

    #[must_use]
    pub fn state(&self) -> RequestState {
        self.state.lock().expect("slot state lock").clone()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.lock().expect("slot state lock").loading
    }

    #[must_use]
    pub fn last_error(&self) -> Option<ApiError> {
        self.state.lock().expect("slot state lock").error.clone()
    }
}

impl Drop for RequestSlot {
    fn drop(&mut self) {
        if let Ok(token) = self.token.lock() {
            token.cancel();
        }
    }
}
