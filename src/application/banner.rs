//! Dismissible status banner with auto-clear.
//!
//! Transport and server errors surface here; the banner clears itself after
//! a fixed delay unless dismissed first. The clear timer is owned through a
//! cancellation token so replacing the banner always tears down the
//! previous timer.

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

#[derive(Debug)]
struct BannerInner {
    message: RwLock<Option<String>>,
    timer_token: Mutex<CancellationToken>,
}

impl Drop for BannerInner {
    fn drop(&mut self) {
        if let Ok(token) = self.timer_token.lock() {
            token.cancel();
        }
    }
}

/// Transient, auto-clearing status message.
#[derive(Debug, Clone)]
pub struct StatusBanner {
    inner: Arc<BannerInner>,
    clear_after: Duration,
}

impl StatusBanner {
    #[must_use]
    pub fn new(clear_after: Duration) -> Self {
        Self {
            inner: Arc::new(BannerInner {
                message: RwLock::new(None),
                timer_token: Mutex::new(CancellationToken::new()),
            }),
            clear_after,
        }
    }

    /// Shows a message and schedules its auto-clear, replacing any banner
    /// (and timer) already up.
    pub fn show(&self, message: impl Into<String>) {
        *self.inner.message.write().expect("banner lock") = Some(message.into());

        let token = {
            let mut guard = self.inner.timer_token.lock().expect("banner timer lock");
            guard.cancel();
            *guard = CancellationToken::new();
            guard.clone()
        };
        let inner = Arc::clone(&self.inner);
        let clear_after = self.clear_after;
        tokio::spawn(async move {
            tokio::select! {
                () = token.cancelled() => {}
                () = tokio::time::sleep(clear_after) => {
                    *inner.message.write().expect("banner lock") = None;
                }
            }
        });
    }

    /// Dismisses the banner immediately.
    pub fn dismiss(&self) {
        self.inner
            .timer_token
            .lock()
            .expect("banner timer lock")
            .cancel();
        *self.inner.message.write().expect("banner lock") = None;
    }

    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.inner.message.read().expect("banner lock").clone()
    }
}
