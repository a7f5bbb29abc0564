//! Scraping provider settings.
//!
//! Providers are mutated only by explicit operator actions - select, set
//! key, renew - never polled. Selecting a provider without a configured API
//! key is a recognized structured error that turns into a
//! prompt-for-credential flow instead of a failure.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::domain::entities::ScrapingProviderInfo;
use crate::infrastructure::api_client::{ApiError, ScanApi};
use crate::infrastructure::request::{RequestError, RequestSlot};

/// Outcome of a provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    /// The service refused because no API key is configured; the caller
    /// should prompt for one and retry via [`ProviderSettings::set_key`].
    NeedsApiKey,
}

/// Client-side view of the provider settings panel.
pub struct ProviderSettings {
    api: Arc<dyn ScanApi>,
    slot: RequestSlot,
    providers: RwLock<Vec<ScrapingProviderInfo>>,
}

impl ProviderSettings {
    #[must_use]
    pub fn new(api: Arc<dyn ScanApi>) -> Self {
        Self {
            api,
            slot: RequestSlot::new(),
            providers: RwLock::new(Vec::new()),
        }
    }

    pub async fn providers(&self) -> Vec<ScrapingProviderInfo> {
        self.providers.read().await.clone()
    }

    /// Re-fetches the provider list.
    pub async fn refresh(&self) -> Result<(), RequestError> {
        let providers = self.slot.run(self.api.fetch_providers()).await?;
        *self.providers.write().await = providers;
        Ok(())
    }

    /// Selects a provider; a missing API key is a secondary flow, not an
    /// error.
    pub async fn select(&self, name: &str) -> Result<SelectOutcome, RequestError> {
        match self.slot.run(self.api.select_provider(name)).await {
            Ok(()) => {
                info!(provider = name, "scraping provider selected");
                self.refresh_after_action().await;
                Ok(SelectOutcome::Selected)
            }
            Err(RequestError::Api(error)) if error.is_missing_api_key() => {
                info!(provider = name, "provider needs an API key");
                Ok(SelectOutcome::NeedsApiKey)
            }
            Err(error) => Err(error),
        }
    }

    /// Stores the provider's API key.
    pub async fn set_key(&self, name: &str, key: &str) -> Result<(), RequestError> {
        self.slot.run(self.api.set_provider_key(name, key)).await?;
        self.refresh_after_action().await;
        Ok(())
    }

    /// Renews the provider's quota/subscription.
    pub async fn renew(&self, name: &str) -> Result<(), RequestError> {
        self.slot.run(self.api.renew_provider(name)).await?;
        self.refresh_after_action().await;
        Ok(())
    }

    #[must_use]
    pub fn last_error(&self) -> Option<ApiError> {
        self.slot.last_error()
    }

    async fn refresh_after_action(&self) {
        if let Err(error) = self.refresh().await {
            if !error.is_cancelled() {
                warn!("provider list refresh failed: {error}");
            }
        }
    }
}
