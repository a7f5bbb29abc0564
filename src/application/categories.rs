//! Main-category taxonomy cache.
//!
//! Categories are domain-scoped and read-only, so they are fetched once per
//! marketplace and served from the cache afterwards. `refresh` bypasses the
//! cache for an explicit re-pull.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::domain::entities::MainCategory;
use crate::domain::value_objects::Marketplace;
use crate::infrastructure::api_client::ScanApi;
use crate::infrastructure::request::{RequestError, RequestSlot};

/// Read-through cache of the per-marketplace category taxonomy.
pub struct CategoryCatalog {
    api: Arc<dyn ScanApi>,
    slot: RequestSlot,
    cache: RwLock<HashMap<Marketplace, Vec<MainCategory>>>,
}

impl CategoryCatalog {
    #[must_use]
    pub fn new(api: Arc<dyn ScanApi>) -> Self {
        Self {
            api,
            slot: RequestSlot::new(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the marketplace's categories, fetching on the first miss.
    pub async fn categories_for(
        &self,
        marketplace: Marketplace,
    ) -> Result<Vec<MainCategory>, RequestError> {
        if let Some(cached) = self.cache.read().await.get(&marketplace) {
            debug!(%marketplace, "serving categories from cache");
            return Ok(cached.clone());
        }
        self.refresh(marketplace).await
    }

    /// Fetches and caches the marketplace's categories unconditionally.
    pub async fn refresh(
        &self,
        marketplace: Marketplace,
    ) -> Result<Vec<MainCategory>, RequestError> {
        let categories = self
            .slot
            .run(self.api.fetch_main_categories(marketplace))
            .await?;
        self.cache
            .write()
            .await
            .insert(marketplace, categories.clone());
        Ok(categories)
    }
}
