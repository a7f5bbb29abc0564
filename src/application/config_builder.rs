//! Scan configuration form state.
//!
//! Holds the form fields for all three scan types at once and assembles the
//! tagged [`ScanConfig`] for the selected type at submit time, after
//! exhaustive validation. Rank bounds are clamped against each other at the
//! point of edit, so an inverted range can never be submitted. Submitting
//! successfully clears transient entry state (the identifier set) while
//! structural settings - marketplace, type, strategy - stay put for the
//! next submission.

use chrono::{DateTime, Utc};
use tracing::info;

use crate::application::scan_list::ScanListSynchronizer;
use crate::domain::entities::{Scan, ScanType};
use crate::domain::identifier_set::IdentifierSet;
use crate::domain::scan_config::{ScanConfig, TraversalStrategy};
use crate::domain::value_objects::Marketplace;
use crate::infrastructure::request::RequestError;

/// Minimum accepted products-to-gather target for Category/Deals scans.
pub const MIN_PRODUCTS_TO_GATHER: u32 = 1;

/// Client-side validation failures; these block the submit before any
/// request is issued.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("add at least one ASIN before submitting")]
    EmptyAsinList,
    #[error("select a main category")]
    MissingCategory,
    #[error("number of products to gather must be at least {min}")]
    ProductTargetTooLow { min: u32 },
}

/// Submit failures: either the config never left the client, or the
/// enqueue request itself failed.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] ConfigError),
    #[error(transparent)]
    Request(#[from] RequestError),
}

/// Form state for assembling a scan configuration.
#[derive(Debug)]
pub struct ScanConfigBuilder {
    scan_type: ScanType,
    marketplace: Marketplace,
    main_category_id: Option<String>,
    strategy: TraversalStrategy,
    use_pages_skip: bool,
    pages_skip: u32,
    scrape_all_sections: bool,
    products_to_gather: u32,
    category_concurrent_requests: u32,
    category_max_requests: u32,
    products_concurrent_requests: u32,
    products_max_requests: u32,
    max_rerequests: u32,
    min_rank: u32,
    max_rank: u32,
    expires_at: Option<DateTime<Utc>>,
    asins: IdentifierSet,
}

impl Default for ScanConfigBuilder {
    fn default() -> Self {
        Self::new(IdentifierSet::default())
    }
}

impl ScanConfigBuilder {
    #[must_use]
    pub fn new(asins: IdentifierSet) -> Self {
        Self {
            scan_type: ScanType::Category,
            marketplace: Marketplace::Com,
            main_category_id: None,
            strategy: TraversalStrategy::BreadthFirstStart,
            use_pages_skip: false,
            pages_skip: 5,
            scrape_all_sections: false,
            products_to_gather: 100,
            category_concurrent_requests: 100,
            category_max_requests: 100,
            products_concurrent_requests: 100,
            products_max_requests: 100,
            max_rerequests: 3,
            min_rank: 1,
            max_rank: 10000,
            expires_at: None,
            asins,
        }
    }

    #[must_use]
    pub const fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    #[must_use]
    pub const fn marketplace(&self) -> Marketplace {
        self.marketplace
    }

    #[must_use]
    pub const fn min_rank(&self) -> u32 {
        self.min_rank
    }

    #[must_use]
    pub const fn max_rank(&self) -> u32 {
        self.max_rank
    }

    /// The curated identifier set backing the ASIN form.
    pub fn asins(&mut self) -> &mut IdentifierSet {
        &mut self.asins
    }

    #[must_use]
    pub fn asin_entries(&self) -> &IdentifierSet {
        &self.asins
    }

    pub fn set_scan_type(&mut self, scan_type: ScanType) {
        self.scan_type = scan_type;
    }

    /// Switching marketplace invalidates the category choice, which is
    /// scoped to the previous marketplace's taxonomy.
    pub fn set_marketplace(&mut self, marketplace: Marketplace) {
        if self.marketplace != marketplace {
            self.main_category_id = None;
        }
        self.marketplace = marketplace;
    }

    pub fn set_main_category(&mut self, id: Option<String>) {
        self.main_category_id = id;
    }

    pub fn set_strategy(&mut self, strategy: TraversalStrategy) {
        self.strategy = strategy;
    }

    pub fn set_use_pages_skip(&mut self, enabled: bool) {
        self.use_pages_skip = enabled;
    }

    pub fn set_pages_skip(&mut self, pages: u32) {
        self.pages_skip = pages.max(1);
    }

    pub fn set_scrape_all_sections(&mut self, enabled: bool) {
        self.scrape_all_sections = enabled;
    }

    pub fn set_products_to_gather(&mut self, target: u32) {
        self.products_to_gather = target;
    }

    pub fn set_category_concurrent_requests(&mut self, value: u32) {
        self.category_concurrent_requests = value;
    }

    pub fn set_category_max_requests(&mut self, value: u32) {
        self.category_max_requests = value;
    }

    pub fn set_products_concurrent_requests(&mut self, value: u32) {
        self.products_concurrent_requests = value;
    }

    pub fn set_products_max_requests(&mut self, value: u32) {
        self.products_max_requests = value;
    }

    pub fn set_max_rerequests(&mut self, value: u32) {
        self.max_rerequests = value;
    }

    pub fn set_expires_at(&mut self, expires_at: Option<DateTime<Utc>>) {
        self.expires_at = expires_at;
    }

    /// Edits the lower rank bound; pinned to the upper bound when it would
    /// cross it.
    pub fn set_min_rank(&mut self, value: u32) {
        self.min_rank = value.min(self.max_rank);
    }

    /// Edits the upper rank bound; pinned to the lower bound when it would
    /// cross it.
    pub fn set_max_rank(&mut self, value: u32) {
        self.max_rank = value.max(self.min_rank);
    }

    /// Assembles the tagged configuration for the selected type.
    ///
    /// # Errors
    /// Validation failures are reported before anything is serialized or
    /// sent; see [`ConfigError`].
    pub fn build(&self) -> Result<ScanConfig, ConfigError> {
        match self.scan_type {
            ScanType::Asins => {
                if self.asins.is_empty() {
                    return Err(ConfigError::EmptyAsinList);
                }
                Ok(ScanConfig::Asins {
                    marketplace: self.marketplace,
                    asins: self.asins.entries().to_vec(),
                    products_concurrent_requests: self.products_concurrent_requests,
                    max_rerequests: self.max_rerequests,
                    min_rank: self.min_rank,
                    max_rank: self.max_rank,
                    expires_at: self.expires_at,
                })
            }
            ScanType::Category => {
                let main_category_id = self
                    .main_category_id
                    .clone()
                    .ok_or(ConfigError::MissingCategory)?;
                if self.products_to_gather < MIN_PRODUCTS_TO_GATHER {
                    return Err(ConfigError::ProductTargetTooLow {
                        min: MIN_PRODUCTS_TO_GATHER,
                    });
                }
                Ok(ScanConfig::Category {
                    marketplace: self.marketplace,
                    main_category_id,
                    strategy: self.strategy,
                    pages_skip: self.use_pages_skip.then_some(self.pages_skip),
                    scrape_all_sections: self.scrape_all_sections,
                    products_to_gather: self.products_to_gather,
                    category_concurrent_requests: self.category_concurrent_requests,
                    category_max_requests: self.category_max_requests,
                    max_rerequests: self.max_rerequests,
                    min_rank: self.min_rank,
                    max_rank: self.max_rank,
                    expires_at: self.expires_at,
                })
            }
            ScanType::Deals => {
                if self.products_to_gather < MIN_PRODUCTS_TO_GATHER {
                    return Err(ConfigError::ProductTargetTooLow {
                        min: MIN_PRODUCTS_TO_GATHER,
                    });
                }
                Ok(ScanConfig::Deals {
                    marketplace: self.marketplace,
                    main_category_id: self.main_category_id.clone(),
                    products_to_gather: self.products_to_gather,
                    products_concurrent_requests: self.products_concurrent_requests,
                    products_max_requests: self.products_max_requests,
                    max_rerequests: self.max_rerequests,
                    min_rank: self.min_rank,
                    max_rank: self.max_rank,
                    expires_at: self.expires_at,
                })
            }
        }
    }

    /// Validates, submits, and on success clears the transient entry state
    /// while keeping the structural settings for the next submission.
    pub async fn submit(&mut self, list: &ScanListSynchronizer) -> Result<Scan, SubmitError> {
        let config = self.build()?;
        let scan = list.create(&config).await?;
        info!(id = %scan.id, scan_type = ?config.scan_type(), "scan configuration submitted");
        self.asins.reset();
        Ok(scan)
    }
}
