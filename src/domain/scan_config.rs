//! Scan configuration payloads.
//!
//! One tagged variant per scan type, so the shape is validated exhaustively
//! before serialization instead of being spread together field by field at
//! submit time. The serialized form carries the discriminant in `type` and
//! camelCase fields, matching the enqueue endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::ScanType;
use crate::domain::value_objects::{Asin, Marketplace};

/// Category traversal order for category scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TraversalStrategy {
    BreadthFirstStart,
    BreadthFirstEnd,
    DepthFirstStart,
    DepthFirstEnd,
}

/// Type-discriminated scan configuration submitted to `/scans/enqueue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScanConfig {
    #[serde(rename_all = "camelCase")]
    Asins {
        #[serde(rename = "domain")]
        marketplace: Marketplace,
        asins: Vec<Asin>,
        products_concurrent_requests: u32,
        max_rerequests: u32,
        min_rank: u32,
        max_rank: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    Category {
        #[serde(rename = "domain")]
        marketplace: Marketplace,
        main_category_id: String,
        strategy: TraversalStrategy,
        /// None disables page skipping entirely.
        #[serde(skip_serializing_if = "Option::is_none")]
        pages_skip: Option<u32>,
        scrape_all_sections: bool,
        products_to_gather: u32,
        category_concurrent_requests: u32,
        category_max_requests: u32,
        max_rerequests: u32,
        min_rank: u32,
        max_rank: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    Deals {
        #[serde(rename = "domain")]
        marketplace: Marketplace,
        /// None scans deals across all main categories.
        #[serde(skip_serializing_if = "Option::is_none")]
        main_category_id: Option<String>,
        products_to_gather: u32,
        products_concurrent_requests: u32,
        products_max_requests: u32,
        max_rerequests: u32,
        min_rank: u32,
        max_rank: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        expires_at: Option<DateTime<Utc>>,
    },
}

impl ScanConfig {
    #[must_use]
    pub const fn scan_type(&self) -> ScanType {
        match self {
            Self::Asins { .. } => ScanType::Asins,
            Self::Category { .. } => ScanType::Category,
            Self::Deals { .. } => ScanType::Deals,
        }
    }

    #[must_use]
    pub const fn marketplace(&self) -> Marketplace {
        match self {
            Self::Asins { marketplace, .. }
            | Self::Category { marketplace, .. }
            | Self::Deals { marketplace, .. } => *marketplace,
        }
    }
}
