//! Domain entities shared between the synchronizers and the API client.
//!
//! These are the wire shapes of the scan service (camelCase JSON bodies,
//! cookie-credentialed endpoints). Scans are server-owned: the client never
//! assigns state except the optimistic `Enqueued` at creation, and list and
//! detail snapshots are replaced wholesale rather than merged field by field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Marketplace, ScanId};

/// Lifecycle state of a scan, driven entirely by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanState {
    Enqueued,
    Active,
    Stalled,
    Paused,
    Completed,
}

impl ScanState {
    /// True while the server is actively working the scan.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    /// True once the scan can no longer change on its own.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

/// Discriminant of the three scan configuration shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    Asins,
    Category,
    Deals,
}

/// A server-tracked collection job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scan {
    pub id: ScanId,
    #[serde(rename = "type")]
    pub scan_type: ScanType,
    #[serde(rename = "domain")]
    pub marketplace: Marketplace,
    pub state: ScanState,
    /// Display name of the configured category, when the type has one.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub min_rank: Option<u32>,
    #[serde(default)]
    pub max_rank: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// One page of the authoritative scan list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanPage {
    #[serde(default)]
    pub scans: Vec<Scan>,
    #[serde(default)]
    pub total_pages: u32,
}

/// Transient, scan-scoped progress snapshot.
///
/// Owned exclusively by the detail tracker and replaced wholesale on every
/// refresh; there is no field-level merge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanDetail {
    pub state: ScanState,
    #[serde(default)]
    pub requests_sent: u32,
    #[serde(default)]
    pub requests_succeeded: u32,
    #[serde(default)]
    pub records_gathered: u32,
    /// Pages or identifiers currently being fetched by the scraper.
    #[serde(default)]
    pub in_flight: Vec<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Domain-scoped taxonomy entry, read-only from the console's perspective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainCategory {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
}

/// One collected record of a finished (or running) scan result set.
///
/// Every field is optional on the wire; the exporter is responsible for
/// rendering missing fields as empty cells so column order stays stable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    #[serde(default)]
    pub asin: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub reviews: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
}

/// Fetched result set of one scan: records plus an optional nested summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResultSet {
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub summary: Option<serde_json::Value>,
}

/// Scraping provider as reported by the service settings endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapingProviderInfo {
    pub name: String,
    #[serde(default)]
    pub has_api_key: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub concurrency_used: u32,
    #[serde(default)]
    pub concurrency_limit: u32,
    #[serde(default)]
    pub requests_remaining: Option<u64>,
}

/// Current scan selection as an explicit tagged union.
///
/// "No selection" is a first-class state rather than a nullable id compare.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    None,
    Selected(ScanId),
}

impl Selection {
    #[must_use]
    pub fn id(&self) -> Option<&ScanId> {
        match self {
            Self::None => None,
            Self::Selected(id) => Some(id),
        }
    }

    #[must_use]
    pub fn is_selected(&self, id: &ScanId) -> bool {
        matches!(self, Self::Selected(selected) if selected == id)
    }

    pub fn clear(&mut self) {
        *self = Self::None;
    }
}
