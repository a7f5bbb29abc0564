#![allow(dead_code)] // each test binary uses its own subset of the fake

//! In-memory `ScanApi` implementation shared by the integration tests.
//!
//! Behavior is scripted per test: scans live in a paginated vector, detail
//! fetches pop scripted snapshots (optionally after a per-scan delay), and
//! every call is counted so tests can assert on request traffic.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use rankey_console::domain::entities::{
    MainCategory, Scan, ScanDetail, ScanPage, ScanResultSet, ScanState, ScrapingProviderInfo,
};
use rankey_console::domain::scan_config::ScanConfig;
use rankey_console::domain::value_objects::{Marketplace, ScanId};
use rankey_console::infrastructure::api_client::{ApiError, ScanApi, MISSING_API_KEY_CODE};

pub const PAGE_SIZE: usize = 10;

#[derive(Default)]
pub struct FakeState {
    pub scans: Vec<Scan>,
    pub details: HashMap<ScanId, VecDeque<ScanDetail>>,
    pub detail_delays: HashMap<ScanId, Duration>,
    pub results: HashMap<ScanId, ScanResultSet>,
    pub providers: Vec<ScrapingProviderInfo>,
    pub providers_without_key: Vec<String>,
    pub enqueued: Vec<ScanConfig>,
    pub list_fetches: u32,
    pub detail_fetches: HashMap<ScanId, u32>,
    pub fail_list_fetches: bool,
}

#[derive(Default, Clone)]
pub struct FakeScanApi {
    state: Arc<Mutex<FakeState>>,
}

impl FakeScanApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scans(scans: Vec<Scan>) -> Self {
        let fake = Self::new();
        fake.state.lock().unwrap().scans = scans;
        fake
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn push_detail(&self, id: &ScanId, detail: ScanDetail) {
        self.state()
            .details
            .entry(id.clone())
            .or_default()
            .push_back(detail);
    }

    pub fn set_detail_delay(&self, id: &ScanId, delay: Duration) {
        self.state().detail_delays.insert(id.clone(), delay);
    }

    pub fn list_fetches(&self) -> u32 {
        self.state().list_fetches
    }

    pub fn detail_fetches(&self, id: &ScanId) -> u32 {
        self.state().detail_fetches.get(id).copied().unwrap_or(0)
    }
}

pub fn scan(id: &str, state: ScanState) -> Scan {
    Scan {
        id: ScanId::from(id),
        scan_type: rankey_console::domain::entities::ScanType::Category,
        marketplace: Marketplace::Com,
        state,
        category: Some("Baby".into()),
        min_rank: Some(1),
        max_rank: Some(10000),
        created_at: None,
    }
}

pub fn detail(state: ScanState, records_gathered: u32) -> ScanDetail {
    ScanDetail {
        state,
        requests_sent: records_gathered,
        requests_succeeded: records_gathered,
        records_gathered,
        in_flight: Vec::new(),
        created_at: None,
        started_at: None,
        completed_at: None,
    }
}

fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status: 500,
        message: message.to_string(),
        code: None,
    }
}

#[async_trait]
impl ScanApi for FakeScanApi {
    async fn fetch_scans(&self, page: u32) -> Result<ScanPage, ApiError> {
        let mut state = self.state();
        state.list_fetches += 1;
        if state.fail_list_fetches {
            return Err(server_error("list unavailable"));
        }
        let total_pages = state.scans.len().div_ceil(PAGE_SIZE).max(1) as u32;
        let start = (page.saturating_sub(1) as usize) * PAGE_SIZE;
        let scans = state
            .scans
            .iter()
            .skip(start)
            .take(PAGE_SIZE)
            .cloned()
            .collect();
        Ok(ScanPage { scans, total_pages })
    }

    async fn enqueue_scan(&self, config: &ScanConfig) -> Result<Scan, ApiError> {
        let mut state = self.state();
        state.enqueued.push(config.clone());
        let scan = Scan {
            id: ScanId::new(Uuid::new_v4().to_string()),
            scan_type: config.scan_type(),
            marketplace: config.marketplace(),
            state: ScanState::Enqueued,
            category: None,
            min_rank: None,
            max_rank: None,
            created_at: None,
        };
        state.scans.insert(0, scan.clone());
        Ok(scan)
    }

    async fn delete_scan(&self, id: &ScanId) -> Result<(), ApiError> {
        self.state().scans.retain(|scan| &scan.id != id);
        Ok(())
    }

    async fn delete_all_scans(&self) -> Result<(), ApiError> {
        self.state().scans.clear();
        Ok(())
    }

    async fn halt_scans(&self) -> Result<(), ApiError> {
        for scan in &mut self.state().scans {
            if scan.state == ScanState::Active {
                scan.state = ScanState::Paused;
            }
        }
        Ok(())
    }

    async fn resume_scans(&self) -> Result<(), ApiError> {
        for scan in &mut self.state().scans {
            if scan.state == ScanState::Paused {
                scan.state = ScanState::Active;
            }
        }
        Ok(())
    }

    async fn fetch_detail(&self, id: &ScanId) -> Result<ScanDetail, ApiError> {
        let delay = self.state().detail_delays.get(id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let mut state = self.state();
        *state.detail_fetches.entry(id.clone()).or_insert(0) += 1;
        let queue = state
            .details
            .get_mut(id)
            .ok_or_else(|| server_error("unknown scan"))?;
        // Pop scripted snapshots; the last one repeats.
        let detail = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().ok_or_else(|| server_error("no detail"))?
        };
        Ok(detail)
    }

    async fn fetch_results(&self, id: &ScanId) -> Result<ScanResultSet, ApiError> {
        self.state()
            .results
            .get(id)
            .cloned()
            .ok_or_else(|| server_error("no results"))
    }

    async fn fetch_main_categories(
        &self,
        _marketplace: Marketplace,
    ) -> Result<Vec<MainCategory>, ApiError> {
        Ok(vec![MainCategory {
            id: "165797011".into(),
            name: "Baby".into(),
        }])
    }

    async fn fetch_providers(&self) -> Result<Vec<ScrapingProviderInfo>, ApiError> {
        Ok(self.state().providers.clone())
    }

    async fn select_provider(&self, name: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        if state.providers_without_key.iter().any(|p| p == name) {
            return Err(ApiError::Status {
                status: 409,
                message: format!("no API key configured for {name}"),
                code: Some(MISSING_API_KEY_CODE.to_string()),
            });
        }
        for provider in &mut state.providers {
            provider.selected = provider.name == name;
        }
        Ok(())
    }

    async fn set_provider_key(&self, name: &str, _key: &str) -> Result<(), ApiError> {
        let mut state = self.state();
        state.providers_without_key.retain(|p| p != name);
        for provider in &mut state.providers {
            if provider.name == name {
                provider.has_api_key = true;
            }
        }
        Ok(())
    }

    async fn renew_provider(&self, _name: &str) -> Result<(), ApiError> {
        Ok(())
    }
}
