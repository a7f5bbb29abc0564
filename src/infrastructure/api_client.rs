//! HTTP client for the scan-management API.
//!
//! Every call carries the session cookie jar and a JSON content type, and
//! decodes either the typed payload or the service's structured error body
//! `{ "message": ..., "code": ... }`. The [`ScanApi`] trait is the seam the
//! application layer is written against; tests substitute an in-memory
//! implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use url::Url;

use crate::domain::entities::{
    MainCategory, Scan, ScanDetail, ScanPage, ScanResultSet, ScrapingProviderInfo,
};
use crate::domain::scan_config::ScanConfig;
use crate::domain::value_objects::{Marketplace, ScanId};
use crate::infrastructure::config::ApiConfig;

/// Error code the service uses when a provider has no API key configured.
pub const MISSING_API_KEY_CODE: &str = "missing_api_key";

/// Failures of a single API call.
///
/// Cancellation is deliberately not represented here; it is a lifecycle
/// outcome owned by the request slot, not an API failure.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("{message} (status {status})")]
    Status {
        status: u16,
        message: String,
        code: Option<String>,
    },
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    /// True for the structured "missing API key" response, which callers
    /// handle as a prompt-for-credential flow rather than a failure.
    #[must_use]
    pub fn is_missing_api_key(&self) -> bool {
        matches!(self, Self::Status { code: Some(code), .. } if code == MISSING_API_KEY_CODE)
    }
}

/// Structured error body returned on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
}

/// The scan-management API surface used by the console.
#[async_trait]
pub trait ScanApi: Send + Sync {
    async fn fetch_scans(&self, page: u32) -> Result<ScanPage, ApiError>;
    async fn enqueue_scan(&self, config: &ScanConfig) -> Result<Scan, ApiError>;
    async fn delete_scan(&self, id: &ScanId) -> Result<(), ApiError>;
    async fn delete_all_scans(&self) -> Result<(), ApiError>;
    async fn halt_scans(&self) -> Result<(), ApiError>;
    async fn resume_scans(&self) -> Result<(), ApiError>;
    async fn fetch_detail(&self, id: &ScanId) -> Result<ScanDetail, ApiError>;
    async fn fetch_results(&self, id: &ScanId) -> Result<ScanResultSet, ApiError>;
    async fn fetch_main_categories(
        &self,
        marketplace: Marketplace,
    ) -> Result<Vec<MainCategory>, ApiError>;
    async fn fetch_providers(&self) -> Result<Vec<ScrapingProviderInfo>, ApiError>;
    async fn select_provider(&self, name: &str) -> Result<(), ApiError>;
    async fn set_provider_key(&self, name: &str, key: &str) -> Result<(), ApiError>;
    async fn renew_provider(&self, name: &str) -> Result<(), ApiError>;
}

/// Response envelopes of the scan service.
#[derive(Debug, Deserialize)]
struct DetailEnvelope {
    details: ScanDetail,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MainCategoriesEnvelope {
    main_categories: Vec<MainCategory>,
}

#[derive(Debug, Deserialize)]
struct ScanEnvelope {
    scan: Scan,
}

#[derive(Debug, Deserialize)]
struct ProvidersEnvelope {
    providers: Vec<ScrapingProviderInfo>,
}

/// Cookie-credentialed reqwest implementation of [`ScanApi`].
#[derive(Debug, Clone)]
pub struct HttpScanApi {
    http: Client,
    base_url: Url,
}

impl HttpScanApi {
    /// Builds the client with the cookie store, default JSON headers, and
    /// the configured timeout.
    ///
    /// # Errors
    /// Fails when the base URL is unparsable or the client cannot be built.
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .default_headers(headers)
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Shared client, for the event stream subscriber (same cookie jar).
    #[must_use]
    pub fn client(&self) -> &Client {
        &self.http
    }

    /// Endpoint of the server-sent event stream.
    #[must_use]
    pub fn events_url(&self) -> Url {
        self.endpoint("events")
    }

    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().expect("base URL cannot be opaque");
            segments.pop_if_empty();
            for segment in path.split('/') {
                segments.push(segment);
            }
        }
        url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, self.endpoint(path))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        Err(Self::status_error(status, response).await)
    }

    async fn status_error(status: StatusCode, response: Response) -> ApiError {
        // Prefer the structured body; fall back to a generic failure.
        let body = response.bytes().await.ok();
        let parsed = body
            .as_deref()
            .and_then(|bytes| serde_json::from_slice::<ErrorBody>(bytes).ok());
        let (message, code) = match parsed {
            Some(body) => (
                body.message.unwrap_or_else(|| "Request failed".to_string()),
                body.code,
            ),
            None => ("Request failed".to_string(), None),
        };
        ApiError::Status {
            status: status.as_u16(),
            message,
            code,
        }
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = self.send(request).await?;
        Self::decode(response).await
    }

    async fn execute_ack(&self, request: RequestBuilder) -> Result<(), ApiError> {
        self.send(request).await.map(|_| ())
    }
}

#[async_trait]
impl ScanApi for HttpScanApi {
    async fn fetch_scans(&self, page: u32) -> Result<ScanPage, ApiError> {
        let request = self
            .request(Method::GET, "scans")
            .query(&[("page", page.to_string())]);
        self.execute_json(request).await
    }

    async fn enqueue_scan(&self, config: &ScanConfig) -> Result<Scan, ApiError> {
        let request = self
            .request(Method::POST, "scans/enqueue")
            .json(&serde_json::json!({ "config": config }));
        let envelope: ScanEnvelope = self.execute_json(request).await?;
        Ok(envelope.scan)
    }

    async fn delete_scan(&self, id: &ScanId) -> Result<(), ApiError> {
        let request = self
            .request(Method::DELETE, "scans")
            .query(&[("scanId", id.as_str())]);
        self.execute_ack(request).await
    }

    async fn delete_all_scans(&self) -> Result<(), ApiError> {
        self.execute_ack(self.request(Method::DELETE, "scans/all"))
            .await
    }

    async fn halt_scans(&self) -> Result<(), ApiError> {
        self.execute_ack(self.request(Method::POST, "scans/halt"))
            .await
    }

    async fn resume_scans(&self) -> Result<(), ApiError> {
        self.execute_ack(self.request(Method::POST, "scans/resume"))
            .await
    }

    async fn fetch_detail(&self, id: &ScanId) -> Result<ScanDetail, ApiError> {
        let path = format!("scans/{}/details", id.as_str());
        let envelope: DetailEnvelope = self.execute_json(self.request(Method::GET, &path)).await?;
        Ok(envelope.details)
    }

    async fn fetch_results(&self, id: &ScanId) -> Result<ScanResultSet, ApiError> {
        let path = format!("scans/{}/products", id.as_str());
        self.execute_json(self.request(Method::GET, &path)).await
    }

    async fn fetch_main_categories(
        &self,
        marketplace: Marketplace,
    ) -> Result<Vec<MainCategory>, ApiError> {
        let request = self
            .request(Method::GET, "main-categories")
            .query(&[("domain", marketplace.locale())]);
        let envelope: MainCategoriesEnvelope = self.execute_json(request).await?;
        Ok(envelope.main_categories)
    }

    async fn fetch_providers(&self) -> Result<Vec<ScrapingProviderInfo>, ApiError> {
        let envelope: ProvidersEnvelope = self
            .execute_json(self.request(Method::GET, "scraping-providers"))
            .await?;
        Ok(envelope.providers)
    }

    async fn select_provider(&self, name: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "scraping-providers/select")
            .json(&serde_json::json!({ "name": name }));
        self.execute_ack(request).await
    }

    async fn set_provider_key(&self, name: &str, key: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "scraping-providers/key")
            .json(&serde_json::json!({ "name": name, "key": key }));
        self.execute_ack(request).await
    }

    async fn renew_provider(&self, name: &str) -> Result<(), ApiError> {
        let request = self
            .request(Method::POST, "scraping-providers/renew")
            .json(&serde_json::json!({ "name": name }));
        self.execute_ack(request).await
    }
}
