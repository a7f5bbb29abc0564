//! Configuration infrastructure
//!
//! Configuration is organized into tiers: the API endpoint the console
//! talks to, the synchronization cadences, data-entry view settings, and
//! logging. Defaults work against a local service; a JSON config file and
//! a couple of environment variables override them.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub sync: SyncConfig,
    pub entry: EntryConfig,
    pub logging: LoggingConfig,
}

/// Scan service endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the scan-management API.
    pub base_url: String,
    /// Timeout for a single request in seconds.
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:7000".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

/// Cadences of the synchronization loops and transient UI state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Detail snapshot poll interval while the selected scan is active.
    pub detail_poll_interval_secs: u64,
    /// List poll fallback interval (covers a dead push channel).
    pub list_poll_interval_secs: u64,
    /// How long an error banner stays up before auto-clearing.
    pub banner_clear_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            detail_poll_interval_secs: 3,
            list_poll_interval_secs: 30,
            banner_clear_secs: 5,
        }
    }
}

/// Data-entry view settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EntryConfig {
    /// ASINs shown per page in the configuration form.
    pub asin_page_size: usize,
}

impl Default for EntryConfig {
    fn default() -> Self {
        Self { asin_page_size: 10 }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,
    /// Enable console output
    pub console_output: bool,
    /// Enable rolling file output next to the executable
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            console_output: true,
            file_output: false,
        }
    }
}

/// Loads and persists [`AppConfig`] as JSON in the platform config dir.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Uses `<config-dir>/rankey-console/config.json`.
    pub fn new() -> Result<Self> {
        let base = dirs::config_dir().context("could not determine config directory")?;
        Ok(Self {
            config_path: base.join("rankey-console").join("config.json"),
        })
    }

    /// Uses an explicit path (tests, portable installs).
    #[must_use]
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    #[must_use]
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Loads the configuration, writing defaults on first run, then applies
    /// environment overrides (`RANKEY_API_BASE_URL`, `RANKEY_LOG_LEVEL`).
    pub async fn load(&self) -> Result<AppConfig> {
        let mut config = if self.config_path.exists() {
            let raw = fs::read_to_string(&self.config_path)
                .await
                .with_context(|| format!("failed to read {}", self.config_path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid config file {}", self.config_path.display()))?
        } else {
            let config = AppConfig::default();
            self.save(&config).await?;
            info!("wrote default config to {}", self.config_path.display());
            config
        };

        if let Ok(base_url) = std::env::var("RANKEY_API_BASE_URL") {
            config.api.base_url = base_url;
        }
        if let Ok(level) = std::env::var("RANKEY_LOG_LEVEL") {
            config.logging.level = level;
        }
        Ok(config)
    }

    /// Persists the configuration, creating parent directories as needed.
    pub async fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, raw)
            .await
            .with_context(|| format!("failed to write {}", self.config_path.display()))?;
        Ok(())
    }
}
