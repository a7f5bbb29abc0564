//! Infrastructure layer for the scan service API, the push channel, file
//! import/export, configuration, and logging.
//!
//! Everything that performs I/O lives here; the application layer reaches
//! the network only through the [`api_client::ScanApi`] trait and the
//! request lifecycle in [`request`].

pub mod api_client;
pub mod config;
pub mod event_stream;
pub mod export;
pub mod import;
pub mod logging;
pub mod request;

// Re-export commonly used items
pub use api_client::{ApiError, HttpScanApi, ScanApi};
pub use config::{AppConfig, ConfigManager};
pub use event_stream::spawn_event_stream;
pub use export::{build_report, ReportArtifact};
pub use import::{extract_asins, ImportError, ImportOutcome};
pub use logging::{init_logging, init_logging_with_config};
pub use request::{RequestError, RequestSlot};
