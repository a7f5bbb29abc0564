//! Logging system configuration and initialization
//!
//! Console output with an env-filter, plus optional rolling file output
//! stored relative to the executable. `RUST_LOG` overrides the configured
//! level, e.g. `RUST_LOG="debug,reqwest=warn" rankey-console`.

use std::path::PathBuf;

use anyhow::Result;
use lazy_static::lazy_static;
use std::sync::Mutex;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry,
};

pub use crate::infrastructure::config::LoggingConfig;

// Keeps the non-blocking writer guards alive for the process lifetime.
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

/// Get the log directory relative to the executable location
#[must_use]
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(std::path::Path::to_path_buf))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    exe_dir.join("logs")
}

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Initialize logging with custom configuration.
///
/// Noisy dependency targets (hyper, reqwest connection management) are kept
/// at `warn` unless `RUST_LOG` says otherwise.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},hyper=warn,hyper_util=warn,reqwest=warn",
            level = config.level
        ))
    });

    let console_layer = config
        .console_output
        .then(|| fmt::layer().with_target(true).boxed());

    let file_layer = if config.file_output {
        let appender = rolling::daily(get_log_directory(), "rankey-console.log");
        let (writer, guard) = non_blocking(appender);
        if let Ok(mut guards) = LOG_GUARDS.lock() {
            guards.push(guard);
        }
        Some(fmt::layer().with_ansi(false).with_writer(writer).boxed())
    } else {
        None
    };

    // try_init: tests and repeated initialization must not panic.
    let _ = Registry::default()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_reentrant() {
        assert!(init_logging().is_ok());
        assert!(init_logging_with_config(&LoggingConfig {
            level: "debug".into(),
            console_output: false,
            file_output: false,
        })
        .is_ok());
    }

    #[test]
    fn log_directory_is_next_to_the_executable() {
        let dir = get_log_directory();
        assert!(dir.ends_with("logs"));
    }
}
