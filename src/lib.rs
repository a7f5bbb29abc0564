//! Rankey console - client core for a remote scan service.
//!
//! Configure, launch, monitor, and export results of long-running
//! data-collection scans. The crate owns the scan-state synchronization and
//! request-lifecycle core; rendering is left to whichever front end embeds
//! it.

// Module declarations
pub mod application;
pub mod console;
pub mod domain;
pub mod infrastructure;

// Re-export the assembled console for easier access
pub use console::ScanConsole;
