//! # paper-export
//!
//! Export every Dropbox Paper document in an account to Markdown.
//!
//! ## Design Philosophy
//!
//! paper-export is designed to be:
//! - **Library-first** - No UI of its own; a host drives it and renders its events
//! - **Event-driven** - Status lines, progress and state changes are broadcast
//! - **Best-effort** - One failing document never aborts the batch
//! - **Stoppable** - A stop request takes effect before the next document
//!
//! Documents are delivered either one file per document (folder structure
//! flattened into the filename) or as a single zip archive that keeps the
//! folder structure.
//!
//! ## Quick Start
//!
//! ```no_run
//! use paper_export::{Config, ExportRequest, PaperExporter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let exporter = PaperExporter::new(Config::default())?;
//!
//!     // Subscribe to events
//!     let mut events = exporter.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let outcome = exporter.start(ExportRequest::new("sl.token", true)).await?;
//!     println!("{:?}", outcome);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// In-memory Markdown archive
pub mod archive;
/// Configuration types
pub mod config;
/// Saving exported files
pub mod delivery;
/// Error types
pub mod error;
/// Export session (decomposed into focused submodules)
pub mod exporter;
/// Provider path to local name normalization
pub mod paths;
/// Storage provider boundary and the Dropbox binding
pub mod provider;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use archive::MarkdownArchive;
pub use config::{ApiConfig, Config, ExportConfig};
pub use delivery::{DirectoryDelivery, FileDelivery};
pub use error::{AuthError, Error, ExportError, ProviderError, Result};
pub use exporter::PaperExporter;
pub use provider::{DropboxClient, DropboxConnector, ProviderConnector, StorageProvider};
pub use types::{
    ActionRole, Event, ExportRequest, ExportSummary, FileEntry, MessageLevel, RelativePath,
    RunOutcome, RunState,
};

/// Stop the exporter's current run when the process receives a termination signal.
///
/// Intended to be spawned next to [`PaperExporter::start`]; the document in
/// flight finishes and the run ends as `Stopped`.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// # Example
///
/// ```no_run
/// use paper_export::{Config, ExportRequest, PaperExporter, stop_on_signal};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let exporter = PaperExporter::new(Config::default())?;
///     tokio::spawn(stop_on_signal(exporter.clone()));
///     exporter.start(ExportRequest::new("sl.token", false)).await?;
///     Ok(())
/// }
/// ```
pub async fn stop_on_signal(exporter: PaperExporter) {
    wait_for_signal().await;
    if !exporter.stop() {
        tracing::debug!("signal received with no export running");
    }
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for Ctrl+C");
            tokio::signal::ctrl_c().await.ok();
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
