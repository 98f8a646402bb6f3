//! Storage provider boundary.
//!
//! The exporter only talks to the provider through [`StorageProvider`], so the
//! batch logic can be driven by an in-memory implementation in tests.
//! [`DropboxClient`] is the production binding over the Dropbox HTTP API.

mod dropbox;


pub use dropbox::{DropboxClient, DropboxConnector, header_safe_json};

use crate::error::Result;
use crate::types::{Account, ListFolderPage};
use std::sync::Arc;

/// Export format requested from the provider
pub const EXPORT_FORMAT: &str = "markdown";

/// Authenticated handle to the user's storage account
#[async_trait::async_trait]
pub trait StorageProvider: Send + Sync {
    /// Cheap call that fails when the token is not accepted
    async fn current_account(&self) -> Result<Account>;

    /// First page of a folder listing
    async fn list_folder(&self, path: &str, recursive: bool) -> Result<ListFolderPage>;

    /// Next page of a listing started with [`list_folder`](Self::list_folder)
    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderPage>;

    /// Convert one document to Markdown text
    async fn export_markdown(&self, path: &str) -> Result<String>;
}

/// Builds an authenticated [`StorageProvider`] from an access token
pub trait ProviderConnector: Send + Sync {
    /// Create a client handle for `token` (no network traffic)
    fn connect(&self, token: &str) -> Result<Arc<dyn StorageProvider>>;
}
