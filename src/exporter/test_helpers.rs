//! Shared test helpers: scripted provider, connector and recording delivery.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::delivery::FileDelivery;
use crate::error::{Error, ProviderError, Result};
use crate::provider::{ProviderConnector, StorageProvider};
use crate::types::{Account, Event, FileEntry, ListFolderPage};

use super::PaperExporter;

/// Callback run after the n-th export call (1-based) returns
pub(crate) type ExportHook = Arc<dyn Fn(usize) + Send + Sync>;

/// How a scripted document export behaves
#[derive(Clone, Debug)]
pub(crate) enum Scripted {
    Markdown(String),
    NotFound,
    ServerError,
}

/// In-memory [`StorageProvider`] driven by a script
#[derive(Default)]
pub(crate) struct MockProvider {
    /// Listing pages in order; page k is returned for cursor "cursor-k"
    pub(crate) pages: Vec<Vec<FileEntry>>,
    /// Fail the identity check with an invalid-token error
    pub(crate) reject_token: bool,
    /// Fail the identity check with a server-side error
    pub(crate) account_unavailable: bool,
    /// Fail the listing call for this page index
    pub(crate) fail_page: Option<usize>,
    /// Per-path behavior (keyed by the lowercased path); default is "# <path>"
    pub(crate) documents: HashMap<String, Scripted>,
    pub(crate) account_calls: AtomicUsize,
    pub(crate) list_calls: AtomicUsize,
    pub(crate) export_calls: Mutex<Vec<String>>,
    pub(crate) export_hook: Mutex<Option<ExportHook>>,
}

impl MockProvider {
    /// Provider listing `paths` on a single page
    pub(crate) fn with_files(paths: &[&str]) -> Self {
        Self::with_pages(vec![paths.to_vec()])
    }

    /// Provider listing each inner slice as its own page
    pub(crate) fn with_pages(pages: Vec<Vec<&str>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| page.into_iter().map(FileEntry::file).collect())
                .collect(),
            ..Self::default()
        }
    }

    pub(crate) fn script(mut self, path: &str, behavior: Scripted) -> Self {
        self.documents.insert(path.to_lowercase(), behavior);
        self
    }

    pub(crate) fn set_export_hook(&self, hook: impl Fn(usize) + Send + Sync + 'static) {
        *self.export_hook.lock().unwrap() = Some(Arc::new(hook));
    }

    pub(crate) fn exported_paths(&self) -> Vec<String> {
        self.export_calls.lock().unwrap().clone()
    }

    fn page(&self, index: usize) -> Result<ListFolderPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_page == Some(index) {
            return Err(Error::Provider(ProviderError {
                status: 409,
                summary: Some("path/not_found/".to_string()),
                tags: vec!["path".into(), "not_found".into()],
            }));
        }
        Ok(ListFolderPage {
            entries: self.pages.get(index).cloned().unwrap_or_default(),
            cursor: format!("cursor-{}", index + 1),
            has_more: index + 1 < self.pages.len(),
        })
    }
}

#[async_trait::async_trait]
impl StorageProvider for MockProvider {
    async fn current_account(&self) -> Result<Account> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        if self.reject_token {
            return Err(Error::Provider(ProviderError::from_body(
                401,
                r#"{"error_summary": "invalid_access_token/..", "error": {".tag": "invalid_access_token"}}"#,
            )));
        }
        if self.account_unavailable {
            return Err(Error::Provider(ProviderError::from_body(
                503,
                "service unavailable",
            )));
        }
        Ok(Account {
            account_id: "dbid:test".to_string(),
            name: None,
            email: Some("test@example.com".to_string()),
        })
    }

    async fn list_folder(&self, _path: &str, _recursive: bool) -> Result<ListFolderPage> {
        self.page(0)
    }

    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderPage> {
        let index = cursor
            .strip_prefix("cursor-")
            .and_then(|n| n.parse().ok())
            .unwrap_or(usize::MAX);
        self.page(index)
    }

    async fn export_markdown(&self, path: &str) -> Result<String> {
        let call_number = {
            let mut calls = self.export_calls.lock().unwrap();
            calls.push(path.to_string());
            calls.len()
        };

        let result = match self.documents.get(path) {
            Some(Scripted::Markdown(text)) => Ok(text.clone()),
            Some(Scripted::NotFound) => Err(Error::Provider(ProviderError::from_body(
                409,
                r#"{"error_summary": "path/not_found/..", "error": {".tag": "path", "path": {".tag": "not_found"}}}"#,
            ))),
            Some(Scripted::ServerError) => {
                Err(Error::Provider(ProviderError::from_body(500, "boom")))
            }
            None => Ok(format!("# {}", path)),
        };

        let hook = self.export_hook.lock().unwrap().clone();
        if let Some(hook) = hook {
            hook(call_number);
        }
        result
    }
}

/// Connector that hands out one shared [`MockProvider`]
pub(crate) struct MockConnector {
    pub(crate) provider: Arc<MockProvider>,
    pub(crate) tokens: Mutex<Vec<String>>,
}

impl MockConnector {
    pub(crate) fn new(provider: Arc<MockProvider>) -> Self {
        Self {
            provider,
            tokens: Mutex::new(Vec::new()),
        }
    }
}

impl ProviderConnector for MockConnector {
    fn connect(&self, token: &str) -> Result<Arc<dyn StorageProvider>> {
        self.tokens.lock().unwrap().push(token.to_string());
        Ok(self.provider.clone())
    }
}

/// [`FileDelivery`] that keeps payloads in memory
#[derive(Default)]
pub(crate) struct RecordingDelivery {
    pub(crate) files: Mutex<Vec<(String, Vec<u8>)>>,
    pub(crate) fail: bool,
}

impl RecordingDelivery {
    pub(crate) fn names(&self) -> Vec<String> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub(crate) fn content(&self, name: &str) -> Option<Vec<u8>> {
        self.files
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, bytes)| bytes.clone())
    }
}

#[async_trait::async_trait]
impl FileDelivery for RecordingDelivery {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        if self.fail {
            return Err(Error::Io(std::io::Error::other("disk full")));
        }
        self.files
            .lock()
            .unwrap()
            .push((filename.to_string(), bytes.to_vec()));
        Ok(PathBuf::from("/virtual").join(filename))
    }
}

/// Config with no courtesy delay so tests run instantly
pub(crate) fn test_config() -> Config {
    let mut config = Config::default();
    config.export.item_delay = Duration::ZERO;
    config
}

/// Exporter wired to `provider` and an in-memory delivery target
pub(crate) fn create_test_exporter(
    provider: Arc<MockProvider>,
) -> (PaperExporter, Arc<MockConnector>, Arc<RecordingDelivery>) {
    let connector = Arc::new(MockConnector::new(provider));
    let delivery = Arc::new(RecordingDelivery::default());
    let exporter =
        PaperExporter::with_components(test_config(), connector.clone(), delivery.clone());
    (exporter, connector, delivery)
}

/// Drain every event currently buffered on a receiver
pub(crate) fn drain_events(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
