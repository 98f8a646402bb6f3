//! Dropbox HTTP API v2 binding.

use std::sync::Arc;

use reqwest::Response;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use crate::config::ApiConfig;
use crate::error::{Error, ProviderError, Result};
use crate::types::{Account, ListFolderPage};

use super::{EXPORT_FORMAT, ProviderConnector, StorageProvider};

const ROUTE_CURRENT_ACCOUNT: &str = "2/users/get_current_account";
const ROUTE_LIST_FOLDER: &str = "2/files/list_folder";
const ROUTE_LIST_FOLDER_CONTINUE: &str = "2/files/list_folder/continue";
const ROUTE_EXPORT: &str = "2/files/export";

/// Header carrying the JSON argument of content-endpoint calls
pub(crate) const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Serialize a value to JSON that is safe to place in an HTTP header.
///
/// Dropbox requires non-ASCII characters in `Dropbox-API-Arg` to be escaped as
/// `\uXXXX` (UTF-16 code units, so astral characters become surrogate pairs).
pub fn header_safe_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let raw = serde_json::to_string(value)?;
    let mut out = String::with_capacity(raw.len());
    let mut units = [0u16; 2];
    for c in raw.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    Ok(out)
}

/// Argument of the export call
#[derive(Serialize)]
struct ExportArg<'a> {
    path: &'a str,
    export_format: &'a str,
}

/// Dropbox client authenticated with a bearer token
pub struct DropboxClient {
    http: reqwest::Client,
    api_base: Url,
    content_base: Url,
    token: String,
}

impl DropboxClient {
    /// Create a client for `token` using the endpoints and timeouts in `config`
    pub fn new(config: &ApiConfig, token: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            api_base: base_url(&config.api_base_url, "api.api_base_url")?,
            content_base: base_url(&config.content_base_url, "api.content_base_url")?,
            token: token.to_string(),
        })
    }

    fn endpoint(base: &Url, route: &str) -> Result<Url> {
        base.join(route).map_err(|e| Error::Config {
            message: format!("cannot build endpoint '{}': {}", route, e),
            key: None,
        })
    }

    /// Call a JSON-in/JSON-out RPC endpoint
    async fn rpc<T: DeserializeOwned>(&self, route: &str, body: Option<Value>) -> Result<T> {
        let url = Self::endpoint(&self.api_base, route)?;
        tracing::debug!(route, "dropbox rpc");

        let mut request = self.http.post(url).bearer_auth(&self.token);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = check_status(request.send().await?).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Parse a base URL and make sure it ends with a slash so routes join below it
fn base_url(raw: &str, key: &str) -> Result<Url> {
    let mut url = Url::parse(raw).map_err(|e| Error::Config {
        message: format!("invalid URL '{}': {}", raw, e),
        key: Some(key.to_string()),
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Turn non-2xx responses into [`ProviderError`]
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let err = ProviderError::from_body(status.as_u16(), &body);
    tracing::debug!(status = status.as_u16(), summary = ?err.summary, "dropbox call failed");
    Err(err.into())
}

#[async_trait::async_trait]
impl StorageProvider for DropboxClient {
    async fn current_account(&self) -> Result<Account> {
        self.rpc(ROUTE_CURRENT_ACCOUNT, None).await
    }

    async fn list_folder(&self, path: &str, recursive: bool) -> Result<ListFolderPage> {
        self.rpc(
            ROUTE_LIST_FOLDER,
            Some(json!({ "path": path, "recursive": recursive })),
        )
        .await
    }

    async fn list_folder_continue(&self, cursor: &str) -> Result<ListFolderPage> {
        self.rpc(ROUTE_LIST_FOLDER_CONTINUE, Some(json!({ "cursor": cursor })))
            .await
    }

    async fn export_markdown(&self, path: &str) -> Result<String> {
        let url = Self::endpoint(&self.content_base, ROUTE_EXPORT)?;
        let arg = header_safe_json(&ExportArg {
            path,
            export_format: EXPORT_FORMAT,
        })?;
        tracing::debug!(path, "dropbox export");

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .header(API_ARG_HEADER, arg)
            .send()
            .await?;

        let response = check_status(response).await?;
        Ok(response.text().await?)
    }
}

/// [`ProviderConnector`] producing [`DropboxClient`]s
#[derive(Clone, Debug, Default)]
pub struct DropboxConnector {
    config: ApiConfig,
}

impl DropboxConnector {
    /// Connector using the given endpoints and timeouts
    pub fn new(config: ApiConfig) -> Self {
        Self { config }
    }
}

impl ProviderConnector for DropboxConnector {
    fn connect(&self, token: &str) -> Result<Arc<dyn StorageProvider>> {
        Ok(Arc::new(DropboxClient::new(&self.config, token)?))
    }
}
