//! Configuration types for paper-export

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{path::Path, path::PathBuf, time::Duration};

/// Default archive filename for archive-mode runs
pub const DEFAULT_ARCHIVE_NAME: &str = "dropbox-paper-exports.zip";

/// Storage provider endpoints and HTTP client settings
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL for RPC endpoints (default: "https://api.dropboxapi.com")
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL for content-download endpoints (default: "https://content.dropboxapi.com")
    #[serde(default = "default_content_base_url")]
    pub content_base_url: String,

    /// Per-request timeout (default: 60 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            content_base_url: default_content_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Export behavior (what to list, pacing, where results go)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Folder to list recursively (default: "" = the whole account)
    #[serde(default)]
    pub root_path: String,

    /// Filename suffix of documents to export, matched case-insensitively (default: ".paper")
    #[serde(default = "default_target_extension")]
    pub target_extension: String,

    /// Courtesy pause between documents (default: 100 ms)
    ///
    /// Lets subscribers catch up with progress events and spaces out export calls.
    /// Not needed for correctness.
    #[serde(default = "default_item_delay", with = "millis_serde")]
    pub item_delay: Duration,

    /// Archive filename used in archive mode (default: "dropbox-paper-exports.zip")
    #[serde(default = "default_archive_name")]
    pub archive_name: String,

    /// Directory that receives downloaded files (default: "./exports")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            root_path: String::new(),
            target_extension: default_target_extension(),
            item_delay: default_item_delay(),
            archive_name: default_archive_name(),
            output_dir: default_output_dir(),
        }
    }
}

/// Main configuration for [`PaperExporter`](crate::PaperExporter)
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider endpoints and HTTP settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Export behavior
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Load configuration from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every setting is usable before a run starts
    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("api.api_base_url", &self.api.api_base_url),
            ("api.content_base_url", &self.api.content_base_url),
        ] {
            url::Url::parse(value).map_err(|e| Error::Config {
                message: format!("invalid URL '{}': {}", value, e),
                key: Some(key.to_string()),
            })?;
        }

        if self.export.target_extension.trim().is_empty() {
            return Err(Error::Config {
                message: "target extension must not be empty".to_string(),
                key: Some("export.target_extension".to_string()),
            });
        }

        let archive_name = self.export.archive_name.trim();
        if archive_name.is_empty() {
            return Err(Error::Config {
                message: "archive name must not be empty".to_string(),
                key: Some("export.archive_name".to_string()),
            });
        }
        if archive_name.contains(['/', '\\']) || archive_name == "." || archive_name == ".." {
            return Err(Error::Config {
                message: format!(
                    "archive name '{}' must be a plain filename inside the output directory",
                    self.export.archive_name
                ),
                key: Some("export.archive_name".to_string()),
            });
        }

        Ok(())
    }
}

fn default_api_base_url() -> String {
    "https://api.dropboxapi.com".to_string()
}

fn default_content_base_url() -> String {
    "https://content.dropboxapi.com".to_string()
}

fn default_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_user_agent() -> String {
    concat!("paper-export/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_target_extension() -> String {
    ".paper".to_string()
}

fn default_item_delay() -> Duration {
    Duration::from_millis(100)
}

fn default_archive_name() -> String {
    DEFAULT_ARCHIVE_NAME.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./exports")
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Millisecond Duration serialization helper
mod millis_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
