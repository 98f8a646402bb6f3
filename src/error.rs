//! Error types for paper-export
//!
//! Errors fall into two groups:
//! - Run-level failures (authentication, enumeration, archive packaging) that abort
//!   a run before or after the batch and return the session to a restartable state
//! - Per-document failures ([`ExportError`]) that are reported and skipped

use serde_json::Value;
use thiserror::Error;

/// Result type alias for paper-export operations
pub type Result<T> = std::result::Result<T, Error>;

/// Fallback message used when a listing failure carries no provider summary
pub const GENERIC_ENUMERATION_ERROR: &str = "failed to list files";

/// Main error type for paper-export
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "api.api_base_url")
        key: Option<String>,
    },

    /// Access token missing or rejected
    #[error("authentication error: {0}")]
    Authentication(#[from] AuthError),

    /// Listing the account's files failed
    #[error("enumeration error: {message}")]
    Enumeration {
        /// Provider summary, or [`GENERIC_ENUMERATION_ERROR`] when none was reported
        message: String,
    },

    /// A single document could not be exported
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// Storage provider rejected a request
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),

    /// Archive packaging failed
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// An export run is already in progress on this session
    #[error("an export is already running")]
    AlreadyRunning,
}

impl Error {
    /// Build an enumeration error from a provider failure, keeping its summary when present.
    pub fn enumeration(source: &Error) -> Self {
        let message = match source {
            Error::Provider(e) => e
                .summary
                .clone()
                .unwrap_or_else(|| GENERIC_ENUMERATION_ERROR.to_string()),
            _ => GENERIC_ENUMERATION_ERROR.to_string(),
        };
        Error::Enumeration { message }
    }

    /// True if this error means the requested document does not exist
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Provider(e) => e.is_not_found(),
            Error::Export(ExportError::NotFound { .. }) => true,
            _ => false,
        }
    }
}

/// Authentication failures (fatal to the run)
#[derive(Debug, Error)]
pub enum AuthError {
    /// No token (or only whitespace) was supplied
    #[error("an access token is required")]
    MissingToken,

    /// The identity check was rejected by the provider
    #[error("access token rejected: {reason}")]
    Rejected {
        /// Provider summary or transport error text
        reason: String,
    },
}

/// Per-document export failures (non-fatal, the batch continues)
#[derive(Debug, Error)]
pub enum ExportError {
    /// Provider reported that the document does not exist
    #[error("document not found: {path}")]
    NotFound {
        /// Display path of the document
        path: String,
    },

    /// Any other failure (network, provider, delivery)
    #[error("failed to export {path}: {reason}")]
    Generic {
        /// Display path of the document
        path: String,
        /// Why the export failed
        reason: String,
    },
}

impl ExportError {
    /// Classify a failure for one document into NotFound or Generic.
    pub fn classify(path: &str, err: &Error) -> Self {
        if err.is_not_found() {
            ExportError::NotFound {
                path: path.to_string(),
            }
        } else {
            ExportError::Generic {
                path: path.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Display path of the document that failed
    pub fn path(&self) -> &str {
        match self {
            ExportError::NotFound { path } | ExportError::Generic { path, .. } => path,
        }
    }
}

/// Error reported by the storage provider's HTTP API
///
/// Dropbox error bodies look like
/// `{"error_summary": "path/not_found/..", "error": {".tag": "path", "path": {".tag": "not_found"}}}`.
/// The nested `.tag` chain is flattened into `tags`, outermost first.
#[derive(Debug, Clone, Error)]
#[error("HTTP {status}: {}", .summary.as_deref().unwrap_or("no summary"))]
pub struct ProviderError {
    /// HTTP status code
    pub status: u16,
    /// Human-readable `error_summary` (or the raw body for non-JSON responses)
    pub summary: Option<String>,
    /// Nested `.tag` values of the structured error, outermost first
    pub tags: Vec<String>,
}

impl ProviderError {
    /// Parse a provider error from an HTTP status and response body
    pub fn from_body(status: u16, body: &str) -> Self {
        match serde_json::from_str::<Value>(body) {
            Ok(value) if value.is_object() => {
                let summary = value
                    .get("error_summary")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let mut tags = Vec::new();
                if let Some(error) = value.get("error") {
                    collect_tags(error, &mut tags);
                }
                Self {
                    status,
                    summary,
                    tags,
                }
            }
            _ => {
                let trimmed = body.trim();
                Self {
                    status,
                    summary: (!trimmed.is_empty()).then(|| trimmed.to_string()),
                    tags: Vec::new(),
                }
            }
        }
    }

    /// True when the provider tagged the failure as `not_found`
    pub fn is_not_found(&self) -> bool {
        self.tags.iter().any(|t| t == "not_found")
            || self
                .summary
                .as_deref()
                .is_some_and(|s| s.split('/').any(|part| part == "not_found"))
    }

    /// True when the failure is an authentication problem
    pub fn is_auth_failure(&self) -> bool {
        self.status == 401
            || self
                .tags
                .iter()
                .any(|t| t == "invalid_access_token" || t == "expired_access_token")
    }
}

/// Walk `{".tag": "a", "a": {".tag": "b", ...}}` collecting `a`, `b`, ...
fn collect_tags(value: &Value, tags: &mut Vec<String>) {
    let Some(tag) = value.get(".tag").and_then(Value::as_str) else {
        return;
    };
    tags.push(tag.to_string());
    if let Some(inner) = value.get(tag) {
        collect_tags(inner, tags);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_collects_nested_tags() {
        let body = r#"{"error_summary": "path/not_found/..", "error": {".tag": "path", "path": {".tag": "not_found"}}}"#;
        let err = ProviderError::from_body(409, body);

        assert_eq!(err.status, 409);
        assert_eq!(err.summary.as_deref(), Some("path/not_found/.."));
        assert_eq!(err.tags, vec!["path", "not_found"]);
        assert!(err.is_not_found());
        assert!(!err.is_auth_failure());
    }

    #[test]
    fn provider_error_plain_text_body_becomes_summary() {
        let err = ProviderError::from_body(400, "Error in call to API function \"files/export\"\n");

        assert_eq!(
            err.summary.as_deref(),
            Some("Error in call to API function \"files/export\"")
        );
        assert!(err.tags.is_empty());
        assert!(!err.is_not_found());
    }

    #[test]
    fn provider_error_empty_body_has_no_summary() {
        let err = ProviderError::from_body(500, "  ");
        assert!(err.summary.is_none());
        assert_eq!(err.to_string(), "HTTP 500: no summary");
    }

    #[test]
    fn invalid_token_is_auth_failure() {
        let body = r#"{"error_summary": "invalid_access_token/...", "error": {".tag": "invalid_access_token"}}"#;
        let err = ProviderError::from_body(401, body);
        assert!(err.is_auth_failure());
    }

    #[test]
    fn enumeration_error_keeps_provider_summary() {
        let source = Error::Provider(ProviderError {
            status: 409,
            summary: Some("path/malformed_path/".to_string()),
            tags: vec![],
        });
        match Error::enumeration(&source) {
            Error::Enumeration { message } => assert_eq!(message, "path/malformed_path/"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn enumeration_error_falls_back_to_generic_message() {
        let source = Error::Io(std::io::Error::other("boom"));
        match Error::enumeration(&source) {
            Error::Enumeration { message } => assert_eq!(message, GENERIC_ENUMERATION_ERROR),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn classify_separates_not_found_from_generic() {
        let not_found = Error::Provider(ProviderError {
            status: 409,
            summary: None,
            tags: vec!["path".into(), "not_found".into()],
        });
        assert!(matches!(
            ExportError::classify("/Doc.paper", &not_found),
            ExportError::NotFound { .. }
        ));

        let other = Error::Io(std::io::Error::other("disk full"));
        let classified = ExportError::classify("/Doc.paper", &other);
        assert!(matches!(classified, ExportError::Generic { .. }));
        assert_eq!(classified.path(), "/Doc.paper");
    }

    #[test]
    fn wrapped_export_error_keeps_not_found_classification() {
        let not_found = Error::Export(ExportError::NotFound {
            path: "/Gone.paper".to_string(),
        });
        assert!(not_found.is_not_found());

        let generic = Error::Export(ExportError::Generic {
            path: "/Doc.paper".to_string(),
            reason: "HTTP 500: boom".to_string(),
        });
        assert!(!generic.is_not_found());
        assert_eq!(
            generic.to_string(),
            "export error: failed to export /Doc.paper: HTTP 500: boom"
        );
    }

    #[test]
    fn server_error_is_not_auth_failure() {
        let err = ProviderError::from_body(503, "service unavailable");
        assert!(!err.is_auth_failure());
    }
}
