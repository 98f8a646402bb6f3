//! Core types for paper-export

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// File metadata record as reported by the provider's listing call
///
/// Immutable; lives for one enumeration pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Entry kind: "file", "folder" or "deleted"
    #[serde(rename = ".tag")]
    pub tag: String,
    /// Last path component, as displayed
    pub name: String,
    /// Full path with the user's casing, e.g. "/Notes/Plan.paper"
    #[serde(default)]
    pub path_display: String,
    /// Lowercased canonical path, used to address the file in API calls
    #[serde(default)]
    pub path_lower: String,
}

impl FileEntry {
    /// Build a file entry from its display path (canonical path is the lowercased form)
    pub fn file(path_display: &str) -> Self {
        let name = path_display
            .rsplit('/')
            .next()
            .unwrap_or(path_display)
            .to_string();
        Self {
            tag: "file".to_string(),
            name,
            path_display: path_display.to_string(),
            path_lower: path_display.to_lowercase(),
        }
    }

    /// True for regular files (not folders or deleted entries)
    pub fn is_file(&self) -> bool {
        self.tag == "file"
    }

    /// True if the name ends with `extension`, compared case-insensitively
    pub fn has_extension(&self, extension: &str) -> bool {
        self.name
            .to_lowercase()
            .ends_with(&extension.to_lowercase())
    }

    /// Path used to address the document in provider calls
    pub fn api_path(&self) -> &str {
        if self.path_lower.is_empty() {
            &self.path_display
        } else {
            &self.path_lower
        }
    }
}

/// One page of a folder listing
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListFolderPage {
    /// Entries on this page
    pub entries: Vec<FileEntry>,
    /// Continuation cursor for the next page
    pub cursor: String,
    /// Whether more pages remain
    pub has_more: bool,
}

/// Account returned by the identity check
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Account {
    /// Provider account identifier
    pub account_id: String,
    /// Account holder's name
    #[serde(default)]
    pub name: Option<AccountName>,
    /// Account email
    #[serde(default)]
    pub email: Option<String>,
}

/// Name block of an [`Account`]
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AccountName {
    /// Name suitable for display
    pub display_name: String,
}

impl Account {
    /// Best label for status messages
    pub fn label(&self) -> &str {
        self.name
            .as_ref()
            .map(|n| n.display_name.as_str())
            .or(self.email.as_deref())
            .unwrap_or(&self.account_id)
    }
}

/// Sanitized location of an exported document relative to the export root
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelativePath {
    /// Slash-joined sanitized folder segments ("" at the root)
    pub dir: String,
    /// Sanitized filename with a `.md` extension
    pub name: String,
}

/// Severity of a status message
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    /// Informational
    Normal,
    /// Something failed
    Error,
}

/// Lifecycle of an export session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    /// Waiting for the user to start
    #[default]
    Idle,
    /// Authenticating, enumerating or exporting
    Running,
    /// Every document was attempted
    Completed,
    /// The user stopped the run
    Stopped,
}

/// Inputs to the run-state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunTransition {
    /// User pressed start
    Start,
    /// Last document processed
    Finish,
    /// Cancellation observed between documents
    Cancel,
    /// Run failed before the batch (auth, enumeration, nothing found) or while packaging
    Abort,
    /// Controls return to the start state after a terminal state
    Reset,
}

/// Role of the single start/stop control, derived from [`RunState`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionRole {
    /// Control starts an export
    Start,
    /// Control stops the running export
    Stop,
}

impl RunState {
    /// Apply a transition, returning the next state or `None` if it is not allowed here
    pub fn apply(self, transition: RunTransition) -> Option<RunState> {
        use RunState::*;
        use RunTransition as T;
        match (self, transition) {
            (Idle | Completed | Stopped, T::Start) => Some(Running),
            (Running, T::Finish) => Some(Completed),
            (Running, T::Cancel) => Some(Stopped),
            (Running, T::Abort) => Some(Idle),
            (Completed | Stopped, T::Reset) => Some(Idle),
            _ => None,
        }
    }

    /// What the start/stop control does in this state
    pub fn action(self) -> ActionRole {
        match self {
            RunState::Running => ActionRole::Stop,
            RunState::Idle | RunState::Completed | RunState::Stopped => ActionRole::Start,
        }
    }
}

/// Event emitted to subscribers (the host UI surface)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Line for the status log
    Status {
        /// Normal or error
        level: MessageLevel,
        /// Message text
        message: String,
        /// When the message was produced
        timestamp: DateTime<Utc>,
    },

    /// Progress after a document was processed
    Progress {
        /// Documents processed so far
        current: usize,
        /// Documents in the run
        total: usize,
        /// `current / total` as a percentage (0.0 to 100.0)
        percent: f32,
    },

    /// Progress display cleared at the end of a run
    ProgressReset,

    /// Session state changed
    StateChanged {
        /// New state
        state: RunState,
        /// Role of the start/stop control in the new state
        action: ActionRole,
    },

    /// Document delivered
    DocumentExported {
        /// Display path of the source document
        path: String,
        /// Archive entry name or downloaded filename
        delivered_as: String,
    },

    /// Document skipped after a failure
    DocumentFailed {
        /// Display path of the source document
        path: String,
        /// Provider reported the document as missing
        not_found: bool,
        /// Error message
        error: String,
    },
}

impl Event {
    /// Build a status event stamped with the current time
    pub fn status(level: MessageLevel, message: impl Into<String>) -> Self {
        Event::Status {
            level,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// Build a progress event
    pub fn progress(current: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            (current as f32 / total as f32) * 100.0
        };
        Event::Progress {
            current,
            total,
            percent,
        }
    }
}

/// What the user asked for when pressing start
#[derive(Clone, Debug, Default)]
pub struct ExportRequest {
    /// Access token
    pub token: String,
    /// Bundle everything into one archive instead of one file per document
    pub archive: bool,
}

impl ExportRequest {
    /// Request for a token and delivery mode
    pub fn new(token: impl Into<String>, archive: bool) -> Self {
        Self {
            token: token.into(),
            archive,
        }
    }
}

/// Tally of a finished run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    /// Documents found by enumeration
    pub total: usize,
    /// Documents whose export was attempted
    pub attempted: usize,
    /// Documents exported successfully
    pub exported: usize,
    /// Documents that failed for any reason (includes `not_found`)
    pub failed: usize,
    /// Documents the provider reported as missing
    pub not_found: usize,
    /// Where the archive was saved (archive mode, completed runs only)
    pub archive_path: Option<PathBuf>,
}

/// How a run ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Enumeration returned no matching documents; no batch was started
    NothingFound,
    /// Every document was attempted
    Completed(ExportSummary),
    /// The user stopped the run
    Stopped(ExportSummary),
}
