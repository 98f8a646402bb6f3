//! Core exporter implementation split into focused submodules.
//!
//! The `PaperExporter` struct and its methods are organized by domain:
//! - [`control`] - Session control (start/stop, token validation, run state)
//! - [`enumeration`] - Paginated listing of matching documents
//! - [`export_task`] - Batch orchestration and per-document export

mod control;
mod enumeration;
mod export_task;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;

pub use enumeration::enumerate_documents;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::delivery::{DirectoryDelivery, FileDelivery};
use crate::error::Result;
use crate::provider::{DropboxConnector, ProviderConnector};
use crate::types::{ActionRole, Event, MessageLevel, RunState, RunTransition};

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 1000;

/// Run state plus the cancellation handle of the current run
#[derive(Default)]
pub(crate) struct SessionState {
    pub(crate) state: RunState,
    pub(crate) cancel_token: Option<CancellationToken>,
}

/// Export session (cloneable - all fields are Arc-wrapped)
///
/// Owns the configuration, the provider connector, the delivery target and the
/// run state. One run at a time; [`stop`](Self::stop) may be called from any
/// task while [`start`](Self::start) is in progress.
#[derive(Clone)]
pub struct PaperExporter {
    /// Configuration (wrapped in Arc for sharing across tasks)
    pub(crate) config: Arc<Config>,
    /// Event broadcast channel sender (multiple subscribers supported)
    pub(crate) event_tx: broadcast::Sender<Event>,
    /// Builds an authenticated provider handle from the user's token
    pub(crate) connector: Arc<dyn ProviderConnector>,
    /// Where downloaded files and archives are saved
    pub(crate) delivery: Arc<dyn FileDelivery>,
    /// Current run state and cancellation handle
    pub(crate) session: Arc<Mutex<SessionState>>,
}

impl PaperExporter {
    /// Create an exporter talking to Dropbox and saving into `config.export.output_dir`
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let connector = Arc::new(DropboxConnector::new(config.api.clone()));
        let delivery = Arc::new(DirectoryDelivery::new(config.export.output_dir.clone()));
        Ok(Self::with_components(config, connector, delivery))
    }

    /// Create an exporter with a custom provider connector and delivery target
    pub fn with_components(
        config: Config,
        connector: Arc<dyn ProviderConnector>,
        delivery: Arc<dyn FileDelivery>,
    ) -> Self {
        let (event_tx, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            config: Arc::new(config),
            event_tx,
            connector,
            delivery,
            session: Arc::new(Mutex::new(SessionState::default())),
        }
    }

    /// Subscribe to status, progress and state events
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.event_tx.subscribe()
    }

    /// Current run state
    pub fn state(&self) -> RunState {
        self.lock_session().state
    }

    /// Role of the start/stop control in the current state
    pub fn action(&self) -> ActionRole {
        self.state().action()
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub(crate) fn lock_session(&self) -> MutexGuard<'_, SessionState> {
        // State stays consistent even if a holder panicked: every write is a single assignment
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a run-state transition and announce the new state.
    ///
    /// Returns `None` (and changes nothing) if the transition is not valid from the
    /// current state.
    pub(crate) fn transition(&self, transition: RunTransition) -> Option<RunState> {
        let next = {
            let mut session = self.lock_session();
            let next = session.state.apply(transition)?;
            session.state = next;
            if !matches!(next, RunState::Running) {
                session.cancel_token = None;
            }
            next
        };
        tracing::debug!(?transition, state = ?next, "run state changed");
        self.emit(Event::StateChanged {
            state: next,
            action: next.action(),
        });
        Some(next)
    }

    pub(crate) fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    pub(crate) fn status(&self, level: MessageLevel, message: impl Into<String>) {
        self.emit(Event::status(level, message));
    }
}
