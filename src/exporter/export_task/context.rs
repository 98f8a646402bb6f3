//! Export task context: shared state for one run.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::delivery::FileDelivery;
use crate::provider::StorageProvider;
use crate::types::{Event, MessageLevel};

/// Everything the batch loop and the document exporter need, passed by reference.
pub(crate) struct ExportTaskContext {
    pub(crate) provider: Arc<dyn StorageProvider>,
    pub(crate) delivery: Arc<dyn FileDelivery>,
    pub(crate) event_tx: tokio::sync::broadcast::Sender<Event>,
    pub(crate) config: Arc<Config>,
    pub(crate) cancel_token: CancellationToken,
}

impl ExportTaskContext {
    pub(super) fn emit(&self, event: Event) {
        self.event_tx.send(event).ok();
    }

    pub(super) fn status(&self, message: impl Into<String>) {
        self.emit(Event::status(MessageLevel::Normal, message));
    }

    pub(super) fn error(&self, message: impl Into<String>) {
        self.emit(Event::status(MessageLevel::Error, message));
    }
}
