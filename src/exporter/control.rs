//! Session control: start and stop export runs.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::{AuthError, Error, Result};
use crate::provider::StorageProvider;
use crate::types::{
    Event, ExportRequest, FileEntry, MessageLevel, RunOutcome, RunState, RunTransition,
};

use super::PaperExporter;
use super::enumeration::enumerate_documents;
use super::export_task::{BatchOutcome, ExportTaskContext, run_batch};

impl PaperExporter {
    /// Run a complete export: validate the token, check identity, enumerate, export.
    ///
    /// The session moves `Idle → Running` and ends in one of:
    /// - `Completed` or `Stopped` (then back to `Idle`) after a batch
    /// - `Idle` directly when authentication or enumeration fails, or nothing is found
    ///
    /// # Errors
    ///
    /// - [`AuthError::MissingToken`] if the token is empty (the session never leaves `Idle`)
    /// - [`Error::AlreadyRunning`] if a run is in progress
    /// - [`AuthError::Rejected`] if the provider refuses the token (enumeration is not attempted)
    /// - [`Error::Provider`] / [`Error::Network`] if the identity check fails for another reason
    /// - [`Error::Enumeration`] if any listing page fails
    /// - [`Error::Archive`] / [`Error::Io`] if the final archive cannot be saved
    ///
    /// Individual document failures are not errors; they are reported and tallied.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use paper_export::*;
    /// # async fn example(exporter: PaperExporter) -> Result<()> {
    /// let outcome = exporter.start(ExportRequest::new("sl.token", true)).await?;
    /// if let RunOutcome::Completed(summary) = outcome {
    ///     println!("exported {} of {}", summary.exported, summary.total);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn start(&self, request: ExportRequest) -> Result<RunOutcome> {
        let token = request.token.trim();
        if token.is_empty() {
            let err = Error::from(AuthError::MissingToken);
            self.status(MessageLevel::Error, "Please enter an access token");
            return Err(err);
        }

        let cancel_token = self.begin_run()?;

        let (provider, files) = match self.prepare(token).await {
            Ok(Some(found)) => found,
            Ok(None) => {
                self.status(MessageLevel::Normal, "No Paper documents found");
                self.transition(RunTransition::Abort);
                return Ok(RunOutcome::NothingFound);
            }
            Err(e) => {
                tracing::warn!(error = %e, "export aborted before the batch");
                self.status(MessageLevel::Error, e.to_string());
                self.transition(RunTransition::Abort);
                return Err(e);
            }
        };

        let ctx = ExportTaskContext {
            provider,
            delivery: self.delivery.clone(),
            event_tx: self.event_tx.clone(),
            config: self.config.clone(),
            cancel_token,
        };

        match run_batch(&ctx, &files, request.archive).await {
            Ok(BatchOutcome::Completed(summary)) => {
                self.transition(RunTransition::Finish);
                self.transition(RunTransition::Reset);
                Ok(RunOutcome::Completed(summary))
            }
            Ok(BatchOutcome::Stopped(summary)) => {
                self.transition(RunTransition::Cancel);
                self.transition(RunTransition::Reset);
                Ok(RunOutcome::Stopped(summary))
            }
            Err(e) => {
                self.transition(RunTransition::Abort);
                Err(e)
            }
        }
    }

    /// Request that the running export stop before its next document.
    ///
    /// The document currently being exported always finishes. Returns `false`
    /// when nothing is running.
    pub fn stop(&self) -> bool {
        let token = {
            let session = self.lock_session();
            match (session.state, session.cancel_token.as_ref()) {
                (RunState::Running, Some(token)) if !token.is_cancelled() => token.clone(),
                _ => return false,
            }
        };
        token.cancel();
        tracing::info!("stop requested");
        self.status(
            MessageLevel::Normal,
            "Stopping after the current document...",
        );
        true
    }

    /// Move to Running and hand out the run's cancellation token.
    fn begin_run(&self) -> Result<CancellationToken> {
        let cancel_token = CancellationToken::new();
        let next = {
            let mut session = self.lock_session();
            let next = session
                .state
                .apply(RunTransition::Start)
                .ok_or(Error::AlreadyRunning)?;
            session.state = next;
            session.cancel_token = Some(cancel_token.clone());
            next
        };
        tracing::info!("export run started");
        self.emit(Event::StateChanged {
            state: next,
            action: next.action(),
        });
        Ok(cancel_token)
    }

    /// Connect, verify the token and enumerate documents.
    ///
    /// Returns `None` when the account holds no matching documents.
    async fn prepare(
        &self,
        token: &str,
    ) -> Result<Option<(Arc<dyn StorageProvider>, Vec<FileEntry>)>> {
        let provider = self.connector.connect(token)?;

        let account = provider.current_account().await.map_err(|e| match e {
            Error::Provider(p) if p.is_auth_failure() => Error::from(AuthError::Rejected {
                reason: p.summary.clone().unwrap_or_else(|| p.to_string()),
            }),
            other => other,
        })?;
        tracing::info!(account = %account.account_id, "access token verified");
        self.status(
            MessageLevel::Normal,
            format!("Connected as {}", account.label()),
        );

        self.status(MessageLevel::Normal, "Searching for Paper documents...");
        let export = &self.config.export;
        let files =
            enumerate_documents(provider.as_ref(), &export.root_path, &export.target_extension)
                .await?;

        if files.is_empty() {
            return Ok(None);
        }

        self.status(
            MessageLevel::Normal,
            format!("Found {} Paper documents", files.len()),
        );
        Ok(Some((provider, files)))
    }
}
