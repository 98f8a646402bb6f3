//! Single-document export: convert to Markdown and deliver.

use crate::archive::MarkdownArchive;
use crate::error::{Error, ExportError, Result};
use crate::paths::relative_path;
use crate::types::{Event, ExportSummary, FileEntry, RelativePath};

use super::context::ExportTaskContext;

/// What happened to one document
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum DocumentOutcome {
    Exported,
    NotFound,
    Failed,
}

impl DocumentOutcome {
    /// Contribution to the success tally
    pub(crate) fn count(self) -> usize {
        match self {
            DocumentOutcome::Exported => 1,
            DocumentOutcome::NotFound | DocumentOutcome::Failed => 0,
        }
    }
}

impl ExportSummary {
    pub(crate) fn record(&mut self, outcome: DocumentOutcome) {
        self.attempted += 1;
        self.exported += outcome.count();
        match outcome {
            DocumentOutcome::Exported => {}
            DocumentOutcome::NotFound => {
                self.failed += 1;
                self.not_found += 1;
            }
            DocumentOutcome::Failed => self.failed += 1,
        }
    }
}

/// Export one document and deliver it, either into `archive` or as a standalone file.
///
/// Never fails: errors are reported as status events and folded into the outcome
/// so the batch can continue.
pub(super) async fn export_document(
    ctx: &ExportTaskContext,
    entry: &FileEntry,
    archive: Option<&mut MarkdownArchive>,
) -> DocumentOutcome {
    let rel = relative_path(entry);

    match deliver(ctx, entry, &rel, archive).await {
        Ok(delivered_as) => {
            tracing::debug!(path = %entry.path_display, delivered_as = %delivered_as, "document exported");
            ctx.status(format!("Exported {}", entry.path_display));
            ctx.emit(Event::DocumentExported {
                path: entry.path_display.clone(),
                delivered_as,
            });
            DocumentOutcome::Exported
        }
        Err(e) => {
            let failure = Error::Export(ExportError::classify(&entry.path_display, &e));
            let not_found = failure.is_not_found();
            if not_found {
                tracing::warn!(path = %entry.path_display, "document not found, skipping");
                ctx.error(format!("Not found, skipped: {}", entry.path_display));
            } else {
                tracing::warn!(path = %entry.path_display, error = %e, "document export failed");
                ctx.error(failure.to_string());
            }
            ctx.emit(Event::DocumentFailed {
                path: entry.path_display.clone(),
                not_found,
                error: failure.to_string(),
            });
            if not_found {
                DocumentOutcome::NotFound
            } else {
                DocumentOutcome::Failed
            }
        }
    }
}

/// Fetch the Markdown and hand it to the archive or the file delivery primitive.
///
/// Returns the archive entry name or the downloaded filename.
async fn deliver(
    ctx: &ExportTaskContext,
    entry: &FileEntry,
    rel: &RelativePath,
    archive: Option<&mut MarkdownArchive>,
) -> Result<String> {
    let markdown = ctx.provider.export_markdown(entry.api_path()).await?;

    match archive {
        Some(archive) => {
            let entry_name = rel.archive_path();
            archive.insert(entry_name.clone(), markdown);
            Ok(entry_name)
        }
        None => {
            let filename = rel.flattened_name();
            ctx.delivery.deliver(&filename, markdown.as_bytes()).await?;
            Ok(filename)
        }
    }
}
