//! Batch orchestration: sequential export of every enumerated document.

use crate::archive::MarkdownArchive;
use crate::error::Result;
use crate::types::{Event, ExportSummary, FileEntry};

use super::context::ExportTaskContext;
use super::document::export_document;
use super::finalization::{finalize_completed, finalize_stopped};

/// Terminal result of a batch
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum BatchOutcome {
    /// Every document was attempted
    Completed(ExportSummary),
    /// Cancellation was observed between documents
    Stopped(ExportSummary),
}

/// Export `files` one at a time, in order.
///
/// Phases per document:
/// 1. Check for cancellation (the only point where a stop is observed)
/// 2. Export and deliver the document (failures are tallied, never fatal)
/// 3. Publish progress
/// 4. Pause for `export.item_delay` before the next document
///
/// After the last document the batch is finalized: the archive is packaged and
/// delivered in archive mode, otherwise the tally is reported. Only archive
/// packaging or delivery can make this return an error.
pub(crate) async fn run_batch(
    ctx: &ExportTaskContext,
    files: &[FileEntry],
    archive_mode: bool,
) -> Result<BatchOutcome> {
    let total = files.len();
    let mut archive = archive_mode.then(MarkdownArchive::new);
    let mut summary = ExportSummary {
        total,
        ..ExportSummary::default()
    };

    tracing::info!(total, archive_mode, "export batch started");
    ctx.emit(Event::progress(0, total));

    for (index, entry) in files.iter().enumerate() {
        if ctx.cancel_token.is_cancelled() {
            return Ok(BatchOutcome::Stopped(finalize_stopped(ctx, summary)));
        }

        let outcome = export_document(ctx, entry, archive.as_mut()).await;
        summary.record(outcome);
        ctx.emit(Event::progress(index + 1, total));

        if index + 1 < total {
            pause(ctx).await;
        }
    }

    // A stop requested while the last document was in flight still counts
    if ctx.cancel_token.is_cancelled() {
        return Ok(BatchOutcome::Stopped(finalize_stopped(ctx, summary)));
    }

    let summary = finalize_completed(ctx, summary, archive).await?;
    Ok(BatchOutcome::Completed(summary))
}

/// Courtesy delay between documents; returns early once a stop is requested.
async fn pause(ctx: &ExportTaskContext) {
    let delay = ctx.config.export.item_delay;
    if delay.is_zero() {
        return;
    }
    tokio::select! {
        _ = tokio::time::sleep(delay) => {}
        _ = ctx.cancel_token.cancelled() => {}
    }
}
