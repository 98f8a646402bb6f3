//! Batch finalization: package the archive or report the tally.

use crate::archive::MarkdownArchive;
use crate::error::Result;
use crate::types::{Event, ExportSummary};

use super::context::ExportTaskContext;

/// Finish a batch that attempted every document.
///
/// In archive mode the archive is serialized and delivered as
/// `export.archive_name`; a packaging or delivery failure is reported and returned.
pub(super) async fn finalize_completed(
    ctx: &ExportTaskContext,
    mut summary: ExportSummary,
    archive: Option<MarkdownArchive>,
) -> Result<ExportSummary> {
    if let Some(archive) = archive {
        match package_archive(ctx, &archive).await {
            Ok(path) => {
                ctx.status(format!(
                    "Archive saved to {} ({} of {} documents)",
                    path.display(),
                    summary.exported,
                    summary.total
                ));
                summary.archive_path = Some(path);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to save archive");
                ctx.error(format!("Failed to save archive: {}", e));
                ctx.emit(Event::ProgressReset);
                return Err(e);
            }
        }
    } else {
        ctx.status(format!(
            "Exported {} of {} documents",
            summary.exported, summary.total
        ));
    }

    tracing::info!(
        exported = summary.exported,
        failed = summary.failed,
        not_found = summary.not_found,
        total = summary.total,
        "export batch completed"
    );
    ctx.emit(Event::ProgressReset);
    Ok(summary)
}

/// Finish a batch stopped by the user; a partial archive is discarded.
pub(super) fn finalize_stopped(ctx: &ExportTaskContext, summary: ExportSummary) -> ExportSummary {
    tracing::info!(
        attempted = summary.attempted,
        exported = summary.exported,
        total = summary.total,
        "export batch stopped by user"
    );
    ctx.status(format!(
        "Export stopped by user ({} of {} documents exported)",
        summary.exported, summary.total
    ));
    ctx.emit(Event::ProgressReset);
    summary
}

async fn package_archive(
    ctx: &ExportTaskContext,
    archive: &MarkdownArchive,
) -> Result<std::path::PathBuf> {
    let bytes = archive.to_zip_bytes()?;
    ctx.delivery
        .deliver(&ctx.config.export.archive_name, &bytes)
        .await
}
