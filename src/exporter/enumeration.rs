//! Document enumeration: walks the paginated listing until it is exhausted.

use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::provider::StorageProvider;
use crate::types::FileEntry;

/// List every file under `root_path` (recursively) whose name ends with `extension`.
///
/// Follows the continuation cursor until the provider reports no more pages.
/// Any failed page aborts with [`Error::Enumeration`], carrying the provider's
/// summary when it sent one.
pub async fn enumerate_documents(
    provider: &dyn StorageProvider,
    root_path: &str,
    extension: &str,
) -> Result<Vec<FileEntry>> {
    let mut page = provider
        .list_folder(root_path, true)
        .await
        .map_err(enumeration_failed)?;

    let mut documents = Vec::new();
    let mut pages = 1usize;

    loop {
        let listed = page.entries.len();
        documents.extend(
            page.entries
                .into_iter()
                .filter(|entry| entry.is_file() && entry.has_extension(extension)),
        );
        debug!(page = pages, listed, matched = documents.len(), "listing page processed");

        if !page.has_more {
            break;
        }

        page = provider
            .list_folder_continue(&page.cursor)
            .await
            .map_err(enumeration_failed)?;
        pages += 1;
    }

    info!(pages, documents = documents.len(), "enumeration complete");
    Ok(documents)
}

fn enumeration_failed(err: Error) -> Error {
    warn!(error = %err, "listing failed");
    Error::enumeration(&err)
}
