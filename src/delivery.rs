//! Delivery of finished files to the user's disk.

use std::path::PathBuf;

use crate::error::{Error, Result};

/// Saves a payload under a filename chosen by the exporter
#[async_trait::async_trait]
pub trait FileDelivery: Send + Sync {
    /// Save `bytes` as `filename` and return where it ended up
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

/// Writes files into one output directory, overwriting existing files
#[derive(Clone, Debug)]
pub struct DirectoryDelivery {
    output_dir: PathBuf,
}

impl DirectoryDelivery {
    /// Deliver into `output_dir` (created on first delivery)
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait::async_trait]
impl FileDelivery for DirectoryDelivery {
    async fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        // Flattened names never contain separators; reject anything that would escape the directory
        if filename.is_empty()
            || filename.contains(['/', '\\'])
            || filename == "."
            || filename == ".."
        {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("refusing to deliver to unsafe filename '{}'", filename),
            )));
        }

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!(
                        "Failed to create output directory '{}': {}",
                        self.output_dir.display(),
                        e
                    ),
                ))
            })?;

        let target = self.output_dir.join(filename);
        tokio::fs::write(&target, bytes).await.map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write '{}': {}", target.display(), e),
            ))
        })?;

        tracing::debug!(path = %target.display(), bytes = bytes.len(), "file delivered");
        Ok(target)
    }
}
