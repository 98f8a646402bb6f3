//! In-memory Markdown archive, serialized once to a ZIP blob at the end of a run.

use std::collections::HashMap;
use std::io::{Cursor, Write};

use tracing::debug;
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

use crate::error::Result;

/// Relative path → Markdown text, in first-insertion order
///
/// Writing an existing path replaces its content in place (last write wins).
#[derive(Debug, Default)]
pub struct MarkdownArchive {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl MarkdownArchive {
    /// Empty archive
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the entry at `path`
    pub fn insert(&mut self, path: impl Into<String>, content: impl Into<String>) {
        let path = path.into();
        let content = content.into();
        match self.index.get(&path) {
            Some(&i) => {
                debug!(path = %path, "replacing archive entry");
                self.entries[i].1 = content;
            }
            None => {
                self.index.insert(path.clone(), self.entries.len());
                self.entries.push((path, content));
            }
        }
    }

    /// Number of distinct entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Content stored at `path`
    pub fn get(&self, path: &str) -> Option<&str> {
        self.index.get(path).map(|&i| self.entries[i].1.as_str())
    }

    /// Entry names in insertion order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    /// Serialize every entry into a deflate-compressed ZIP blob
    pub fn to_zip_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

        for (path, content) in &self.entries {
            writer.start_file(path.as_str(), options)?;
            writer.write_all(content.as_bytes())?;
        }

        let cursor = writer.finish()?;
        let bytes = cursor.into_inner();
        debug!(entries = self.entries.len(), bytes = bytes.len(), "archive serialized");
        Ok(bytes)
    }
}
