//! Path normalization: provider paths to safe local names
//!
//! Nothing here fails: every well-formed provider path maps to a [`RelativePath`].
//! Two different documents can map to the same archive entry or flattened name
//! (e.g. `/a:b/Doc.paper` and `/ab/Doc.paper`); the later write wins.
//!
//! Folder segments that sanitize to nothing (e.g. `???`) are dropped from
//! `dir`, so `/A/???/Doc.paper` lands in `A` rather than `A//`.

use crate::types::{FileEntry, RelativePath};

/// Characters that are illegal in filenames on common filesystems
pub const ILLEGAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Token placed between folder segments in a flattened download name
pub const FLATTEN_SEPARATOR: &str = " ___ ";

/// Extension given to exported documents
pub const MARKDOWN_EXTENSION: &str = "md";

/// Remove characters that are illegal in filenames, leaving everything else untouched
///
/// # Examples
///
/// ```
/// use paper_export::paths::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Q3: plan <draft>?"), "Q3 plan draft");
/// assert_eq!(sanitize_filename("plain name"), "plain name");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .filter(|c| !ILLEGAL_FILENAME_CHARS.contains(c))
        .collect()
}

/// Replace the extension of `name` with `.md` (or append it when there is none)
///
/// A leading dot (".hidden") is not treated as an extension separator.
#[must_use]
pub fn markdown_name(name: &str) -> String {
    let stem = match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    };
    format!("{}.{}", stem, MARKDOWN_EXTENSION)
}

/// Derive the sanitized folder and filename for a listed document
///
/// Folder segments come from the display path so the user's casing survives.
/// Segments that sanitize to nothing are dropped.
///
/// # Examples
///
/// ```
/// use paper_export::paths::relative_path;
/// use paper_export::types::FileEntry;
///
/// let rel = relative_path(&FileEntry::file("/A/B/Doc.paper"));
/// assert_eq!(rel.dir, "A/B");
/// assert_eq!(rel.name, "Doc.md");
/// ```
#[must_use]
pub fn relative_path(entry: &FileEntry) -> RelativePath {
    let full = if entry.path_display.is_empty() {
        entry.path_lower.as_str()
    } else {
        entry.path_display.as_str()
    };

    let mut segments: Vec<&str> = full.split('/').filter(|s| !s.is_empty()).collect();
    let last = segments.pop();

    let file_name = if entry.name.is_empty() {
        last.unwrap_or_default()
    } else {
        entry.name.as_str()
    };

    let dir = segments
        .into_iter()
        .map(sanitize_filename)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    RelativePath {
        dir,
        name: sanitize_filename(&markdown_name(file_name)),
    }
}

impl RelativePath {
    /// Entry name inside an archive: `dir/name`, or bare `name` at the root
    pub fn archive_path(&self) -> String {
        if self.dir.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.dir, self.name)
        }
    }

    /// Single-file download name: folder segments and filename joined by [`FLATTEN_SEPARATOR`]
    pub fn flattened_name(&self) -> String {
        if self.dir.is_empty() {
            return self.name.clone();
        }
        let mut parts: Vec<&str> = self.dir.split('/').collect();
        parts.push(&self.name);
        parts.join(FLATTEN_SEPARATOR)
    }
}
