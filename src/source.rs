//! Source selection: folder scanning with a fixed raster-image allow-list

use crate::error::{Error, Result};
use crate::types::SourceFile;
use std::path::Path;
use tracing::{debug, warn};

/// MIME types accepted into a run; anything else is silently excluded
pub const ALLOWED_MIME: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/gif",
    "image/bmp",
];

/// Map a file extension (case-insensitive) to its allow-listed MIME type
///
/// Returns `None` for extensions outside the allow-list.
#[must_use]
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    match ext.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "webp" => Some("image/webp"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        _ => None,
    }
}

/// An ordered set of source files plus the folder name that seeds the
/// archive name
#[derive(Clone, Debug)]
pub struct Selection {
    /// Name of the selected top-level folder
    pub folder: String,

    /// Accepted files in selection order
    pub files: Vec<SourceFile>,
}

impl Selection {
    /// Build a selection directly from files, for embedders that source
    /// images from somewhere other than a local folder
    pub fn from_files(folder: impl Into<String>, files: Vec<SourceFile>) -> Self {
        Self {
            folder: folder.into(),
            files,
        }
    }
}

/// Scan a folder into a [`Selection`]
///
/// Reads the directory non-recursively, keeps files whose extension maps
/// into the allow-list, and sorts by file name so runs are deterministic.
/// Returns [`Error::NoSources`] when nothing supported is found.
pub fn scan_folder(dir: impl AsRef<Path>) -> Result<Selection> {
    let dir = dir.as_ref();
    debug!(?dir, "scanning folder for images");

    let folder = dir
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("images")
        .to_string();

    let mut files = Vec::new();
    let mut skipped = 0usize;

    let mut entries: Vec<_> = std::fs::read_dir(dir)?.collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        if path.is_dir() {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            skipped += 1;
            continue;
        };

        let mime = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(mime_for_extension);

        match mime {
            Some(mime) => {
                let bytes = std::fs::read(&path)?;
                files.push(SourceFile::new(name, mime, bytes));
            }
            None => skipped += 1,
        }
    }

    if files.is_empty() {
        warn!(?dir, skipped, "no supported images found");
        return Err(Error::NoSources(dir.display().to_string()));
    }

    debug!(accepted = files.len(), skipped, "folder scan complete");
    Ok(Selection { folder, files })
}
