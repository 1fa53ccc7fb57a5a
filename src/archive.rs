//! In-memory archive accumulation and finalization
//!
//! Successful items are collected into one ZIP per run, written with
//! Deflate at a low/fast compression level, and regenerated fully on every
//! run — there is no incremental append across runs.

use crate::error::ArchiveError;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Suffix appended to the selected folder name for the bundle
const ARCHIVE_SUFFIX: &str = "_upscaled";

/// Derive the archive file name from the selected folder name
#[must_use]
pub fn archive_name(folder: &str) -> String {
    format!("{folder}{ARCHIVE_SUFFIX}.zip")
}

/// Accumulates `(name, bytes)` entries into an in-memory ZIP stream
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: FileOptions,
    entries: usize,
}

impl ArchiveBuilder {
    /// Create an empty builder with the given Deflate compression level
    pub fn new(compression_level: i32) -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: FileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(compression_level)),
            entries: 0,
        }
    }

    /// Register one entry under its output name
    pub fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<(), ArchiveError> {
        self.writer
            .start_file(name, self.options)
            .map_err(|e| ArchiveError::EntryWrite {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        self.writer
            .write_all(bytes)
            .map_err(|e| ArchiveError::EntryWrite {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
        self.entries += 1;
        debug!(entry = name, size = bytes.len(), "added archive entry");
        Ok(())
    }

    /// Number of entries registered so far
    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Close the ZIP stream and produce the downloadable bundle
    ///
    /// Fails with [`ArchiveError::Empty`] when nothing was registered.
    pub fn finalize(mut self, name: String) -> Result<ArchiveOutput, ArchiveError> {
        if self.entries == 0 {
            return Err(ArchiveError::Empty);
        }
        let cursor = self
            .writer
            .finish()
            .map_err(|e| ArchiveError::Finalize {
                reason: e.to_string(),
            })?;
        let bytes = cursor.into_inner();
        info!(
            archive = %name,
            entries = self.entries,
            size = bytes.len(),
            "archive finalized"
        );
        Ok(ArchiveOutput {
            name,
            bytes,
            entries: self.entries,
        })
    }
}

/// A finalized archive ready for retrieval
#[derive(Clone, Debug)]
pub struct ArchiveOutput {
    /// Suggested file name, derived from the selected folder
    pub name: String,

    /// The complete ZIP bytes
    pub bytes: Vec<u8>,

    /// Number of entries bundled
    pub entries: usize,
}

impl ArchiveOutput {
    /// Write the bundle into a directory under its suggested name
    ///
    /// Returns the path of the written file.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let path = dir.as_ref().join(&self.name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}
