//! Core types and events for cloudscale

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a single item in a run
///
/// States move forward only: `Completed` and `Failed` are terminal, and no
/// item returns to `Waiting` once started.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemState {
    /// Selected but not yet started
    Waiting,
    /// Upload in flight (or administratively pre-marked for this window)
    Uploading,
    /// Upload done, transform fetch in flight
    Transforming,
    /// Transformed bytes registered in the archive
    Completed,
    /// One of the pipeline steps failed
    Failed,
}

impl ItemState {
    /// Whether this state is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, ItemState::Completed | ItemState::Failed)
    }

    /// Whether this state counts toward the `processing` statistic
    pub fn is_active(&self) -> bool {
        matches!(self, ItemState::Uploading | ItemState::Transforming)
    }
}

/// Aggregate counters for one run
///
/// Updated incrementally as items change state, never recomputed from
/// scratch mid-run. `completed + errors <= total` holds at all times, and
/// `processing` equals the number of items currently uploading or
/// transforming.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Number of items selected for the run
    pub total: usize,
    /// Items currently uploading or transforming
    pub processing: usize,
    /// Items that reached `Completed`
    pub completed: usize,
    /// Items that reached `Failed`
    pub errors: usize,
}

/// An immutable reference to a locally selected image
///
/// Created at folder-scan time (or constructed directly by embedders),
/// never mutated, discarded on reset.
#[derive(Clone, Debug)]
pub struct SourceFile {
    name: String,
    mime: String,
    bytes: Vec<u8>,
}

impl SourceFile {
    /// Create a source file from a name, MIME type, and raw bytes
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    /// File name as selected
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Detected MIME type
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Byte size
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the file is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Raw bytes
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }
}

/// Event emitted during a run's lifecycle
///
/// Consumers subscribe via [`BatchUpscaler::subscribe`](crate::BatchUpscaler::subscribe);
/// no polling is required.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// A run has started
    RunStarted {
        /// Number of items in the run
        total: usize,
    },

    /// An item changed lifecycle state
    StateChanged {
        /// Item index in selection order
        index: usize,
        /// New state
        state: ItemState,
        /// Coarse progress estimate (0-100), a display hint only
        progress_hint: u8,
    },

    /// The remote API issued a processing handle for an uploaded item
    ///
    /// Uploaded assets cannot be deleted through this library; the handle is
    /// surfaced so an external collaborator can clean up the remote media
    /// library.
    HandleCreated {
        /// Item index in selection order
        index: usize,
        /// Opaque handle addressing the uploaded asset
        public_id: String,
    },

    /// An item failed; the run continues with its siblings
    ItemFailed {
        /// Item index in selection order
        index: usize,
        /// Name of the failed file
        name: String,
        /// Error message
        error: String,
    },

    /// The archive was finalized and is ready for retrieval
    ArchiveReady {
        /// Suggested archive file name
        name: String,
        /// Number of entries bundled
        entries: usize,
    },

    /// The run finished with at least one success
    RunComplete {
        /// Items completed
        completed: usize,
        /// Items failed
        errors: usize,
    },

    /// The run finished with zero successes; no archive was produced
    RunFailed {
        /// Error message
        error: String,
    },
}

/// Result of a completed run
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Items that reached `Completed`
    pub completed: usize,

    /// Items that reached `Failed`
    pub errors: usize,

    /// Finalized archive, present only when at least one item succeeded
    pub archive: Option<crate::archive::ArchiveOutput>,

    /// When the run finished
    pub finished_at: DateTime<Utc>,
}
