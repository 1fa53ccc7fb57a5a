//! Error types for cloudscale
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Upload, Transform, Archive, Config)
//! - Context information (file name, URL, attempt count)
//! - A crate-wide [`Result`] alias

use thiserror::Error;

/// Result type alias for cloudscale operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for cloudscale
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "cloud_name")
        key: Option<String>,
    },

    /// Upload step failed for a single item
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),

    /// Transform fetch failed after all retry attempts
    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    /// Archive accumulation or finalization failed
    #[error("archive error: {0}")]
    Archive(#[from] ArchiveError),

    /// A run is already in progress on this engine
    #[error("a run is already active")]
    RunActive,

    /// Selection contained no supported images
    #[error("no supported images found in {0}")]
    NoSources(String),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Upload-step errors
///
/// The remote API reports failures either as a JSON body carrying a vendor
/// message or as a bare non-2xx status. The vendor message is preferred
/// when present.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The API rejected the upload with a vendor-supplied message
    #[error("upload of {name} rejected: {message}")]
    Rejected {
        /// Name of the file whose upload was rejected
        name: String,
        /// Vendor-supplied error message
        message: String,
    },

    /// The API returned a non-success status with no usable error body
    #[error("upload of {name} failed with HTTP {status}")]
    Status {
        /// Name of the file whose upload failed
        name: String,
        /// HTTP status code of the response
        status: u16,
    },

    /// The success response did not contain a processing handle
    #[error("upload response for {name} is missing public_id")]
    MissingHandle {
        /// Name of the file whose response was malformed
        name: String,
    },

    /// The request could not be sent or the response body not read
    #[error("upload of {name} could not be sent: {reason}")]
    Send {
        /// Name of the file whose upload failed to send
        name: String,
        /// Underlying transport error
        reason: String,
    },
}

/// Transform-fetch errors, reported after retries are exhausted
#[derive(Debug, Error)]
pub enum TransformError {
    /// Final attempt returned a non-success status
    #[error("transform fetch of {url} failed with HTTP {status} after {attempts} attempt(s)")]
    Status {
        /// The transform URL that was fetched
        url: String,
        /// HTTP status code of the final response
        status: u16,
        /// Total attempts made
        attempts: u32,
    },

    /// Final attempt errored at the transport level
    #[error("transform fetch of {url} errored after {attempts} attempt(s): {reason}")]
    Request {
        /// The transform URL that was fetched
        url: String,
        /// Underlying transport error
        reason: String,
        /// Total attempts made
        attempts: u32,
    },
}

/// Archive bundling errors
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Writing an entry into the ZIP stream failed
    #[error("failed to write archive entry {name}: {reason}")]
    EntryWrite {
        /// Output name of the entry being written
        name: String,
        /// The reason the write failed
        reason: String,
    },

    /// Finishing the ZIP stream failed
    #[error("failed to finalize archive: {reason}")]
    Finalize {
        /// The reason finalization failed
        reason: String,
    },

    /// Finalization was requested for an archive with no entries
    #[error("archive has no entries")]
    Empty,
}
