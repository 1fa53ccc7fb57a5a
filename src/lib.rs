//! # cloudscale
//!
//! Batch image upscaling backend library for Cloudinary-style media APIs.
//!
//! ## Design Philosophy
//!
//! cloudscale is designed to be:
//! - **Library-first** - No CLI or UI, purely a Rust crate for embedding
//! - **Event-driven** - Consumers subscribe to events, no polling required
//! - **Failure-isolating** - One item's failure never aborts its siblings
//! - **Sensible defaults** - The vendor endpoints and pacing constants work
//!   out of the box; only the account credentials are required
//!
//! A run uploads every selected image to the remote API, fetches the
//! upscaled rendition through a derived transform URL (with bounded
//! retries), and bundles the results into a single ZIP archive. Items are
//! processed in sequential windows of a configurable, capped concurrency.
//!
//! ## Quick Start
//!
//! ```no_run
//! use cloudscale::{BatchUpscaler, Config, scan_folder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::new("my-cloud", "my-unsigned-preset");
//!     let engine = BatchUpscaler::new(config)?;
//!
//!     // Subscribe to events
//!     let mut events = engine.subscribe();
//!     tokio::spawn(async move {
//!         while let Ok(event) = events.recv().await {
//!             println!("Event: {:?}", event);
//!         }
//!     });
//!
//!     let selection = scan_folder("./holiday_pics")?;
//!     let report = engine.run(selection).await?;
//!     if let Some(archive) = &report.archive {
//!         archive.write_to(".")?;
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Archive accumulation and finalization
pub mod archive;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Retry-wrapped fetch
pub mod retry;
/// Source selection (folder scanning, MIME allow-list)
pub mod source;
/// Core types and events
pub mod types;
/// Remote upload client
pub mod upload;
/// Batch upscaling engine (decomposed into focused submodules)
pub mod upscaler;
/// Utility functions
pub mod utils;

// Re-export commonly used types
pub use archive::{ArchiveBuilder, ArchiveOutput, archive_name};
pub use config::{ArchiveConfig, Config, EndpointConfig, PacingConfig, RetryConfig};
pub use error::{ArchiveError, Error, Result, TransformError, UploadError};
pub use source::{ALLOWED_MIME, Selection, scan_folder};
pub use types::{BatchStats, Event, ItemState, RunReport, SourceFile};
pub use upload::UploadClient;
pub use upscaler::BatchUpscaler;
