//! Producers of catalog records.
//!
//! Two ways a file enters the catalog:
//!
//! 1. **Recording**: a finished microphone capture is moved into the
//!    documents directory and registered under its new path
//! 2. **Pick**: a file chosen in a picker is registered in place
//!
//! ```text
//! recorder ──stop──▶ temp file ──move──▶ documents/ ──┐
//!                                                     ├──▶ CatalogStore::append
//! picker ──────────▶ PickOutcome ─────────────────────┘
//! ```

use std::path::PathBuf;

use thiserror::Error;

use crate::library::{CatalogError, RecordError};

pub mod pick;
pub mod recording;

pub use pick::{register_pick, PickOutcome, PickedFile};
pub use recording::{finalize_recording, move_file};

/// Errors that can occur while registering a captured or picked file
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("File does not exist: {0}")]
    FileMissing(PathBuf),

    #[error("Cannot access {path}: {source}")]
    Access {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record: {0}")]
    Record(#[from] RecordError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
