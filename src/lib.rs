//! mediashelf - On-device media catalog
//!
//! Keeps a catalog of recorded and uploaded media files in a local
//! key-value store and routes each entry to the viewer that can show it.
//!
//! # Architecture
//!
//! - The catalog is one JSON array under the `"files"` key
//! - Every read loads the whole list; every append rewrites it
//! - Appends are serialized in-process so concurrent writers never drop
//!   each other's entries
//!
//! # Modules
//!
//! - `store`: Key-value backends (file-per-key, in-memory)
//! - `library`: FileRecord, CatalogStore, media classification
//! - `capture`: Recording finalization and picked-file registration
//! - `viewer`: Record → viewer routing
//! - `config`: Path resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Save a finished recording
//! mediashelf record /tmp/recording-1700000000.m4a
//!
//! # Upload a picked file
//! mediashelf upload ~/Pictures/cat.png
//!
//! # Browse and open
//! mediashelf list --kind audio
//! mediashelf view '#1'
//! ```

pub mod capture;
pub mod cli;
pub mod config;
pub mod library;
pub mod store;
pub mod viewer;

// Re-export main types at crate root for convenience
pub use capture::{finalize_recording, register_pick, CaptureError, PickOutcome, PickedFile};
pub use library::{classify, CatalogError, CatalogStore, FileRecord, MediaKind, RecordError};
pub use store::{FileKvStore, KeyValueStore, MemoryKvStore, StoreError};
pub use viewer::{ViewError, Viewer};
