//! The media catalog.
//!
//! # Storage Layout
//!
//! ```text
//! <store_dir>/
//! └── files.json     # JSON array of FileRecord, append order
//! ```
//!
//! Each record points at a media file elsewhere on disk (recordings are
//! moved into the documents directory; picked files keep their own URI).

pub mod catalog;
pub mod kind;
pub mod record;

pub use catalog::{CatalogError, CatalogStore, CATALOG_KEY};
pub use kind::{classify, MediaKind};
pub use record::{guess_media_type, FileRecord, RecordError};
