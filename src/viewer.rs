//! Routing catalog records to a viewer.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::library::{classify, FileRecord, MediaKind};

/// Terminal states when a record cannot be shown
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ViewError {
    #[error("Unsupported file type: {0}")]
    UnsupportedMedia(String),

    #[error("File does not exist: {0}")]
    FileMissing(PathBuf),
}

/// A record resolved to a playable or displayable file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub kind: MediaKind,
    pub path: PathBuf,
    pub record: FileRecord,
}

/// Resolve a record to the viewer that should show it
pub fn open(record: &FileRecord) -> Result<Viewer, ViewError> {
    let kind = classify(&record.uri);
    if kind == MediaKind::Unsupported {
        return Err(ViewError::UnsupportedMedia(record.uri.clone()));
    }

    let path = resolve_path(&record.uri);
    if !path.exists() {
        warn!(uri = %record.uri, "catalog entry points at a missing file");
        return Err(ViewError::FileMissing(path));
    }

    Ok(Viewer {
        kind,
        path,
        record: record.clone(),
    })
}

/// Turn a stored URI into a filesystem path
///
/// Strips a `file://` scheme and decodes `%XX` escapes.
pub fn resolve_path(uri: &str) -> PathBuf {
    let stripped = uri.strip_prefix("file://").unwrap_or(uri);
    PathBuf::from(percent_decode(stripped))
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(b) = decoded {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8(out).unwrap_or_else(|_| input.to_string())
}

impl Viewer {
    pub fn path(&self) -> &Path {
        &self.path
    }
}
