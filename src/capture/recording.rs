//! Finalizing microphone recordings.

use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;
use tracing::{debug, info, warn};

use super::CaptureError;
use crate::library::{guess_media_type, CatalogStore, FileRecord};
use crate::store::KeyValueStore;

/// Move a finished recording into `documents_dir` and catalog it
///
/// The recording keeps its file name unless a file of that name is already
/// in `documents_dir`, in which case a timestamp suffix is added. Nothing is
/// appended when the source file is missing or the move fails.
pub async fn finalize_recording<S: KeyValueStore>(
    catalog: &CatalogStore<S>,
    source: &Path,
    documents_dir: &Path,
) -> Result<FileRecord, CaptureError> {
    if !path_exists(source).await? {
        warn!(path = %source.display(), "recording does not exist");
        return Err(CaptureError::FileMissing(source.to_path_buf()));
    }

    let preferred = destination_for(source, documents_dir)
        .ok_or_else(|| CaptureError::FileMissing(source.to_path_buf()))?;
    let destination = free_destination(preferred).await?;
    let file_name = destination
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    move_file(source, &destination).await?;

    let uri = destination.to_string_lossy().into_owned();
    let record = FileRecord::new(&file_name, uri, guess_media_type(&file_name))?;
    catalog.append(record.clone()).await?;

    info!(name = %record.name, uri = %record.uri, "recording saved");
    Ok(record)
}

/// Move `from` to `to`, creating the destination directory
///
/// Falls back to copy and delete only when a rename crosses filesystems.
pub async fn move_file(from: &Path, to: &Path) -> Result<(), CaptureError> {
    let move_err = |source: io::Error| CaptureError::Move {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).await.map_err(move_err)?;
    }

    match fs::rename(from, to).await {
        Ok(()) => {
            debug!(from = %from.display(), to = %to.display(), "moved file");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(CaptureError::FileMissing(from.to_path_buf()))
        }
        Err(e) if is_cross_device(&e) => {
            debug!(error = %e, "rename crosses filesystems, copying instead");
            fs::copy(from, to).await.map_err(move_err)?;
            if let Err(e) = fs::remove_file(from).await {
                // Leave exactly one copy behind
                if let Err(cleanup) = fs::remove_file(to).await {
                    warn!(path = %to.display(), error = %cleanup, "failed to remove partial copy");
                }
                return Err(move_err(e));
            }
            Ok(())
        }
        Err(e) => Err(move_err(e)),
    }
}

/// Destination a recording would be moved to
pub fn destination_for(source: &Path, documents_dir: &Path) -> Option<PathBuf> {
    source.file_name().map(|name| documents_dir.join(name))
}

/// `preferred`, or a timestamp-suffixed sibling when it is taken
async fn free_destination(preferred: PathBuf) -> Result<PathBuf, CaptureError> {
    if !path_exists(&preferred).await? {
        return Ok(preferred);
    }

    let stamp = Utc::now().timestamp_millis();
    let mut attempt = 0u32;
    loop {
        let candidate = suffixed(&preferred, stamp, attempt);
        if !path_exists(&candidate).await? {
            debug!(path = %candidate.display(), "destination taken, using suffixed name");
            return Ok(candidate);
        }
        attempt += 1;
    }
}

/// `dir/stem-<stamp>[-<attempt>].ext`
fn suffixed(path: &Path, stamp: i64, attempt: u32) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = if attempt == 0 {
        format!("{}-{}", stem, stamp)
    } else {
        format!("{}-{}-{}", stem, stamp, attempt)
    };
    if let Some(ext) = path.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    path.with_file_name(name)
}

async fn path_exists(path: &Path) -> Result<bool, CaptureError> {
    fs::try_exists(path)
        .await
        .map_err(|source| CaptureError::Access {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(unix)]
fn is_cross_device(e: &io::Error) -> bool {
    // EXDEV
    e.raw_os_error() == Some(18)
}

#[cfg(not(unix))]
fn is_cross_device(e: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    e.raw_os_error() == Some(17)
}
