//! Directory-backed key-value store.
//!
//! Each key is stored as `<dir>/<key>.json`. Writes go to a temporary file
//! in the same directory which is then renamed over the target, so readers
//! only ever see a complete value.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{validate_key, KeyValueStore, StoreError};

/// Key-value store persisted as one file per key
#[derive(Debug, Clone)]
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    /// Create a store rooted at `dir` (created lazily on first write)
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Open the store at the configured location
    pub fn open_default() -> anyhow::Result<Self> {
        Ok(Self::new(crate::config::paths::store_dir()?))
    }

    /// Directory holding the key files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file backing `key`
    pub fn key_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.key_path(key)?;

        match fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;
        fs::create_dir_all(&self.dir).await?;

        let dir = self.dir.clone();
        let value = value.to_owned();
        let target = path.clone();

        // tempfile is blocking; keep it off the async workers
        tokio::task::spawn_blocking(move || -> std::io::Result<()> {
            let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| e.error)?;
            Ok(())
        })
        .await
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))??;

        debug!(path = %path.display(), "stored value");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        let path = self.key_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
