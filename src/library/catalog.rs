//! Catalog of all recorded and picked files.
//!
//! The whole catalog is one JSON array stored under a single key. Reads
//! deserialize the entire list; appends rewrite the entire list.

use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::record::FileRecord;
use crate::store::{KeyValueStore, StoreError};

/// Storage key holding the catalog
pub const CATALOG_KEY: &str = "files";

/// Errors that can occur reading or writing the catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    StorageRead(#[source] StoreError),

    #[error("Catalog data is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Failed to serialize catalog: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("Failed to write catalog: {0}")]
    StorageWrite(#[source] StoreError),
}

/// Ordered list of [`FileRecord`]s persisted in a key-value store
///
/// Clones share the same append lock, so concurrent appends through any
/// clone never lose an entry.
pub struct CatalogStore<S> {
    store: Arc<S>,
    key: String,
    write_lock: Arc<Mutex<()>>,
}

impl<S> Clone for CatalogStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            key: self.key.clone(),
            write_lock: Arc::clone(&self.write_lock),
        }
    }
}

impl<S: KeyValueStore> CatalogStore<S> {
    /// Create a catalog stored under the default key
    pub fn new(store: S) -> Self {
        Self::with_key(store, CATALOG_KEY)
    }

    /// Create a catalog stored under a custom key
    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store: Arc::new(store),
            key: key.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Storage key in use
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Underlying key-value store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load every record, in append order
    ///
    /// An absent key is an empty catalog; unparseable data is an error.
    pub async fn load(&self) -> Result<Vec<FileRecord>, CatalogError> {
        let raw = self
            .store
            .get(&self.key)
            .await
            .map_err(CatalogError::StorageRead)?;

        match raw {
            None => Ok(Vec::new()),
            Some(raw) => decode(&raw).map_err(|e| {
                warn!(key = %self.key, error = %e, "catalog data is corrupt");
                CatalogError::Corrupt(e)
            }),
        }
    }

    /// Append a record to the end of the catalog
    pub async fn append(&self, record: FileRecord) -> Result<(), CatalogError> {
        let _guard = self.write_lock.lock().await;

        let mut records = self.load().await?;
        records.push(record);

        let raw = serde_json::to_string(&records).map_err(CatalogError::Serialize)?;
        self.store
            .set(&self.key, &raw)
            .await
            .map_err(CatalogError::StorageWrite)?;

        debug!(key = %self.key, count = records.len(), "appended catalog record");
        Ok(())
    }

    /// Number of stored records
    pub async fn len(&self) -> Result<usize, CatalogError> {
        Ok(self.load().await?.len())
    }

    /// Check if the catalog has no records
    pub async fn is_empty(&self) -> Result<bool, CatalogError> {
        Ok(self.len().await? == 0)
    }

    /// Find a record by its ID (first match wins; IDs are not unique)
    pub async fn find(&self, id: &str) -> Result<Option<FileRecord>, CatalogError> {
        Ok(self.load().await?.into_iter().find(|r| r.id == id))
    }
}

/// Decode a stored blob
///
/// A JSON `null` is what some storage layers return for an unset key, so it
/// reads as empty rather than corrupt.
fn decode(raw: &str) -> Result<Vec<FileRecord>, serde_json::Error> {
    let value: Value = serde_json::from_str(raw)?;
    if value.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(value)
}
