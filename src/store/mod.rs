//! Local key-value storage.
//!
//! The catalog lives in a single string value under a single key, the same
//! way a mobile app keeps state in its on-device async storage. Two
//! backends are provided:
//!
//! - [`FileKvStore`]: one JSON file per key under a directory
//! - [`MemoryKvStore`]: in-process map, used by tests and embedders

use async_trait::async_trait;
use thiserror::Error;

pub mod file;
pub mod memory;

pub use file::FileKvStore;
pub use memory::MemoryKvStore;

/// Errors raised by a key-value backend
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),
}

/// String-valued key-value store
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`, `None` if absent
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete `key`; deleting an absent key is not an error
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Keys become file names, so keep them to a conservative alphabet
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
        && !key.starts_with('.');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}
