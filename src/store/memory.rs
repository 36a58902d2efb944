//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::{validate_key, KeyValueStore, StoreError};

/// Shared in-process map; clones see the same data
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing key validation (useful for corrupt fixtures)
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().insert(key.into(), value.into());
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still a valid map
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        Ok(self.lock().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        self.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clones_share_entries() {
        let store = MemoryKvStore::new();
        let other = store.clone();

        store.set("files", "[]").await.unwrap();
        assert_eq!(other.get("files").await.unwrap().as_deref(), Some("[]"));

        other.remove("files").await.unwrap();
        assert_eq!(store.get("files").await.unwrap(), None);
    }
}
