//! In-memory storage backend.
//!
//! Stands in for the host platform's key-value store. The vault treats the
//! backend as a black box, so tests and embedding hosts can swap in a real
//! adapter without touching the application layer.

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use cs_core::ports::{StorageBackend, StorageError};

#[derive(Default)]
pub struct InMemoryStorage {
    entries: RwLock<HashMap<String, Value>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StorageBackend for InMemoryStorage {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError> {
        let entries = self.entries.read().await;
        Ok(keys
            .iter()
            .filter_map(|key| {
                entries
                    .get(*key)
                    .map(|value| (key.to_string(), value.clone()))
            })
            .collect())
    }

    async fn set(&self, new_entries: HashMap<String, Value>) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        entries.extend(new_entries);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(*key);
        }
        Ok(())
    }

    async fn bytes_in_use(&self) -> Result<u64, StorageError> {
        let entries = self.entries.read().await;
        let mut total = 0u64;
        for (key, value) in entries.iter() {
            let encoded = serde_json::to_string(value)
                .map_err(|e| StorageError::Backend(e.to_string()))?;
            total += (key.len() + encoded.len()) as u64;
        }
        Ok(total)
    }
}
