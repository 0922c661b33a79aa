//! Storage port - abstracts the host key-value persistence store.
//!
//! Mirrors the platform extension store: an asynchronous key-value mapping of
//! string keys to JSON values, plus a byte-usage query. The vault only ever
//! touches the four keys in [`keys`].

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Keys the vault persists under. Part of the wire format.
pub mod keys {
    /// 16 random bytes, stored in plaintext as a JSON number array.
    pub const SALT: &str = "salt";
    /// Envelope string sealing the verification sentinel.
    pub const VERIFICATION: &str = "verification";
    /// The collection: an envelope string when encrypted, a raw item array
    /// when not.
    pub const SAVED_DATA: &str = "savedData";
    /// Whether the collection is currently stored encrypted.
    pub const USE_LOCK: &str = "useLock";
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Asynchronous key-value persistence store.
///
/// Reads and writes are assumed to complete or fail outright; no retry or
/// timeout machinery sits at this layer.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Fetch the requested keys. Absent keys are simply missing from the
    /// returned map.
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StorageError>;

    /// Persist every entry of `entries` in one call.
    async fn set(&self, entries: HashMap<String, Value>) -> Result<(), StorageError>;

    /// Remove the given keys. Removing an absent key is not an error.
    async fn remove(&self, keys: &[&str]) -> Result<(), StorageError>;

    /// Bytes currently used by the store.
    async fn bytes_in_use(&self) -> Result<u64, StorageError>;
}
