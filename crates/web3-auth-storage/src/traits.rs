//! Storage trait definitions.

use crate::errors::{Result, StorageError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

/// Storage interface for key-value operations
///
/// Implementations are provided by the host (database, cache server, ...).
/// Every method is addressed by column family and key.
///
/// `take` MUST be atomic: when several tasks call it concurrently for the
/// same key, at most one of them observes `Some`. Nonce single-use relies
/// on this.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Get a value by key from a column family
    ///
    /// # Returns
    ///
    /// `Ok(Some(value))` if key exists, `Ok(None)` if not found
    async fn get<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned;

    /// Put a key-value pair into a column family
    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync;

    /// Delete a key from a column family
    async fn delete<K>(&self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize + Send + Sync;

    /// Check if a key exists in a column family
    async fn exists<K>(&self, cf: &str, key: &K) -> Result<bool>
    where
        K: Serialize + Send + Sync;

    /// Atomically read and delete a key
    ///
    /// Returns the value that was stored, or `None` if the key was absent
    /// (including when a concurrent `take` won the race).
    async fn take<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned;

    /// Scan all entries in a column family
    ///
    /// Keys are returned in their serialized form; see [`deserialize_key`].
    async fn scan_all<V>(&self, cf: &str) -> Result<Vec<(Vec<u8>, V)>>
    where
        V: DeserializeOwned;
}

/// Helper function to serialize a key
pub fn serialize_key<K: Serialize>(key: &K) -> Result<Vec<u8>> {
    bincode::serialize(key).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Helper function to deserialize a key returned by `scan_all`
pub fn deserialize_key<K: DeserializeOwned>(bytes: &[u8]) -> Result<K> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Deserialization(e.to_string()))
}

/// Helper function to serialize a value
pub fn serialize_value<V: Serialize>(value: &V) -> Result<Vec<u8>> {
    bincode::serialize(value).map_err(|e| StorageError::Serialization(e.to_string()))
}

/// Helper function to deserialize a value
pub fn deserialize_value<V: DeserializeOwned>(bytes: &[u8]) -> Result<V> {
    bincode::deserialize(bytes).map_err(|e| StorageError::Deserialization(e.to_string()))
}
