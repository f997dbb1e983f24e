//! In-memory storage implementation.

use crate::{
    column_families::all_column_families,
    errors::{Result, StorageError},
    traits::{deserialize_value, serialize_key, serialize_value, Storage},
};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

type ColumnFamily = HashMap<Vec<u8>, Vec<u8>>;

/// In-memory storage backed by one hash map per column family
///
/// All mutations go through a single write lock, which makes `take`
/// atomic with respect to every other operation.
pub struct MemoryStorage {
    column_families: RwLock<HashMap<String, ColumnFamily>>,
}

impl MemoryStorage {
    /// Create storage with every known column family
    pub fn new() -> Self {
        Self::with_column_families(all_column_families())
    }

    /// Create storage with an explicit set of column families
    pub fn with_column_families<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let column_families = names
            .into_iter()
            .map(|name| (name.into(), ColumnFamily::new()))
            .collect::<HashMap<_, _>>();

        debug!("Opened in-memory storage with {} column families", column_families.len());

        Self {
            column_families: RwLock::new(column_families),
        }
    }

    /// Number of entries currently held in a column family
    pub async fn len(&self, cf: &str) -> Result<usize> {
        let guard = self.column_families.read().await;
        guard
            .get(cf)
            .map(HashMap::len)
            .ok_or_else(|| StorageError::InvalidColumnFamily(cf.to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_cf(cf: &str) -> StorageError {
    StorageError::InvalidColumnFamily(cf.to_string())
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn get<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned,
    {
        let key_bytes = serialize_key(key)?;
        let guard = self.column_families.read().await;
        let family = guard.get(cf).ok_or_else(|| invalid_cf(cf))?;

        match family.get(&key_bytes) {
            Some(bytes) => Ok(Some(deserialize_value(bytes)?)),
            None => Ok(None),
        }
    }

    async fn put<K, V>(&self, cf: &str, key: &K, value: &V) -> Result<()>
    where
        K: Serialize + Send + Sync,
        V: Serialize + Send + Sync,
    {
        let key_bytes = serialize_key(key)?;
        let value_bytes = serialize_value(value)?;

        let mut guard = self.column_families.write().await;
        let family = guard.get_mut(cf).ok_or_else(|| invalid_cf(cf))?;
        family.insert(key_bytes, value_bytes);

        Ok(())
    }

    async fn delete<K>(&self, cf: &str, key: &K) -> Result<()>
    where
        K: Serialize + Send + Sync,
    {
        let key_bytes = serialize_key(key)?;

        let mut guard = self.column_families.write().await;
        let family = guard.get_mut(cf).ok_or_else(|| invalid_cf(cf))?;
        family.remove(&key_bytes);

        Ok(())
    }

    async fn exists<K>(&self, cf: &str, key: &K) -> Result<bool>
    where
        K: Serialize + Send + Sync,
    {
        let key_bytes = serialize_key(key)?;
        let guard = self.column_families.read().await;
        let family = guard.get(cf).ok_or_else(|| invalid_cf(cf))?;

        Ok(family.contains_key(&key_bytes))
    }

    async fn take<K, V>(&self, cf: &str, key: &K) -> Result<Option<V>>
    where
        K: Serialize + Send + Sync,
        V: DeserializeOwned,
    {
        let key_bytes = serialize_key(key)?;

        let removed = {
            let mut guard = self.column_families.write().await;
            let family = guard.get_mut(cf).ok_or_else(|| invalid_cf(cf))?;
            family.remove(&key_bytes)
        };

        match removed {
            Some(bytes) => Ok(Some(deserialize_value(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn scan_all<V>(&self, cf: &str) -> Result<Vec<(Vec<u8>, V)>>
    where
        V: DeserializeOwned,
    {
        let guard = self.column_families.read().await;
        let family = guard.get(cf).ok_or_else(|| invalid_cf(cf))?;

        family
            .iter()
            .map(|(key, bytes)| Ok((key.clone(), deserialize_value(bytes)?)))
            .collect()
    }
}
