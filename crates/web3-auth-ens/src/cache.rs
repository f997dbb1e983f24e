//! TTL cache for ENS lookups on top of the storage contract.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use web3_auth_storage::{
    column_families::{CF_ENS_FORWARD, CF_ENS_REVERSE},
    Result, Storage,
};

/// Outcome of a lookup worth remembering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CachedLookup<T> {
    /// A record was found
    Found(T),
    /// The chain confirmed there is no record
    Absent,
}

impl<T> CachedLookup<T> {
    /// Collapse into an `Option`
    pub fn into_option(self) -> Option<T> {
        match self {
            CachedLookup::Found(value) => Some(value),
            CachedLookup::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for CachedLookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => CachedLookup::Found(value),
            None => CachedLookup::Absent,
        }
    }
}

/// Stored cache entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// Cached outcome
    pub lookup: CachedLookup<T>,
    /// When the entry was written
    pub cached_at: u64,
    /// Entry is stale at or after this timestamp
    pub expires_at: u64,
}

impl<T> CacheEntry<T> {
    /// Check if entry is still valid
    pub fn is_valid(&self, now: u64) -> bool {
        now < self.expires_at
    }
}

/// Forward (`name -> address`) and reverse (`address -> name`) caches
///
/// Keys are expected to be normalized by the caller: lowercase names and
/// lowercase `0x` addresses. Expired entries read as misses and are
/// removed lazily.
pub struct EnsCache<S: Storage> {
    storage: Arc<S>,
    ttl: u64,
    negative_ttl: u64,
}

impl<S: Storage> EnsCache<S> {
    /// Create a cache with separate TTLs for found and absent records
    pub fn new(storage: Arc<S>, ttl: u64, negative_ttl: u64) -> Self {
        Self {
            storage,
            ttl,
            negative_ttl,
        }
    }

    /// Cached forward lookup for a normalized name
    pub async fn get_forward(&self, name: &str, now: u64) -> Result<Option<CachedLookup<String>>> {
        self.get(CF_ENS_FORWARD, name, now).await
    }

    /// Remember a forward lookup
    pub async fn put_forward(&self, name: &str, address: Option<String>, now: u64) -> Result<()> {
        self.put(CF_ENS_FORWARD, name, address, now).await
    }

    /// Cached reverse lookup for a normalized address
    pub async fn get_reverse(&self, address: &str, now: u64) -> Result<Option<CachedLookup<String>>> {
        self.get(CF_ENS_REVERSE, address, now).await
    }

    /// Remember a reverse lookup
    pub async fn put_reverse(&self, address: &str, name: Option<String>, now: u64) -> Result<()> {
        self.put(CF_ENS_REVERSE, address, name, now).await
    }

    /// Remove a forward entry, returning what it held
    pub async fn take_forward(&self, name: &str) -> Result<Option<CachedLookup<String>>> {
        let entry: Option<CacheEntry<String>> = self.storage.take(CF_ENS_FORWARD, &name).await?;
        Ok(entry.map(|e| e.lookup))
    }

    /// Remove a reverse entry, returning what it held
    pub async fn take_reverse(&self, address: &str) -> Result<Option<CachedLookup<String>>> {
        let entry: Option<CacheEntry<String>> = self.storage.take(CF_ENS_REVERSE, &address).await?;
        Ok(entry.map(|e| e.lookup))
    }

    async fn get<T>(&self, cf: &str, key: &str, now: u64) -> Result<Option<CachedLookup<T>>>
    where
        T: DeserializeOwned,
    {
        let entry: Option<CacheEntry<T>> = self.storage.get(cf, &key).await?;

        match entry {
            Some(entry) if entry.is_valid(now) => {
                debug!(cf, key, "ENS cache hit");
                Ok(Some(entry.lookup))
            }
            Some(_) => {
                debug!(cf, key, "ENS cache entry expired");
                self.storage.delete(cf, &key).await?;
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put<T>(&self, cf: &str, key: &str, value: Option<T>, now: u64) -> Result<()>
    where
        T: Serialize + Send + Sync,
    {
        let ttl = if value.is_some() {
            self.ttl
        } else {
            self.negative_ttl
        };

        let entry = CacheEntry {
            lookup: CachedLookup::from(value),
            cached_at: now,
            expires_at: now.saturating_add(ttl),
        };

        self.storage.put(cf, &key, &entry).await
    }
}
