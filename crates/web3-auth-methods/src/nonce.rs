//! Nonce issuance and single-use consumption.

use crate::{
    errors::{AuthError, Result},
    types::NonceRecord,
};
use rand::RngCore;
use std::sync::Arc;
use tracing::{debug, info, warn};
use web3_auth_crypto::{addresses_equal, is_valid_address, Clock};
use web3_auth_storage::{column_families::CF_NONCES, traits::deserialize_key, Storage};

/// Default nonce lifetime in seconds (5 minutes)
pub const DEFAULT_NONCE_LIFETIME_SECONDS: u64 = 300;

/// Bytes of OS entropy per nonce
pub const NONCE_ENTROPY_BYTES: usize = 32;

/// Nonce configuration
#[derive(Debug, Clone)]
pub struct NonceConfig {
    /// Maximum age of a nonce, in seconds
    pub lifetime_seconds: u64,
}

impl Default for NonceConfig {
    fn default() -> Self {
        Self {
            lifetime_seconds: DEFAULT_NONCE_LIFETIME_SECONDS,
        }
    }
}

/// Generate a random nonce token
///
/// 32 bytes from the OS-seeded RNG, hex encoded. Hex is URL-safe and
/// satisfies the EIP-4361 alphanumeric nonce grammar.
pub fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_ENTROPY_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Address-bound, single-use nonce store
pub struct NonceStore<S: Storage> {
    storage: Arc<S>,
    config: NonceConfig,
    clock: Arc<dyn Clock>,
}

impl<S: Storage> NonceStore<S> {
    /// Create a nonce store
    pub fn new(storage: Arc<S>, config: NonceConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            storage,
            config,
            clock,
        }
    }

    /// Configured lifetime in seconds
    pub fn lifetime_seconds(&self) -> u64 {
        self.config.lifetime_seconds
    }

    /// Issue a nonce bound to `claimed_address`
    pub async fn issue(&self, claimed_address: &str) -> Result<String> {
        if !is_valid_address(claimed_address) {
            return Err(AuthError::InvalidAddress(claimed_address.to_string()));
        }

        let nonce = generate_nonce();
        let record = NonceRecord {
            address: claimed_address.to_ascii_lowercase(),
            issued_at: self.clock.now(),
        };

        self.storage.put(CF_NONCES, &nonce, &record).await?;

        info!(address = %record.address, "Issued sign-in nonce");
        Ok(nonce)
    }

    /// Validate a nonce and consume it
    ///
    /// The record is removed before any check runs, so a nonce never
    /// survives its first validation attempt whatever the outcome.
    pub async fn validate_and_consume(
        &self,
        nonce: &str,
        claimed_address: &str,
        now: u64,
    ) -> Result<bool> {
        let record: Option<NonceRecord> = self.storage.take(CF_NONCES, &nonce).await?;

        let Some(record) = record else {
            warn!("Nonce not found or already used");
            return Ok(false);
        };

        let age = now.saturating_sub(record.issued_at);
        if age > self.config.lifetime_seconds {
            warn!(age, lifetime = self.config.lifetime_seconds, "Nonce expired");
            return Ok(false);
        }

        if !addresses_equal(&record.address, claimed_address) {
            warn!(
                issued_to = %record.address,
                claimed = %claimed_address,
                "Nonce presented for a different address"
            );
            return Ok(false);
        }

        debug!(address = %record.address, "Nonce consumed");
        Ok(true)
    }

    /// Delete nonces older than the lifetime that were never presented
    ///
    /// Returns the number of records removed. Hosts whose storage has no
    /// native TTL should run this periodically.
    pub async fn purge_expired(&self, now: u64) -> Result<usize> {
        let entries: Vec<(Vec<u8>, NonceRecord)> = self.storage.scan_all(CF_NONCES).await?;

        let mut purged = 0;
        for (key, record) in entries {
            if now.saturating_sub(record.issued_at) <= self.config.lifetime_seconds {
                continue;
            }
            let nonce: String = deserialize_key(&key)?;
            self.storage.delete(CF_NONCES, &nonce).await?;
            purged += 1;
        }

        if purged > 0 {
            info!(purged, "Purged expired nonces");
        }
        Ok(purged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use web3_auth_crypto::ManualClock;
    use web3_auth_storage::MemoryStorage;

    const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn store(clock: Arc<ManualClock>) -> (NonceStore<MemoryStorage>, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let store = NonceStore::new(Arc::clone(&storage), NonceConfig::default(), clock);
        (store, storage)
    }

    #[test]
    fn test_generate_nonce_format() {
        let nonce = generate_nonce();
        assert_eq!(nonce.len(), NONCE_ENTROPY_BYTES * 2);
        assert!(nonce.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(nonce, generate_nonce());
    }

    #[tokio::test]
    async fn test_issue_rejects_bad_address() {
        let (store, _) = store(Arc::new(ManualClock::new(0)));
        let result = store.issue("0xF39Fd6e51aad88F6F4ce6aB8827279cffFb92266").await;
        assert!(matches!(result, Err(AuthError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_nonce_is_single_use() {
        let (store, storage) = store(Arc::new(ManualClock::new(1000)));
        let nonce = store.issue(ADDRESS).await.unwrap();
        assert_eq!(storage.len(CF_NONCES).await.unwrap(), 1);

        assert!(store.validate_and_consume(&nonce, ADDRESS, 1001).await.unwrap());
        assert!(!store.validate_and_consume(&nonce, ADDRESS, 1002).await.unwrap());
        assert_eq!(storage.len(CF_NONCES).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_address_compared_case_insensitively() {
        let (store, _) = store(Arc::new(ManualClock::new(1000)));
        let nonce = store.issue(ADDRESS).await.unwrap();

        assert!(store
            .validate_and_consume(&nonce, &ADDRESS.to_lowercase(), 1000)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let lifetime = DEFAULT_NONCE_LIFETIME_SECONDS;
        let (store, storage) = store(Arc::new(ManualClock::new(1000)));

        let early = store.issue(ADDRESS).await.unwrap();
        assert!(store.validate_and_consume(&early, ADDRESS, 1000 + lifetime - 1).await.unwrap());

        let exact = store.issue(ADDRESS).await.unwrap();
        assert!(store.validate_and_consume(&exact, ADDRESS, 1000 + lifetime).await.unwrap());

        let late = store.issue(ADDRESS).await.unwrap();
        assert!(!store.validate_and_consume(&late, ADDRESS, 1000 + lifetime + 1).await.unwrap());
        assert_eq!(storage.len(CF_NONCES).await.unwrap(), 0, "expired nonce must be deleted");
    }

    #[tokio::test]
    async fn test_wrong_address_consumes_nonce() {
        let (store, _) = store(Arc::new(ManualClock::new(1000)));
        let nonce = store.issue(ADDRESS).await.unwrap();

        let other = "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf";
        assert!(!store.validate_and_consume(&nonce, other, 1000).await.unwrap());
        assert!(!store.validate_and_consume(&nonce, ADDRESS, 1000).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_nonce() {
        let (store, _) = store(Arc::new(ManualClock::new(1000)));
        assert!(!store.validate_and_consume("deadbeefdeadbeef", ADDRESS, 1000).await.unwrap());
    }

    #[tokio::test]
    async fn test_purge_expired_keeps_live_nonces() {
        let lifetime = DEFAULT_NONCE_LIFETIME_SECONDS;
        let clock = Arc::new(ManualClock::new(1000));
        let (store, storage) = store(Arc::clone(&clock));

        let stale = store.issue(ADDRESS).await.unwrap();
        clock.set(1000 + lifetime);
        let fresh = store.issue(ADDRESS).await.unwrap();

        // the stale nonce is exactly at its lifetime and still valid
        assert_eq!(store.purge_expired(1000 + lifetime).await.unwrap(), 0);

        assert_eq!(store.purge_expired(1000 + lifetime + 1).await.unwrap(), 1);
        assert_eq!(storage.len(CF_NONCES).await.unwrap(), 1);
        assert!(!store.validate_and_consume(&stale, ADDRESS, 1000 + lifetime + 1).await.unwrap());
        assert!(store.validate_and_consume(&fresh, ADDRESS, 1000 + lifetime + 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_issue_uses_clock() {
        let clock = Arc::new(ManualClock::new(5000));
        let (store, storage) = store(Arc::clone(&clock));
        let nonce = store.issue(ADDRESS).await.unwrap();

        let record: Option<NonceRecord> = storage.get(CF_NONCES, &nonce.as_str()).await.unwrap();
        let record = record.unwrap();
        assert_eq!(record.issued_at, 5000);
        assert_eq!(record.address, ADDRESS.to_lowercase());
    }
}
