//! Forward and reverse ENS resolution.

use crate::{
    abi::{decode_address, decode_string, encode_call, ADDR_SELECTOR, NAME_SELECTOR, RESOLVER_SELECTOR},
    cache::{CachedLookup, EnsCache},
    errors::{AbiError, Result},
    namehash::{namehash, normalize_name, reverse_name},
    rpc::RpcClient,
    transport::HttpTransport,
};
use std::sync::Arc;
use tracing::{debug, info, warn};
use web3_auth_crypto::{
    addresses_equal, decode_hex_prefixed, encode_hex_prefixed, is_zero_address, normalize_address,
    Clock, ADDRESS_SIZE, HASH_SIZE,
};
use web3_auth_storage::Storage;

/// ENS registry deployed on mainnet and the public testnets
pub const MAINNET_ENS_REGISTRY: &str = "0x00000000000C2E074eC69A0dFb2997BA6C7d2e1e";

/// Default TTL for found records
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 3600;

/// Default TTL for confirmed absence
pub const DEFAULT_NEGATIVE_CACHE_TTL_SECONDS: u64 = 300;

/// Resolver configuration
#[derive(Debug, Clone)]
pub struct EnsConfig {
    /// ENS registry contract
    pub registry_address: String,
    /// TTL for found records, in seconds
    pub cache_ttl: u64,
    /// TTL for confirmed absence, in seconds
    pub negative_cache_ttl: u64,
}

impl Default for EnsConfig {
    fn default() -> Self {
        Self {
            registry_address: MAINNET_ENS_REGISTRY.to_string(),
            cache_ttl: DEFAULT_CACHE_TTL_SECONDS,
            negative_cache_ttl: DEFAULT_NEGATIVE_CACHE_TTL_SECONDS,
        }
    }
}

/// ENS resolver over JSON-RPC with a storage-backed cache
pub struct EnsResolver<S: Storage, T: HttpTransport> {
    rpc: RpcClient<T>,
    cache: EnsCache<S>,
    registry: String,
    clock: Arc<dyn Clock>,
}

impl<S: Storage, T: HttpTransport> EnsResolver<S, T> {
    /// Create a resolver
    pub fn new(config: EnsConfig, rpc: RpcClient<T>, storage: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            rpc,
            cache: EnsCache::new(storage, config.cache_ttl, config.negative_cache_ttl),
            registry: config.registry_address,
            clock,
        }
    }

    /// Resolve a name to its address
    ///
    /// Returns the lowercase `0x` address, or `None` when the name has no
    /// resolver or no address record. RPC and decode failures are errors
    /// and are never cached.
    pub async fn resolve_forward(&self, name: &str) -> Result<Option<String>> {
        let Some(name) = normalize_name(name) else {
            debug!("Skipping forward resolution of malformed name");
            return Ok(None);
        };

        let now = self.clock.now();
        if let Some(hit) = self.cache.get_forward(&name, now).await? {
            return Ok(hit.into_option());
        }

        let address = self.lookup_address(&name).await?;
        self.cache.put_forward(&name, address.clone(), now).await?;

        Ok(address)
    }

    /// Resolve an address to its primary name
    ///
    /// The name returned by the reverse record is only trusted when it
    /// resolves forward to the same address. A failed check yields `None`
    /// and is not cached.
    pub async fn resolve_reverse(&self, address: &str) -> Result<Option<String>> {
        let address = normalize_address(address)?;

        let now = self.clock.now();
        if let Some(hit) = self.cache.get_reverse(&address, now).await? {
            return Ok(hit.into_option());
        }

        let Some(name) = self.lookup_name(&address).await? else {
            self.cache.put_reverse(&address, None, now).await?;
            return Ok(None);
        };

        match self.resolve_forward(&name).await? {
            Some(forward) if addresses_equal(&forward, &address) => {
                info!(address = %address, name = %name, "Reverse record verified");
                self.cache.put_reverse(&address, Some(name.clone()), now).await?;
                Ok(Some(name))
            }
            forward => {
                warn!(
                    address = %address,
                    claimed_name = %name,
                    forward = ?forward,
                    "Reverse record does not resolve back to address"
                );
                Ok(None)
            }
        }
    }

    /// Drop cached entries for a name or an address
    ///
    /// Also drops the linked entry on the other side, so clearing an
    /// address clears its cached primary name's forward record and vice
    /// versa.
    pub async fn clear_cache(&self, identifier: &str) -> Result<()> {
        if let Ok(address) = normalize_address(identifier) {
            if let Some(CachedLookup::Found(name)) = self.cache.take_reverse(&address).await? {
                self.cache.take_forward(&name).await?;
            }
            debug!(address = %address, "Cleared ENS cache");
            return Ok(());
        }

        if let Some(name) = normalize_name(identifier) {
            if let Some(CachedLookup::Found(address)) = self.cache.take_forward(&name).await? {
                self.cache.take_reverse(&address).await?;
            }
            debug!(name = %name, "Cleared ENS cache");
        }

        Ok(())
    }

    async fn lookup_address(&self, name: &str) -> Result<Option<String>> {
        let node = namehash(name);
        let Some(resolver) = self.resolver_of(&node).await? else {
            debug!(name, "No resolver set");
            return Ok(None);
        };

        let data = self.eth_call(&resolver, encode_call(ADDR_SELECTOR, &[node])).await?;
        if data.is_empty() {
            return Ok(None);
        }

        let address = decode_address(&data)?;
        if is_zero_address(&address) {
            return Ok(None);
        }

        Ok(Some(encode_hex_prefixed(&address)))
    }

    async fn lookup_name(&self, address: &str) -> Result<Option<String>> {
        let node = namehash(&reverse_name(address));
        let Some(resolver) = self.resolver_of(&node).await? else {
            debug!(address, "No reverse resolver set");
            return Ok(None);
        };

        let data = self.eth_call(&resolver, encode_call(NAME_SELECTOR, &[node])).await?;
        if data.is_empty() {
            return Ok(None);
        }

        let name = decode_string(&data)?;
        if name.is_empty() {
            return Ok(None);
        }

        Ok(Some(name))
    }

    /// Resolver contract for `node` from the registry, `None` if unset
    async fn resolver_of(&self, node: &[u8; HASH_SIZE]) -> Result<Option<String>> {
        let data = self
            .eth_call(&self.registry, encode_call(RESOLVER_SELECTOR, &[*node]))
            .await?;
        if data.is_empty() {
            return Ok(None);
        }

        let resolver: [u8; ADDRESS_SIZE] = decode_address(&data)?;
        if is_zero_address(&resolver) {
            return Ok(None);
        }

        Ok(Some(encode_hex_prefixed(&resolver)))
    }

    async fn eth_call(&self, to: &str, data: Vec<u8>) -> Result<Vec<u8>> {
        let raw = self.rpc.call(to, &data).await?;
        let bytes = decode_hex_prefixed(&raw).map_err(|e| AbiError::DecodeError(e.to_string()))?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{EnsError, RpcError, TransportError};
    use crate::rpc::RpcConfig;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;
    use web3_auth_crypto::ManualClock;
    use web3_auth_storage::MemoryStorage;

    const PROVIDER: &str = "https://rpc.example";
    const RESOLVER: &str = "0x4976fb03c32e5b8cfe2b6ccb31c09ba78ebaba41";
    const VITALIK: &str = "0xd8da6bf26964af9d7eed9e03e53415d37aa96045";
    const MALLORY: &str = "0x1111111111111111111111111111111111111111";

    /// Fake chain answering `eth_call` from in-memory ENS records
    #[derive(Default)]
    struct FakeChain {
        resolvers: HashMap<[u8; 32], String>,
        addrs: HashMap<[u8; 32], String>,
        names: HashMap<[u8; 32], String>,
        failing: bool,
        calls: Mutex<usize>,
    }

    impl FakeChain {
        fn with_address(mut self, name: &str, address: &str) -> Self {
            let node = namehash(name);
            self.resolvers.insert(node, RESOLVER.to_string());
            self.addrs.insert(node, address.to_string());
            self
        }

        fn with_reverse(mut self, address: &str, name: &str) -> Self {
            let node = namehash(&reverse_name(address));
            self.resolvers.insert(node, RESOLVER.to_string());
            self.names.insert(node, name.to_string());
            self
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }

        fn answer(&self, to: &str, data: &[u8]) -> String {
            let mut node = [0u8; 32];
            node.copy_from_slice(&data[4..36]);
            let selector = [data[0], data[1], data[2], data[3]];

            let word_for = |address: Option<&String>| {
                let mut word = [0u8; 32];
                if let Some(address) = address {
                    word[12..].copy_from_slice(&decode_hex_prefixed(address).unwrap());
                }
                encode_hex_prefixed(&word)
            };

            if selector == RESOLVER_SELECTOR {
                assert!(addresses_equal(to, MAINNET_ENS_REGISTRY));
                word_for(self.resolvers.get(&node))
            } else if selector == ADDR_SELECTOR {
                word_for(self.addrs.get(&node))
            } else if selector == NAME_SELECTOR {
                let name = self.names.get(&node).cloned().unwrap_or_default();
                let mut out = Vec::new();
                let mut offset = [0u8; 32];
                offset[31] = 32;
                let mut length = [0u8; 32];
                length[31] = name.len() as u8;
                out.extend_from_slice(&offset);
                out.extend_from_slice(&length);
                out.extend_from_slice(name.as_bytes());
                out.resize(64 + name.len().div_ceil(32) * 32, 0);
                encode_hex_prefixed(&out)
            } else {
                panic!("unexpected selector {:?}", selector);
            }
        }
    }

    #[async_trait]
    impl HttpTransport for FakeChain {
        async fn post_json(
            &self,
            _url: &str,
            body: &Value,
            _timeout: Duration,
        ) -> std::result::Result<Value, TransportError> {
            *self.calls.lock().unwrap() += 1;
            if self.failing {
                return Err(TransportError::Status(503));
            }

            let call = &body["params"][0];
            let to = call["to"].as_str().unwrap();
            let data = decode_hex_prefixed(call["data"].as_str().unwrap()).unwrap();
            Ok(json!({ "jsonrpc": "2.0", "id": body["id"].clone(), "result": self.answer(to, &data) }))
        }
    }

    struct Harness {
        resolver: EnsResolver<MemoryStorage, FakeChain>,
        chain: Arc<FakeChain>,
        clock: Arc<ManualClock>,
    }

    fn harness(chain: FakeChain) -> Harness {
        let chain = Arc::new(chain);
        let clock = Arc::new(ManualClock::new(1_000));
        let rpc = RpcClient::new(RpcConfig::new(vec![PROVIDER.to_string()]), Arc::clone(&chain)).unwrap();
        let resolver = EnsResolver::new(
            EnsConfig::default(),
            rpc,
            Arc::new(MemoryStorage::new()),
            clock.clone(),
        );
        Harness {
            resolver,
            chain,
            clock,
        }
    }

    #[tokio::test]
    async fn test_forward_resolution() {
        let h = harness(FakeChain::default().with_address("vitalik.eth", VITALIK));

        assert_eq!(
            h.resolver.resolve_forward("Vitalik.eth").await.unwrap().as_deref(),
            Some(VITALIK)
        );
        assert_eq!(h.resolver.resolve_forward("nobody.eth").await.unwrap(), None);
        assert_eq!(h.resolver.resolve_forward("..").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_forward_resolution_is_cached() {
        let h = harness(FakeChain::default().with_address("vitalik.eth", VITALIK));

        h.resolver.resolve_forward("vitalik.eth").await.unwrap();
        let calls = h.chain.calls();
        h.resolver.resolve_forward("VITALIK.ETH").await.unwrap();
        assert_eq!(h.chain.calls(), calls);

        h.clock.advance(DEFAULT_CACHE_TTL_SECONDS);
        h.resolver.resolve_forward("vitalik.eth").await.unwrap();
        assert!(h.chain.calls() > calls);
    }

    #[tokio::test]
    async fn test_absence_cached_with_short_ttl() {
        let h = harness(FakeChain::default());

        assert_eq!(h.resolver.resolve_forward("ghost.eth").await.unwrap(), None);
        let calls = h.chain.calls();

        h.clock.advance(DEFAULT_NEGATIVE_CACHE_TTL_SECONDS - 1);
        assert_eq!(h.resolver.resolve_forward("ghost.eth").await.unwrap(), None);
        assert_eq!(h.chain.calls(), calls);

        h.clock.advance(1);
        h.resolver.resolve_forward("ghost.eth").await.unwrap();
        assert!(h.chain.calls() > calls);
    }

    #[tokio::test]
    async fn test_reverse_resolution_verified() {
        let h = harness(
            FakeChain::default()
                .with_address("vitalik.eth", VITALIK)
                .with_reverse(VITALIK, "vitalik.eth"),
        );

        let name = h
            .resolver
            .resolve_reverse("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045")
            .await
            .unwrap();
        assert_eq!(name.as_deref(), Some("vitalik.eth"));
    }

    #[tokio::test]
    async fn test_reverse_spoofing_rejected_and_not_cached() {
        // Mallory points her reverse record at vitalik.eth
        let h = harness(
            FakeChain::default()
                .with_address("vitalik.eth", VITALIK)
                .with_reverse(MALLORY, "vitalik.eth"),
        );

        assert_eq!(h.resolver.resolve_reverse(MALLORY).await.unwrap(), None);

        let calls = h.chain.calls();
        assert_eq!(h.resolver.resolve_reverse(MALLORY).await.unwrap(), None);
        assert!(h.chain.calls() > calls, "failed verification must not be cached");
    }

    #[tokio::test]
    async fn test_reverse_without_record() {
        let h = harness(FakeChain::default());
        assert_eq!(h.resolver.resolve_reverse(VITALIK).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reverse_rejects_bad_address() {
        let h = harness(FakeChain::default());
        let result = h.resolver.resolve_reverse("0x1234").await;
        assert!(matches!(result, Err(EnsError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_rpc_failure_is_error_and_not_cached() {
        let h = harness(FakeChain {
            failing: true,
            ..FakeChain::default()
        });

        let result = h.resolver.resolve_forward("vitalik.eth").await;
        assert!(matches!(
            result,
            Err(EnsError::Rpc(RpcError::AllProvidersExhausted { attempts: 1 }))
        ));

        let calls = h.chain.calls();
        assert!(h.resolver.resolve_forward("vitalik.eth").await.is_err());
        assert_eq!(h.chain.calls(), calls + 1);
    }

    #[tokio::test]
    async fn test_clear_cache_by_address_drops_both_sides() {
        let h = harness(
            FakeChain::default()
                .with_address("vitalik.eth", VITALIK)
                .with_reverse(VITALIK, "vitalik.eth"),
        );

        h.resolver.resolve_reverse(VITALIK).await.unwrap();
        h.resolver.clear_cache(VITALIK).await.unwrap();

        let calls = h.chain.calls();
        h.resolver.resolve_forward("vitalik.eth").await.unwrap();
        assert!(h.chain.calls() > calls, "forward entry should have been cleared");
    }

    #[tokio::test]
    async fn test_clear_cache_by_name() {
        let h = harness(FakeChain::default().with_address("vitalik.eth", VITALIK));

        h.resolver.resolve_forward("vitalik.eth").await.unwrap();
        h.resolver.clear_cache("Vitalik.eth").await.unwrap();

        let calls = h.chain.calls();
        h.resolver.resolve_forward("vitalik.eth").await.unwrap();
        assert!(h.chain.calls() > calls);
    }
}
