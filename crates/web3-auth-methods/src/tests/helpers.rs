//! Test helpers and mocks for sign-in service tests.

use crate::*;
use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use web3_auth_crypto::{decode_hex_prefixed, eip191_hash, encode_hex_prefixed, ManualClock};
use web3_auth_ens::{abi, HttpTransport, RpcConfig, TransportError};
use web3_auth_storage::MemoryStorage;

pub const DOMAIN: &str = "example.com";

/// Address of the first well-known development key
pub const ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

const DEV_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// 1970-01-01T00:16:40Z
pub const T0: u64 = 1000;

pub type TestService = Web3AuthService<MemoryStorage, MockChain>;

pub fn signing_key() -> SigningKey {
    SigningKey::from_slice(&hex::decode(DEV_KEY).unwrap()).unwrap()
}

pub fn other_key() -> SigningKey {
    let mut secret = [0u8; 32];
    secret[31] = 7;
    SigningKey::from_slice(&secret).unwrap()
}

/// Sign `text` with EIP-191 framing, returning `r || s || v` with `v = base + id`
pub fn sign_with_v(key: &SigningKey, text: &str, base: u8) -> String {
    let (signature, recovery_id) = key
        .sign_prehash_recoverable(&eip191_hash(text.as_bytes()))
        .unwrap();
    let mut bytes = signature.to_bytes().to_vec();
    bytes.push(base + recovery_id.to_byte());
    encode_hex_prefixed(&bytes)
}

pub fn sign(key: &SigningKey, text: &str) -> String {
    sign_with_v(key, text, 27)
}

/// SIWE text for `nonce` issued at `T0`
pub fn siwe_text(domain: &str, nonce: &str) -> String {
    [
        format!("{} wants you to sign in with your Ethereum account:", domain),
        ADDRESS.to_string(),
        String::new(),
        "Sign in to Example".to_string(),
        String::new(),
        "URI: https://example.com/login".to_string(),
        "Version: 1".to_string(),
        "Chain ID: 1".to_string(),
        format!("Nonce: {}", nonce),
        "Issued At: 1970-01-01T00:16:40Z".to_string(),
    ]
    .join("\n")
}

/// Fake chain serving ENS records for the registry and a single resolver
#[derive(Default)]
pub struct MockChain {
    pub forward: Vec<(String, String)>,
    pub reverse: Vec<(String, String)>,
    pub failing: bool,
    pub calls: Mutex<usize>,
}

const RESOLVER: [u8; 20] = [0x42; 20];

fn address_word(address: &[u8]) -> String {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address);
    encode_hex_prefixed(&word)
}

fn string_result(value: &str) -> String {
    let mut out = vec![0u8; 64];
    out[31] = 32;
    out[63] = value.len() as u8;
    out.extend_from_slice(value.as_bytes());
    out.resize(64 + value.len().div_ceil(32) * 32, 0);
    encode_hex_prefixed(&out)
}

impl MockChain {
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn answer(&self, data: &[u8]) -> String {
        let selector = [data[0], data[1], data[2], data[3]];
        let node = &data[4..36];

        let forward = self
            .forward
            .iter()
            .find(|(name, _)| web3_auth_ens::namehash(name).as_slice() == node);
        let reverse = self
            .reverse
            .iter()
            .find(|(address, _)| web3_auth_ens::namehash(&web3_auth_ens::reverse_name(address)).as_slice() == node);

        match selector {
            abi::RESOLVER_SELECTOR if forward.is_some() || reverse.is_some() => address_word(&RESOLVER),
            abi::ADDR_SELECTOR => match forward {
                Some((_, address)) => address_word(&decode_hex_prefixed(address).unwrap()),
                None => address_word(&[0u8; 20]),
            },
            abi::NAME_SELECTOR => string_result(reverse.map(|(_, name)| name.as_str()).unwrap_or("")),
            _ => address_word(&[0u8; 20]),
        }
    }
}

#[async_trait]
impl HttpTransport for MockChain {
    async fn post_json(
        &self,
        _url: &str,
        body: &Value,
        _timeout: Duration,
    ) -> std::result::Result<Value, TransportError> {
        *self.calls.lock().unwrap() += 1;
        if self.failing {
            return Err(TransportError::Status(500));
        }

        let data = decode_hex_prefixed(body["params"][0]["data"].as_str().unwrap()).unwrap();
        Ok(json!({ "jsonrpc": "2.0", "id": body["id"].clone(), "result": self.answer(&data) }))
    }
}

/// Helper to create a service with in-memory storage and a manual clock
pub fn create_test_service(
    config: Web3AuthConfig,
    chain: MockChain,
) -> (Arc<TestService>, Arc<MemoryStorage>, Arc<ManualClock>) {
    create_test_service_on(config, Arc::new(chain))
}

/// Like `create_test_service`, keeping a handle on the chain for call counts
pub fn create_test_service_on(
    config: Web3AuthConfig,
    chain: Arc<MockChain>,
) -> (Arc<TestService>, Arc<MemoryStorage>, Arc<ManualClock>) {
    let storage = Arc::new(MemoryStorage::new());
    let clock = Arc::new(ManualClock::new(T0));
    let service = Web3AuthService::new(config, Arc::clone(&storage), chain, clock.clone()).unwrap();
    (Arc::new(service), storage, clock)
}

pub fn test_config() -> Web3AuthConfig {
    Web3AuthConfig {
        siwe: SiweConfig {
            expected_domain: DOMAIN.to_string(),
            ..SiweConfig::default()
        },
        ..Web3AuthConfig::default()
    }
}

pub fn ens_config() -> Web3AuthConfig {
    Web3AuthConfig {
        rpc: RpcConfig::new(vec!["https://rpc.example".to_string()]),
        ..test_config()
    }
}
