//! Sign-in types.

use crate::{
    errors::AuthError,
    nonce::NonceConfig,
    siwe::SiweConfig,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use web3_auth_ens::{EnsConfig, RpcConfig};

/// Ethereum network a deployment is bound to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Network {
    /// Ethereum mainnet
    #[default]
    Mainnet,
    /// Sepolia testnet
    Sepolia,
    /// Holesky testnet
    Holesky,
    /// Any other chain, by id
    Custom(u64),
}

impl Network {
    /// EIP-155 chain id
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => 1,
            Network::Sepolia => 11_155_111,
            Network::Holesky => 17_000,
            Network::Custom(id) => *id,
        }
    }

    /// Map a chain id back to a known network
    pub fn from_chain_id(chain_id: u64) -> Self {
        match chain_id {
            1 => Network::Mainnet,
            11_155_111 => Network::Sepolia,
            17_000 => Network::Holesky,
            other => Network::Custom(other),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Sepolia => write!(f, "sepolia"),
            Network::Holesky => write!(f, "holesky"),
            Network::Custom(id) => write!(f, "chain-{}", id),
        }
    }
}

impl FromStr for Network {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim().to_ascii_lowercase();
        match value.as_str() {
            "mainnet" | "ethereum" => Ok(Network::Mainnet),
            "sepolia" => Ok(Network::Sepolia),
            "holesky" => Ok(Network::Holesky),
            other => {
                let id = other.strip_prefix("chain-").unwrap_or(other);
                id.parse::<u64>()
                    .map(Network::from_chain_id)
                    .map_err(|_| AuthError::Configuration(format!("Unknown network: {}", s)))
            }
        }
    }
}

/// Stored nonce state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonceRecord {
    /// Address the nonce was issued to (lowercase)
    pub address: String,
    /// Unix timestamp of issuance
    pub issued_at: u64,
}

/// Complete service configuration
#[derive(Debug, Clone, Default)]
pub struct Web3AuthConfig {
    /// Nonce lifetime
    pub nonce: NonceConfig,
    /// SIWE binding and tolerances
    pub siwe: SiweConfig,
    /// ENS registry and cache TTLs
    pub ens: EnsConfig,
    /// JSON-RPC endpoints; ENS lookups are disabled when empty
    pub rpc: RpcConfig,
}
