use anyhow::{Context, Result};
use std::time::Duration;
use web3_auth_ens::{EnsConfig, RpcConfig};
use web3_auth_methods::{Network, NonceConfig, SiweConfig, Web3AuthConfig};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Network messages are bound to
    pub network: Network,

    /// Service configuration derived from the environment
    pub service: Web3AuthConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let network: Network = lookup("SIWE_NETWORK")
            .unwrap_or_else(|| "mainnet".to_string())
            .parse()
            .context("SIWE_NETWORK")?;

        let expected_domain = lookup("SIWE_DOMAIN").unwrap_or_else(|| "localhost".to_string());

        let providers = lookup("RPC_PROVIDERS")
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|provider| !provider.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let timeout = parse_u64(&lookup, "RPC_TIMEOUT_SECONDS", 10)?;

        let ens_defaults = EnsConfig::default();
        let registry_address = lookup("ENS_REGISTRY_ADDRESS").unwrap_or(ens_defaults.registry_address);
        let cache_ttl = parse_u64(&lookup, "ENS_CACHE_TTL_SECONDS", ens_defaults.cache_ttl)?;
        let negative_cache_ttl = parse_u64(
            &lookup,
            "ENS_NEGATIVE_CACHE_TTL_SECONDS",
            ens_defaults.negative_cache_ttl,
        )?;

        let lifetime_seconds = parse_u64(
            &lookup,
            "NONCE_LIFETIME_SECONDS",
            NonceConfig::default().lifetime_seconds,
        )?;
        if lifetime_seconds == 0 {
            anyhow::bail!("NONCE_LIFETIME_SECONDS must be greater than zero");
        }

        Ok(Self {
            network,
            service: Web3AuthConfig {
                nonce: NonceConfig { lifetime_seconds },
                siwe: SiweConfig {
                    expected_domain,
                    expected_chain_id: network.chain_id(),
                    ..SiweConfig::default()
                },
                ens: EnsConfig {
                    registry_address,
                    cache_ttl,
                    negative_cache_ttl,
                },
                rpc: RpcConfig {
                    providers,
                    timeout: Duration::from_secs(timeout),
                },
            },
        })
    }
}

fn parse_u64<F>(lookup: &F, key: &str, default: u64) -> Result<u64>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) => value
            .trim()
            .parse()
            .with_context(|| format!("{} must be a non-negative integer, got {:?}", key, value)),
        None => Ok(default),
    }
}
