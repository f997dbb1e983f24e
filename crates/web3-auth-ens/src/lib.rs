//! # web3-auth-ens
//!
//! Ethereum Name Service resolution for the sign-in flow.
//!
//! - Namehash computation and ABI encoding for registry/resolver calls
//! - JSON-RPC `eth_call` with ordered provider failover
//! - Forward (`name -> address`) and reverse (`address -> name`) lookups
//! - TTL caching with a shorter TTL for confirmed absence
//!
//! Reverse lookups are always forward-verified: a primary name is only
//! returned when it resolves back to the queried address.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abi;
pub mod cache;
pub mod errors;
pub mod namehash;
pub mod resolver;
pub mod rpc;
pub mod transport;

pub use cache::{CacheEntry, CachedLookup, EnsCache};
pub use errors::{AbiError, EnsError, Result, RpcError, TransportError};
pub use namehash::{namehash, normalize_name, reverse_name};
pub use resolver::{EnsConfig, EnsResolver, MAINNET_ENS_REGISTRY};
pub use rpc::{RpcClient, RpcConfig};
pub use transport::{HttpTransport, ReqwestTransport};
