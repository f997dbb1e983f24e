//! Error types for ENS resolution.

use thiserror::Error;
use web3_auth_crypto::CryptoError;
use web3_auth_storage::StorageError;

/// ABI decoding errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AbiError {
    /// Return data does not have the expected shape
    #[error("ABI decode error: {0}")]
    DecodeError(String),
}

/// Errors from a single HTTP attempt
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection, TLS or timeout failure
    #[error("Request failed: {0}")]
    Request(String),

    /// Non-2xx response
    #[error("HTTP status {0}")]
    Status(u16),

    /// Body was not valid JSON
    #[error("Invalid response body: {0}")]
    InvalidBody(String),
}

/// JSON-RPC client errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// Client was configured without any endpoint
    #[error("No RPC providers configured")]
    NoProviders,

    /// Endpoint URL could not be parsed
    #[error("Invalid RPC provider {url}: {reason}")]
    InvalidProvider {
        /// Offending URL
        url: String,
        /// Parser message
        reason: String,
    },

    /// Every provider failed for this call
    #[error("All {attempts} RPC providers failed")]
    AllProvidersExhausted {
        /// Number of providers tried
        attempts: usize,
    },
}

/// ENS resolution errors
#[derive(Debug, Error)]
pub enum EnsError {
    /// RPC error
    #[error(transparent)]
    Rpc(#[from] RpcError),

    /// ABI error
    #[error(transparent)]
    Abi(#[from] AbiError),

    /// Cache storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Address argument is malformed
    #[error("Invalid address: {0}")]
    InvalidAddress(#[from] CryptoError),
}

/// Result type for ENS operations
pub type Result<T> = std::result::Result<T, EnsError>;
