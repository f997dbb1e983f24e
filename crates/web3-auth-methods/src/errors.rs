//! Sign-in error types.

use thiserror::Error;
use web3_auth_ens::EnsError;
use web3_auth_storage::StorageError;

/// Sign-in errors
///
/// Every verification failure is terminal for the attempt; callers must
/// request a fresh nonce.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Message text is not a well-formed SIWE message
    #[error("Malformed SIWE message: {0}")]
    MalformedMessage(String),

    /// Message address differs from the address the client claimed
    #[error("Message address {message} does not match claimed address {claimed}")]
    AddressMismatch {
        /// Address the client claimed
        claimed: String,
        /// Address written in the message
        message: String,
    },

    /// Message was produced for another site
    #[error("Domain mismatch: expected {expected}, got {actual}")]
    DomainMismatch {
        /// Domain this service is bound to
        expected: String,
        /// Domain in the message
        actual: String,
    },

    /// Message targets another chain
    #[error("Chain ID mismatch: expected {expected}, got {actual}")]
    ChainMismatch {
        /// Chain this service is bound to
        expected: u64,
        /// Chain in the message
        actual: u64,
    },

    /// Expiration time has passed
    #[error("SIWE message expired")]
    Expired,

    /// Not Before time is still in the future
    #[error("SIWE message not yet valid")]
    NotYetValid,

    /// Issued At is further in the future than the allowed skew
    #[error("SIWE message issued in the future")]
    IssuedInFuture,

    /// Nonce unknown, expired, already used or bound to another address
    #[error("Invalid or expired nonce")]
    InvalidNonce,

    /// Signature cannot be parsed or recovered
    #[error("Invalid signature format: {0}")]
    InvalidSignatureFormat(String),

    /// Signature is valid but was made by another key
    #[error("Signature recovered {recovered}, expected {expected}")]
    SignatureAddressMismatch {
        /// Address in the message
        expected: String,
        /// Address recovered from the signature
        recovered: String,
    },

    /// Address argument is malformed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// ENS error
    #[error("ENS error: {0}")]
    Ens(#[from] EnsError),

    /// Storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for sign-in operations
pub type Result<T> = std::result::Result<T, AuthError>;
