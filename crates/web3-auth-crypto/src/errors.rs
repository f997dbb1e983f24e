//! Cryptographic error types.

use thiserror::Error;

/// Cryptographic operation errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Input was not valid hexadecimal
    #[error("Invalid hex encoding: {0}")]
    InvalidHex(String),

    /// Input had the wrong byte length
    #[error("Invalid length: expected {expected}, got {actual}")]
    InvalidLength {
        /// Expected length in bytes
        expected: usize,
        /// Actual length in bytes
        actual: usize,
    },

    /// The `v` byte does not map to a recovery id under any supported convention
    #[error("Invalid recovery id: v={0}")]
    InvalidRecoveryId(u8),

    /// The `r`/`s` pair is not a valid secp256k1 signature
    #[error("Invalid signature: {0}")]
    InvalidSignature(String),

    /// Public key recovery failed
    #[error("Recovery failed: {0}")]
    RecoveryFailed(String),

    /// Public key was not a 65-byte uncompressed SEC1 point
    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    /// Address was not `0x` followed by 40 hex digits with valid casing
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

/// Result type for cryptographic operations
pub type Result<T> = std::result::Result<T, CryptoError>;
