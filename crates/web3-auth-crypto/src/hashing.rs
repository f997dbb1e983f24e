//! Keccak-256 and EIP-191 message hashing.

use crate::constants::EIP191_PREFIX;
use sha3::{Digest, Keccak256};

/// Compute Keccak256 hash
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Build EIP-191 message bytes for signing
///
/// Format: "\x19Ethereum Signed Message:\n" + len(message) + message
///
/// The length is the decimal byte length of `message`, so non-UTF-8
/// payloads are framed exactly as wallets frame them.
pub fn build_eip191_message(message: &[u8]) -> Vec<u8> {
    let length = message.len().to_string();
    let mut framed = Vec::with_capacity(EIP191_PREFIX.len() + length.len() + message.len());
    framed.extend_from_slice(EIP191_PREFIX.as_bytes());
    framed.extend_from_slice(length.as_bytes());
    framed.extend_from_slice(message);
    framed
}

/// Keccak256 of the EIP-191 framed message (`personal_sign` digest)
pub fn eip191_hash(message: &[u8]) -> [u8; 32] {
    keccak256(&build_eip191_message(message))
}
