//! Recoverable secp256k1 signatures and EIP-191 signer recovery.

use crate::{
    address::derive_eth_address,
    constants::*,
    errors::{CryptoError, Result},
    hashing::eip191_hash,
};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};

/// A 65-byte recoverable signature split into its components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoverableSignature {
    /// `r` scalar, big-endian
    pub r: [u8; 32],
    /// `s` scalar, big-endian
    pub s: [u8; 32],
    /// Raw recovery indicator as sent by the wallet
    pub v: u8,
}

impl RecoverableSignature {
    /// Split a 65-byte `r || s || v` signature
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != SIGNATURE_SIZE {
            return Err(CryptoError::InvalidLength {
                expected: SIGNATURE_SIZE,
                actual: bytes.len(),
            });
        }

        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);

        Ok(Self { r, s, v: bytes[64] })
    }

    /// Parse a hex signature, with or without `0x` prefix (130 hex digits)
    pub fn from_hex(signature: &str) -> Result<Self> {
        let trimmed = signature.trim();
        let hex_sig = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        if hex_sig.len() != SIGNATURE_SIZE * 2 {
            return Err(CryptoError::InvalidLength {
                expected: SIGNATURE_SIZE,
                actual: hex_sig.len() / 2,
            });
        }

        let bytes = hex::decode(hex_sig).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    /// Serialize back to `r || s || v`
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE] {
        let mut out = [0u8; SIGNATURE_SIZE];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// Recovery id in 0..=3 after normalizing `v`
    pub fn recovery_id(&self) -> Result<u8> {
        normalize_recovery_id(self.v)
    }

    /// Chain id implied by an EIP-155 style `v`, if this signature uses one
    pub fn eip155_chain_id(&self) -> Option<u64> {
        if self.v >= EIP155_V_OFFSET {
            Some(u64::from(self.v - EIP155_V_OFFSET) / 2)
        } else {
            None
        }
    }
}

/// Parse a wallet-supplied signature string
pub fn parse_signature_hex(signature: &str) -> Result<RecoverableSignature> {
    RecoverableSignature::from_hex(signature)
}

/// Normalize a signature `v` byte to a recovery id in 0..=3
///
/// Accepted conventions:
/// - raw recovery id: 0..=3
/// - Ethereum legacy: 27..=30 (27 + id)
/// - EIP-155: `chain_id * 2 + 35 + id` (v >= 35)
///
/// Every other value is rejected; nothing is coerced.
pub fn normalize_recovery_id(v: u8) -> Result<u8> {
    match v {
        0..=3 => Ok(v),
        LEGACY_V_OFFSET..=30 => Ok(v - LEGACY_V_OFFSET),
        v if v >= EIP155_V_OFFSET => Ok((v - EIP155_V_OFFSET) % 2),
        _ => Err(CryptoError::InvalidRecoveryId(v)),
    }
}

/// Recover Ethereum address from message hash and signature
///
/// # Arguments
/// * `message_hash` - 32-byte prehash that was signed
/// * `signature` - recoverable signature (r, s, v)
///
/// # Returns
/// Ethereum address in lowercase with 0x prefix
pub fn recover_address(message_hash: &[u8; 32], signature: &RecoverableSignature) -> Result<String> {
    let id = signature.recovery_id()?;
    let recovery_id = RecoveryId::from_byte(id).ok_or(CryptoError::InvalidRecoveryId(signature.v))?;

    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(&signature.r);
    rs[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&rs).map_err(|e| CryptoError::InvalidSignature(e.to_string()))?;

    let verifying_key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|e| CryptoError::RecoveryFailed(e.to_string()))?;

    // Uncompressed public key (65 bytes: 0x04 + x + y)
    let public_key = verifying_key.to_encoded_point(false);
    derive_eth_address(public_key.as_bytes())
}

/// Recover the signer of an EIP-191 `personal_sign` message
///
/// The message is framed with the EIP-191 prefix and its decimal byte
/// length, hashed with Keccak256, and the public key is recovered from
/// the signature.
pub fn recover_signer(message: &[u8], signature: &RecoverableSignature) -> Result<String> {
    recover_address(&eip191_hash(message), signature)
}
