//! Ethereum address derivation, validation and EIP-55 checksums.
//!
//! Addresses are handled as `0x`-prefixed hex strings. Identity is
//! case-insensitive: EIP-55 casing is a transcription check, not part of
//! the address itself.

use crate::{
    constants::*,
    errors::{CryptoError, Result},
    hashing::keccak256,
};

/// Derive an Ethereum address from an uncompressed SEC1 public key
///
/// Ethereum address = last 20 bytes of keccak256(public_key[1..]),
/// skipping the 0x04 tag byte.
///
/// # Returns
/// Ethereum address in lowercase with 0x prefix
pub fn derive_eth_address(public_key: &[u8]) -> Result<String> {
    if public_key.len() != UNCOMPRESSED_PUBLIC_KEY_SIZE {
        return Err(CryptoError::InvalidLength {
            expected: UNCOMPRESSED_PUBLIC_KEY_SIZE,
            actual: public_key.len(),
        });
    }
    if public_key[0] != UNCOMPRESSED_POINT_TAG {
        return Err(CryptoError::InvalidPublicKey(format!(
            "expected uncompressed tag 0x04, got 0x{:02x}",
            public_key[0]
        )));
    }

    let hash = keccak256(&public_key[1..]);
    Ok(format!("0x{}", hex::encode(&hash[12..])))
}

/// Split off the `0x` prefix and check the remainder is 40 hex digits
fn hex_body(address: &str) -> Result<&str> {
    let body = address
        .strip_prefix("0x")
        .ok_or_else(|| CryptoError::InvalidAddress("address must start with 0x".to_string()))?;

    if address.len() != ADDRESS_HEX_LEN {
        return Err(CryptoError::InvalidAddress(format!(
            "address must be {} characters, got {}",
            ADDRESS_HEX_LEN,
            address.len()
        )));
    }
    if !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(CryptoError::InvalidAddress(
            "invalid hex characters in address".to_string(),
        ));
    }

    Ok(body)
}

/// Decode an address string into its 20 raw bytes
///
/// Casing is not checked here; use [`is_valid_address`] for that.
pub fn parse_address(address: &str) -> Result<[u8; ADDRESS_SIZE]> {
    let body = hex_body(address)?;
    let mut bytes = [0u8; ADDRESS_SIZE];
    hex::decode_to_slice(body, &mut bytes).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    Ok(bytes)
}

/// Nibble `index` (0-based, high nibble first) of a 32-byte hash
fn hash_nibble(hash: &[u8; 32], index: usize) -> u8 {
    let byte = hash[index / 2];
    if index % 2 == 0 {
        byte >> 4
    } else {
        byte & 0x0f
    }
}

/// Validate the EIP-55 checksum of an address
///
/// All-lowercase and all-uppercase addresses carry no checksum and are
/// accepted as-is. Mixed-case addresses must match the casing derived from
/// keccak256 of the lowercase hex: a letter is uppercase iff the hash
/// nibble at the same position is >= 8.
pub fn checksum_valid(address: &str) -> bool {
    let Ok(body) = hex_body(address) else {
        return false;
    };

    let has_lower = body.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = body.bytes().any(|b| b.is_ascii_uppercase());
    if !has_lower || !has_upper {
        return true;
    }

    let hash = keccak256(body.to_ascii_lowercase().as_bytes());
    body.bytes().enumerate().all(|(i, b)| {
        if !b.is_ascii_alphabetic() {
            return true;
        }
        let expect_upper = hash_nibble(&hash, i) >= 8;
        b.is_ascii_uppercase() == expect_upper
    })
}

/// Whether `address` is well-formed: `0x` + 40 hex digits with
/// all-lower, all-upper or correct EIP-55 casing
pub fn is_valid_address(address: &str) -> bool {
    hex_body(address).is_ok() && checksum_valid(address)
}

/// Encode raw address bytes with EIP-55 casing
pub fn checksum_encode(bytes: &[u8; ADDRESS_SIZE]) -> String {
    let lower = hex::encode(bytes);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(ADDRESS_HEX_LEN);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        if c.is_ascii_alphabetic() && hash_nibble(&hash, i) >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Re-case an address string with its EIP-55 checksum
pub fn to_checksum_address(address: &str) -> Result<String> {
    Ok(checksum_encode(&parse_address(address)?))
}

/// Validate an address and return its canonical lowercase form
pub fn normalize_address(address: &str) -> Result<String> {
    let body = hex_body(address)?;
    if !checksum_valid(address) {
        return Err(CryptoError::InvalidAddress(format!(
            "EIP-55 checksum mismatch for {}",
            address
        )));
    }
    Ok(format!("0x{}", body.to_ascii_lowercase()))
}

/// Compare two addresses case-insensitively
pub fn addresses_equal(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Whether the address is the all-zero address
pub fn is_zero_address(bytes: &[u8; ADDRESS_SIZE]) -> bool {
    bytes.iter().all(|b| *b == 0)
}
