//! Minimal Solidity ABI codec for the ENS registry and resolver calls.
//!
//! Only the shapes ENS needs are supported: `f(bytes32)` calls, a single
//! `address` return word and a single dynamic `string` return value.

use crate::errors::AbiError;
use web3_auth_crypto::{keccak256, ADDRESS_SIZE};

/// Size of one ABI word
pub const WORD_SIZE: usize = 32;

/// `resolver(bytes32)` on the ENS registry
pub const RESOLVER_SELECTOR: [u8; 4] = [0x01, 0x78, 0xb8, 0xbf];

/// `addr(bytes32)` on a public resolver
pub const ADDR_SELECTOR: [u8; 4] = [0x3b, 0x3b, 0x57, 0xde];

/// `name(bytes32)` on a reverse resolver
pub const NAME_SELECTOR: [u8; 4] = [0x69, 0x1f, 0x34, 0x31];

type Result<T> = std::result::Result<T, AbiError>;

/// Compute the 4-byte selector of a canonical function signature
pub fn selector(signature: &str) -> [u8; 4] {
    let hash = keccak256(signature.as_bytes());
    [hash[0], hash[1], hash[2], hash[3]]
}

/// Encode call data: selector followed by static 32-byte arguments
pub fn encode_call(selector: [u8; 4], args: &[[u8; WORD_SIZE]]) -> Vec<u8> {
    let mut data = Vec::with_capacity(4 + args.len() * WORD_SIZE);
    data.extend_from_slice(&selector);
    for arg in args {
        data.extend_from_slice(arg);
    }
    data
}

/// Decode a single `address` return word
///
/// The 12 leading padding bytes must be zero.
pub fn decode_address(data: &[u8]) -> Result<[u8; ADDRESS_SIZE]> {
    let word = word_at(data, 0)?;
    let padding = WORD_SIZE - ADDRESS_SIZE;

    if word[..padding].iter().any(|b| *b != 0) {
        return Err(AbiError::DecodeError(
            "address word has non-zero padding".to_string(),
        ));
    }

    let mut address = [0u8; ADDRESS_SIZE];
    address.copy_from_slice(&word[padding..]);
    Ok(address)
}

/// Decode a single dynamic `string` return value
///
/// Layout: offset word, then a length word at that offset, then the
/// bytes. The result is cut at the first NUL byte.
pub fn decode_string(data: &[u8]) -> Result<String> {
    let offset = read_usize(data, 0)?;
    let length = read_usize(data, offset)?;

    let start = offset
        .checked_add(WORD_SIZE)
        .ok_or_else(|| AbiError::DecodeError("string offset overflow".to_string()))?;
    let end = start
        .checked_add(length)
        .ok_or_else(|| AbiError::DecodeError("string length overflow".to_string()))?;

    if end > data.len() {
        return Err(AbiError::DecodeError(format!(
            "string of {} bytes at offset {} exceeds {} bytes of return data",
            length,
            offset,
            data.len()
        )));
    }

    let mut bytes = &data[start..end];
    if let Some(nul) = bytes.iter().position(|b| *b == 0) {
        bytes = &bytes[..nul];
    }

    String::from_utf8(bytes.to_vec()).map_err(|e| AbiError::DecodeError(e.to_string()))
}

fn word_at(data: &[u8], offset: usize) -> Result<&[u8]> {
    let end = offset
        .checked_add(WORD_SIZE)
        .ok_or_else(|| AbiError::DecodeError("word offset overflow".to_string()))?;

    data.get(offset..end).ok_or_else(|| {
        AbiError::DecodeError(format!(
            "need a word at offset {} but return data is {} bytes",
            offset,
            data.len()
        ))
    })
}

fn read_usize(data: &[u8], offset: usize) -> Result<usize> {
    let word = word_at(data, offset)?;

    // Anything that does not fit in a u64 cannot be a valid offset/length
    if word[..WORD_SIZE - 8].iter().any(|b| *b != 0) {
        return Err(AbiError::DecodeError(format!(
            "integer at offset {} is out of range",
            offset
        )));
    }

    let mut low = [0u8; 8];
    low.copy_from_slice(&word[WORD_SIZE - 8..]);
    usize::try_from(u64::from_be_bytes(low))
        .map_err(|_| AbiError::DecodeError(format!("integer at offset {} is out of range", offset)))
}
