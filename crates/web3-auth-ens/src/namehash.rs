//! ENS namehash and name normalization.

use web3_auth_crypto::{keccak256, HASH_SIZE};

/// Suffix of reverse-registrar names
pub const REVERSE_SUFFIX: &str = "addr.reverse";

/// Compute the ENS namehash of a dotted name
///
/// The empty name hashes to 32 zero bytes. Otherwise labels are
/// lowercased and folded from the right:
/// `node = keccak256(node || keccak256(label))`.
pub fn namehash(name: &str) -> [u8; HASH_SIZE] {
    let mut node = [0u8; HASH_SIZE];
    if name.is_empty() {
        return node;
    }

    for label in name.rsplit('.') {
        let label_hash = keccak256(label.to_lowercase().as_bytes());

        let mut buf = [0u8; HASH_SIZE * 2];
        buf[..HASH_SIZE].copy_from_slice(&node);
        buf[HASH_SIZE..].copy_from_slice(&label_hash);
        node = keccak256(&buf);
    }

    node
}

/// Normalize a user-supplied name into a cache and lookup key
///
/// Trims whitespace, drops a trailing root dot and lowercases. Returns
/// `None` when the result is empty or contains an empty label.
pub fn normalize_name(name: &str) -> Option<String> {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if trimmed.is_empty() || trimmed.split('.').any(str::is_empty) {
        return None;
    }
    Some(trimmed.to_lowercase())
}

/// Reverse-registrar name for a lowercase `0x`-prefixed address
pub fn reverse_name(address: &str) -> String {
    let hex_body = address.strip_prefix("0x").unwrap_or(address);
    format!("{}.{}", hex_body.to_lowercase(), REVERSE_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex_node(name: &str) -> String {
        hex::encode(namehash(name))
    }

    #[test]
    fn test_namehash_vectors() {
        assert_eq!(hex_node(""), "0".repeat(64));
        assert_eq!(
            hex_node("eth"),
            "93cdeb708b7545dc668eb9280176169d1c33cfd8ed6f04690a0bcc88a93fc4ae"
        );
        assert_eq!(
            hex_node("foo.eth"),
            "de9b09fd7c5f901e23a3f19fecc54828e9c848539801e86591bd9801b019f84f"
        );
        assert_eq!(
            hex_node("vitalik.eth"),
            "ee6c4522aab0003e8d14cd40a6af439055fd2577951148c14b6cea9a53475835"
        );
        assert_eq!(
            hex_node("addr.reverse"),
            "91d1777781884d03a6757a803996e38de2a42967fb37eeaca72729271025a9e2"
        );
    }

    #[test]
    fn test_namehash_is_case_insensitive() {
        assert_eq!(namehash("Vitalik.ETH"), namehash("vitalik.eth"));
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(" Vitalik.eth. ").as_deref(), Some("vitalik.eth"));
        assert_eq!(normalize_name("eth").as_deref(), Some("eth"));
        assert_eq!(normalize_name(""), None);
        assert_eq!(normalize_name("."), None);
        assert_eq!(normalize_name("foo..eth"), None);
        assert_eq!(normalize_name(".eth"), None);
    }

    #[test]
    fn test_reverse_name() {
        assert_eq!(
            reverse_name("0xD8dA6BF26964aF9D7eEd9e03E53415D37aA96045"),
            "d8da6bf26964af9d7eed9e03e53415d37aa96045.addr.reverse"
        );
    }
}
