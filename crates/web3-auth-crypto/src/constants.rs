//! Sizes and prefixes fixed by the Ethereum standards this crate implements.

/// Size of a Keccak-256 digest in bytes
pub const HASH_SIZE: usize = 32;

/// Size of an Ethereum address in bytes
pub const ADDRESS_SIZE: usize = 20;

/// Length of a textual address: `0x` plus 40 hex digits
pub const ADDRESS_HEX_LEN: usize = 42;

/// Size of a recoverable signature: r (32) || s (32) || v (1)
pub const SIGNATURE_SIZE: usize = 65;

/// Size of an uncompressed SEC1 public key: 0x04 || x (32) || y (32)
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 65;

/// SEC1 tag byte of an uncompressed point
pub const UNCOMPRESSED_POINT_TAG: u8 = 0x04;

/// EIP-191 version 0x45 ("E") prefix for personal messages
pub const EIP191_PREFIX: &str = "\x19Ethereum Signed Message:\n";

/// Offset of legacy Ethereum `v` values (27/28)
pub const LEGACY_V_OFFSET: u8 = 27;

/// Offset of EIP-155 `v` values: `chain_id * 2 + 35 + recovery_id`
pub const EIP155_V_OFFSET: u8 = 35;
