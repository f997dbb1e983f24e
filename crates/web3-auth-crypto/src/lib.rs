//! # web3-auth-crypto
//!
//! Ethereum cryptographic primitives used by the sign-in flow.
//!
//! This crate provides:
//! - Keccak-256 hashing and EIP-191 personal message hashing
//! - Address derivation from secp256k1 public keys
//! - EIP-55 checksum encoding and validation
//! - 65-byte signature parsing and signer recovery
//!
//! ## Security Properties
//!
//! - A failed recovery is always an error, never a "best guess" address
//! - Recovery ids that do not normalize to 0..=3 are rejected, not coerced
//! - No unsafe code

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod address;
pub mod constants;
pub mod errors;
pub mod hashing;
pub mod signatures;
pub mod utils;

pub use address::*;
pub use constants::*;
pub use errors::{CryptoError, Result};
pub use hashing::*;
pub use signatures::*;
pub use utils::*;
