//! # web3-auth-storage
//!
//! Storage abstraction for the sign-in core.
//!
//! The host application owns the real backing store; this crate defines the
//! contract it must satisfy (including atomic read-and-delete for single-use
//! nonces) and ships an in-memory implementation.

#![warn(clippy::all)]

pub mod column_families;
pub mod errors;
pub mod memory;
pub mod traits;

pub use column_families::*;
pub use errors::{Result, StorageError};
pub use memory::MemoryStorage;
pub use traits::Storage;
