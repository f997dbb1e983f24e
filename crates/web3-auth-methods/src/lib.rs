//! # web3-auth-methods
//!
//! Sign-In with Ethereum (EIP-4361) for host applications.
//!
//! - Single-use, address-bound nonces with a bounded lifetime
//! - Strict SIWE message parsing and ordered claim validation
//! - EIP-191 signer recovery against the exact signed text
//! - Forward-verified ENS names for authenticated addresses
//!
//! Hosts interact through the [`Web3Auth`] trait, implemented by
//! [`Web3AuthService`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod nonce;
mod service;
pub mod siwe;
pub mod traits;
pub mod types;


pub use errors::*;
pub use nonce::{generate_nonce, NonceConfig, NonceStore};
pub use service::Web3AuthService;
pub use siwe::{SiweConfig, SiweMessage};
pub use traits::*;
pub use types::*;
