//! Host-facing sign-in trait.

use crate::errors::Result;
use async_trait::async_trait;

/// Sign-in subsystem trait
///
/// The host owns accounts, sessions and routing; it calls into this trait
/// to issue challenges, verify signed messages and look up names.
#[async_trait]
pub trait Web3Auth: Send + Sync {
    /// Issue a single-use nonce bound to `claimed_address`
    async fn issue_nonce(&self, claimed_address: &str) -> Result<String>;

    /// Validate a nonce and consume it
    ///
    /// Returns `false` when the nonce is unknown, expired, already used or
    /// bound to another address. The nonce is gone afterwards in every case.
    async fn validate_and_consume_nonce(
        &self,
        nonce: &str,
        claimed_address: &str,
        now: u64,
    ) -> Result<bool>;

    /// Verify a signed SIWE message
    ///
    /// Returns the recovered signer (lowercase) on success. The message
    /// nonce is consumed once the message claims check out, before the
    /// signature is examined.
    async fn verify_siwe(
        &self,
        raw_message: &str,
        raw_signature: &str,
        claimed_address: &str,
        expected_domain: &str,
        expected_chain_id: u64,
        now: u64,
    ) -> Result<String>;

    /// Resolve an ENS name to an address
    ///
    /// Lookup failures are logged and reported as `None`.
    async fn resolve_ens_forward(&self, name: &str) -> Option<String>;

    /// Resolve an address to its forward-verified primary ENS name
    ///
    /// Lookup failures are logged and reported as `None`.
    async fn resolve_ens_reverse(&self, address: &str) -> Option<String>;

    /// Drop cached ENS entries for a name or an address
    async fn clear_ens_cache(&self, identifier: &str) -> Result<()>;

    /// Render the SIWE challenge text for a freshly issued nonce
    ///
    /// Uses the configured domain and chain, issued now and expiring with
    /// the nonce.
    fn build_siwe_message(
        &self,
        address: &str,
        nonce: &str,
        uri: &str,
        statement: Option<&str>,
    ) -> Result<String>;
}
