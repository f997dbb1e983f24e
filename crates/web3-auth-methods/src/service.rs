//! Sign-in service implementation.

use crate::{
    errors::*,
    nonce::NonceStore,
    siwe::{SiweConfig, SiweMessage},
    traits::Web3Auth,
    types::Web3AuthConfig,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};
use web3_auth_crypto::{addresses_equal, is_valid_address, parse_signature_hex, recover_signer, Clock};
use web3_auth_ens::{EnsResolver, HttpTransport, RpcClient};
use web3_auth_storage::Storage;

/// Sign-in service
///
/// Generic over the host's storage and HTTP transport. ENS lookups are
/// disabled when no RPC provider is configured.
pub struct Web3AuthService<S: Storage, T: HttpTransport> {
    nonces: NonceStore<S>,
    ens: Option<EnsResolver<S, T>>,
    siwe_config: SiweConfig,
    clock: Arc<dyn Clock>,
}

impl<S: Storage, T: HttpTransport> Web3AuthService<S, T> {
    /// Create a new sign-in service
    pub fn new(
        config: Web3AuthConfig,
        storage: Arc<S>,
        transport: Arc<T>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let ens = if config.rpc.providers.is_empty() {
            info!("No RPC providers configured, ENS lookups disabled");
            None
        } else {
            let rpc = RpcClient::new(config.rpc, transport)
                .map_err(|e| AuthError::Configuration(e.to_string()))?;
            Some(EnsResolver::new(
                config.ens,
                rpc,
                Arc::clone(&storage),
                Arc::clone(&clock),
            ))
        };

        Ok(Self {
            nonces: NonceStore::new(storage, config.nonce, Arc::clone(&clock)),
            ens,
            siwe_config: config.siwe,
            clock,
        })
    }

    /// SIWE settings this service was built with
    pub fn siwe_config(&self) -> &SiweConfig {
        &self.siwe_config
    }

    /// Delete expired nonces that were never presented
    pub async fn purge_expired_nonces(&self) -> Result<usize> {
        self.nonces.purge_expired(self.clock.now()).await
    }

    async fn verify_siwe_inner(
        &self,
        raw_message: &str,
        raw_signature: &str,
        claimed_address: &str,
        expected_domain: &str,
        expected_chain_id: u64,
        now: u64,
    ) -> Result<String> {
        // Step 1: Parse (all required fields present and well-formed)
        let message = SiweMessage::parse(raw_message)?;

        // Steps 2-7: Address, domain, chain and time claims
        message.validate_claims(
            claimed_address,
            expected_domain,
            expected_chain_id,
            now,
            self.siwe_config.clock_skew_seconds,
        )?;

        // Step 8: Consume nonce
        if !self
            .nonces
            .validate_and_consume(&message.nonce, &message.address, now)
            .await?
        {
            return Err(AuthError::InvalidNonce);
        }

        // Step 9: Recover signer over the exact signed text
        let signature = parse_signature_hex(raw_signature)
            .map_err(|e| AuthError::InvalidSignatureFormat(e.to_string()))?;

        if self.siwe_config.strict_eip155_chain_id {
            if let Some(chain_id) = signature.eip155_chain_id() {
                if chain_id != expected_chain_id {
                    return Err(AuthError::InvalidSignatureFormat(format!(
                        "signature v implies chain {}, expected {}",
                        chain_id, expected_chain_id
                    )));
                }
            }
        }

        let recovered = recover_signer(message.signing_text().as_bytes(), &signature)
            .map_err(|e| AuthError::InvalidSignatureFormat(e.to_string()))?;

        if !addresses_equal(&recovered, &message.address) {
            return Err(AuthError::SignatureAddressMismatch {
                expected: message.address.to_ascii_lowercase(),
                recovered,
            });
        }

        Ok(recovered)
    }
}

#[async_trait]
impl<S: Storage, T: HttpTransport> Web3Auth for Web3AuthService<S, T> {
    async fn issue_nonce(&self, claimed_address: &str) -> Result<String> {
        self.nonces.issue(claimed_address).await
    }

    async fn validate_and_consume_nonce(
        &self,
        nonce: &str,
        claimed_address: &str,
        now: u64,
    ) -> Result<bool> {
        self.nonces.validate_and_consume(nonce, claimed_address, now).await
    }

    async fn verify_siwe(
        &self,
        raw_message: &str,
        raw_signature: &str,
        claimed_address: &str,
        expected_domain: &str,
        expected_chain_id: u64,
        now: u64,
    ) -> Result<String> {
        info!("Verifying SIWE message for {}", claimed_address);

        match self
            .verify_siwe_inner(
                raw_message,
                raw_signature,
                claimed_address,
                expected_domain,
                expected_chain_id,
                now,
            )
            .await
        {
            Ok(address) => {
                info!("SIWE verification successful for {}", address);
                Ok(address)
            }
            Err(e) => {
                warn!(claimed = %claimed_address, error = %e, "SIWE verification failed");
                Err(e)
            }
        }
    }

    async fn resolve_ens_forward(&self, name: &str) -> Option<String> {
        let Some(ens) = &self.ens else {
            debug!("ENS disabled, skipping forward lookup");
            return None;
        };

        match ens.resolve_forward(name).await {
            Ok(address) => address,
            Err(e) => {
                warn!(name, error = %e, "ENS forward lookup failed");
                None
            }
        }
    }

    async fn resolve_ens_reverse(&self, address: &str) -> Option<String> {
        let Some(ens) = &self.ens else {
            debug!("ENS disabled, skipping reverse lookup");
            return None;
        };

        match ens.resolve_reverse(address).await {
            Ok(name) => name,
            Err(e) => {
                warn!(address, error = %e, "ENS reverse lookup failed");
                None
            }
        }
    }

    async fn clear_ens_cache(&self, identifier: &str) -> Result<()> {
        if let Some(ens) = &self.ens {
            ens.clear_cache(identifier).await?;
        }
        Ok(())
    }

    fn build_siwe_message(
        &self,
        address: &str,
        nonce: &str,
        uri: &str,
        statement: Option<&str>,
    ) -> Result<String> {
        if !is_valid_address(address) {
            return Err(AuthError::InvalidAddress(address.to_string()));
        }

        let now = i64::try_from(self.clock.now())
            .map_err(|_| AuthError::Configuration("clock out of range".to_string()))?;
        let lifetime = i64::try_from(self.nonces.lifetime_seconds())
            .map_err(|_| AuthError::Configuration("nonce lifetime out of range".to_string()))?;

        let timestamp = |secs: i64| {
            DateTime::<Utc>::from_timestamp(secs, 0)
                .ok_or_else(|| AuthError::Configuration(format!("timestamp {} out of range", secs)))
        };

        let mut message = SiweMessage::new(
            self.siwe_config.expected_domain.as_str(),
            address,
            uri,
            nonce,
            timestamp(now)?,
        );
        message.statement = statement.map(str::to_string);
        message.chain_id = Some(self.siwe_config.expected_chain_id);
        message.expiration_time = Some(timestamp(now.saturating_add(lifetime))?);

        // Only hand out text that would pass our own parser
        let text = message.to_message();
        SiweMessage::parse(&text)?;

        Ok(text)
    }
}
