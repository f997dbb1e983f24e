//! JSON-RPC `eth_call` client with ordered provider failover.

use crate::errors::RpcError;
use crate::transport::HttpTransport;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;
use web3_auth_crypto::{decode_hex_prefixed, encode_hex_prefixed};

/// Default per-attempt timeout
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(10);

/// RPC client configuration
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Endpoints in priority order
    pub providers: Vec<String>,
    /// Upper bound for a single attempt against one provider
    pub timeout: Duration,
}

impl RpcConfig {
    /// Configuration for the given providers with the default timeout
    pub fn new(providers: Vec<String>) -> Self {
        Self {
            providers,
            timeout: DEFAULT_RPC_TIMEOUT,
        }
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// JSON-RPC client
///
/// Holds no failover state between calls: every call walks the provider
/// list from the top.
pub struct RpcClient<T: HttpTransport> {
    providers: Vec<String>,
    timeout: Duration,
    transport: Arc<T>,
    request_id: AtomicU64,
}

impl<T: HttpTransport> RpcClient<T> {
    /// Create a client, validating every provider URL
    pub fn new(config: RpcConfig, transport: Arc<T>) -> Result<Self, RpcError> {
        if config.providers.is_empty() {
            return Err(RpcError::NoProviders);
        }

        for provider in &config.providers {
            Url::parse(provider).map_err(|e| RpcError::InvalidProvider {
                url: provider.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(Self {
            providers: config.providers,
            timeout: config.timeout,
            transport,
            request_id: AtomicU64::new(1),
        })
    }

    /// Configured endpoints in priority order
    pub fn providers(&self) -> &[String] {
        &self.providers
    }

    /// Execute `eth_call` against `to` at the latest block
    ///
    /// Returns the raw `0x`-prefixed hex result of the first provider that
    /// answers with a well-formed response.
    pub async fn call(&self, to: &str, data: &[u8]) -> Result<String, RpcError> {
        let id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [
                { "to": to, "data": encode_hex_prefixed(data) },
                "latest"
            ],
        });

        for provider in &self.providers {
            let label = provider_label(provider);

            let attempt = tokio::time::timeout(
                self.timeout,
                self.transport.post_json(provider, &body, self.timeout),
            )
            .await;

            let response = match attempt {
                Ok(Ok(response)) => response,
                Ok(Err(e)) => {
                    warn!(provider = %label, error = %e, "RPC request failed, trying next provider");
                    continue;
                }
                Err(_) => {
                    warn!(provider = %label, timeout = ?self.timeout, "RPC request timed out, trying next provider");
                    continue;
                }
            };

            match extract_result(&response) {
                Ok(result) => {
                    debug!(provider = %label, "eth_call succeeded");
                    return Ok(result);
                }
                Err(reason) => {
                    warn!(provider = %label, reason = %reason, "RPC response rejected, trying next provider");
                }
            }
        }

        Err(RpcError::AllProvidersExhausted {
            attempts: self.providers.len(),
        })
    }
}

/// Pull a hex `result` out of a JSON-RPC response
fn extract_result(response: &Value) -> Result<String, String> {
    if let Some(error) = response.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or_default();
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(format!("RPC error {}: {}", code, message));
    }

    let result = response
        .get("result")
        .and_then(Value::as_str)
        .ok_or_else(|| "response has no string result".to_string())?;

    if !result.starts_with("0x") {
        return Err("result is not 0x-prefixed".to_string());
    }
    decode_hex_prefixed(result).map_err(|e| format!("result is not hex: {}", e))?;

    Ok(result.to_string())
}

/// Host part of a provider URL; paths often carry API keys
fn provider_label(provider: &str) -> String {
    Url::parse(provider)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_else(|| "<invalid>".to_string())
}
