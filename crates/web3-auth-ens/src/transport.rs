//! HTTP transport used by the JSON-RPC client.

use crate::errors::TransportError;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Outbound JSON POST capability
///
/// The default implementation is [`ReqwestTransport`]; hosts and tests can
/// substitute their own.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `body` as JSON to `url` and parse the JSON response
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError>;
}

/// `reqwest`-backed transport
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    http_client: Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh connection pool
    pub fn new() -> Self {
        Self {
            http_client: Client::new(),
        }
    }

    /// Reuse an existing client (shared pool, proxies, TLS settings)
    pub fn with_client(http_client: Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        let response = self
            .http_client
            .post(url)
            .timeout(timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::InvalidBody(e.to_string()))
    }
}
