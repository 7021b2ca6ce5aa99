//! Gateway transport trait and its reqwest implementation.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use paygate_auth::sign_headers;
use paygate_types::Acknowledgement;

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};

/// Signed JSON calls to the gateway.
///
/// Paths are relative to `/api` (for example `/charge`, or
/// `/terminal-route?terminal=T1`). `test` selects the test gateway host.
/// Implementations never retry.
#[async_trait]
pub trait GatewayTransport: Send + Sync {
    /// Issue a signed GET and return the decoded JSON body.
    async fn get(&self, path: &str, test: bool) -> GatewayResult<Value>;

    /// Issue a signed POST with a JSON body and return the decoded JSON body.
    async fn post(&self, path: &str, body: Value, test: bool) -> GatewayResult<Value>;
}

/// [`GatewayTransport`] over HTTP.
#[derive(Clone)]
pub struct HttpGateway {
    /// HTTP client
    client: Client,
    /// Hosts, scheme and credentials
    config: GatewayConfig,
}

impl HttpGateway {
    /// Create a transport from a configuration.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        if config.host.is_empty() {
            return Err(GatewayError::config("gateway host is empty"));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// The configuration this transport was built with.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        test: bool,
    ) -> GatewayResult<Value> {
        let url = self.config.url(path, test);
        let signed = sign_headers(&self.config.credentials)?;

        debug!(method = %method, url = %url, "Sending gateway request");

        let mut request = self.client.request(method.clone(), &url);
        for (key, value) in &signed.headers {
            request = request.header(key.as_str(), value.as_str());
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(method = %method, url = %url, status = %status, "Gateway returned error status");
            return Err(non_success(status, text));
        }

        if text.trim().is_empty() {
            return Err(GatewayError::decode("empty response body"));
        }

        serde_json::from_str(&text)
            .map_err(|e| GatewayError::decode(format!("invalid JSON from {}: {}", url, e)))
    }
}

/// Map a non-2xx response: an acknowledgement body becomes `Rejected`,
/// anything else `Http`.
fn non_success(status: StatusCode, text: String) -> GatewayError {
    if let Ok(body) = serde_json::from_str::<Value>(&text) {
        if let Ok(ack) = serde_json::from_value::<Acknowledgement>(body.clone()) {
            if !ack.success {
                return GatewayError::rejected(ack.reason(), body);
            }
        }
    }
    GatewayError::Http {
        status: status.as_u16(),
        body: text,
    }
}

#[async_trait]
impl GatewayTransport for HttpGateway {
    async fn get(&self, path: &str, test: bool) -> GatewayResult<Value> {
        self.execute(Method::GET, path, None, test).await
    }

    async fn post(&self, path: &str, body: Value, test: bool) -> GatewayResult<Value> {
        self.execute(Method::POST, path, Some(body), test).await
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("base_url", &self.config.base_url(false))
            .field("test_base_url", &self.config.base_url(true))
            .field("timeout", &self.config.timeout)
            .finish()
    }
}
