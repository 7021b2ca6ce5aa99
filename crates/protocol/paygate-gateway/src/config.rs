//! Gateway transport configuration.

use std::time::Duration;

use paygate_types::constants::{
    API_PREFIX, DEFAULT_GATEWAY_HOST, DEFAULT_TEST_GATEWAY_HOST, DEFAULT_TIMEOUT,
};
use paygate_types::Credentials;

/// Where and how to reach the gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Live gateway host, optionally with a port.
    pub host: String,
    /// Test gateway host, used when a call sets `test`.
    pub test_host: String,
    /// Use `https` (true) or `http` (false).
    pub https: bool,
    /// Per-call timeout applied by the HTTP client.
    pub timeout: Duration,
    /// Credentials every request is signed with.
    pub credentials: Credentials,
}

impl GatewayConfig {
    /// Default hosts over HTTPS with the given credentials.
    pub fn new(credentials: Credentials) -> Self {
        Self {
            host: DEFAULT_GATEWAY_HOST.to_string(),
            test_host: DEFAULT_TEST_GATEWAY_HOST.to_string(),
            https: true,
            timeout: DEFAULT_TIMEOUT,
            credentials,
        }
    }

    /// Set the live gateway host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the test gateway host.
    pub fn with_test_host(mut self, host: impl Into<String>) -> Self {
        self.test_host = host.into();
        self
    }

    /// Toggle HTTPS.
    pub fn with_https(mut self, https: bool) -> Self {
        self.https = https;
        self
    }

    /// Set the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `{scheme}://{host}/api` for the live or test gateway.
    pub fn base_url(&self, test: bool) -> String {
        let scheme = if self.https { "https" } else { "http" };
        let host = if test { &self.test_host } else { &self.host };
        format!("{}://{}{}", scheme, host.trim_end_matches('/'), API_PREFIX)
    }

    /// Full URL for an API path such as `/charge`.
    pub fn url(&self, path: &str, test: bool) -> String {
        format!("{}/{}", self.base_url(test), path.trim_start_matches('/'))
    }
}
