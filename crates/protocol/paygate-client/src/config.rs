//! Client configuration.
//!
//! Loaded from TOML, with `${VAR}` references in credential strings expanded
//! from the environment and `PAYGATE_*` variables applied on top:
//!
//! ```toml
//! [gateway]
//! host = "api.paygate.io"
//! test_host = "test.paygate.io"
//! https = true
//! timeout_secs = 60
//!
//! [routes]
//! cache_ttl_minutes = 60
//! # cache_file = "/var/lib/paygate/routes.json"
//!
//! [credentials]
//! api_key = "${PAYGATE_API_KEY}"
//! bearer_token = "${PAYGATE_BEARER_TOKEN}"
//! signing_key = "${PAYGATE_SIGNING_KEY}"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use regex::Regex;
use serde::{Deserialize, Serialize};

use paygate_gateway::GatewayConfig;
use paygate_types::constants::{DEFAULT_GATEWAY_HOST, DEFAULT_TEST_GATEWAY_HOST};
use paygate_types::Credentials;

use crate::error::{ClientError, ClientResult};

/// Replace `${VAR}` with the variable's value; unknown variables are kept.
fn expand_vars_with(input: &str, lookup: &dyn Fn(&str) -> Option<String>) -> ClientResult<String> {
    let re = Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}")
        .map_err(|e| ClientError::config(format!("bad expansion pattern: {}", e)))?;
    Ok(re
        .replace_all(input, |caps: &regex::Captures| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .to_string())
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Client configuration loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Gateway endpoints.
    pub gateway: GatewaySection,
    /// Route cache settings.
    pub routes: RoutesSection,
    /// API credentials.
    pub credentials: CredentialsSection,
}

/// `[gateway]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewaySection {
    /// Live gateway host.
    pub host: String,
    /// Test gateway host.
    pub test_host: String,
    /// Use HTTPS.
    pub https: bool,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            host: DEFAULT_GATEWAY_HOST.to_string(),
            test_host: DEFAULT_TEST_GATEWAY_HOST.to_string(),
            https: true,
            timeout_secs: 60,
        }
    }
}

/// `[routes]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutesSection {
    /// Minutes a resolved route is served from the cache.
    pub cache_ttl_minutes: u64,
    /// Persist routes to this file instead of the in-memory cache.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_file: Option<PathBuf>,
}

impl Default for RoutesSection {
    fn default() -> Self {
        Self {
            cache_ttl_minutes: 60,
            cache_file: None,
        }
    }
}

/// `[credentials]` section.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialsSection {
    pub api_key: String,
    pub bearer_token: String,
    pub signing_key: String,
}

impl std::fmt::Debug for CredentialsSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsSection")
            .field("api_key", &self.api_key)
            .field("bearer_token", &"<redacted>")
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file.
    ///
    /// A missing file yields the defaults. Environment overrides are not
    /// applied; call [`apply_env`](Self::apply_env) for that.
    pub fn load(path: &Path) -> ClientResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Load from the default location, then apply environment overrides.
    pub fn load_default() -> ClientResult<Self> {
        let mut config = Self::load(&default_config_path())?;
        config.apply_env()?;
        Ok(config)
    }

    /// Parse configuration from a TOML string and expand `${VAR}` references
    /// in the credentials.
    pub fn from_toml_str(contents: &str) -> ClientResult<Self> {
        let mut config: Self = toml::from_str(contents)?;
        config.expand_credentials(&env_lookup)?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> ClientResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)
            .map_err(|e| ClientError::config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply `PAYGATE_*` environment overrides.
    pub fn apply_env(&mut self) -> ClientResult<()> {
        self.apply_overrides(&env_lookup)
    }

    fn expand_credentials(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> ClientResult<()> {
        let creds = &mut self.credentials;
        creds.api_key = expand_vars_with(&creds.api_key, lookup)?;
        creds.bearer_token = expand_vars_with(&creds.bearer_token, lookup)?;
        creds.signing_key = expand_vars_with(&creds.signing_key, lookup)?;
        Ok(())
    }

    fn apply_overrides(&mut self, lookup: &dyn Fn(&str) -> Option<String>) -> ClientResult<()> {
        if let Some(host) = lookup("PAYGATE_GATEWAY_HOST") {
            self.gateway.host = host;
        }
        if let Some(host) = lookup("PAYGATE_TEST_GATEWAY_HOST") {
            self.gateway.test_host = host;
        }
        if let Some(https) = lookup("PAYGATE_HTTPS") {
            self.gateway.https = parse_bool("PAYGATE_HTTPS", &https)?;
        }
        if let Some(secs) = lookup("PAYGATE_TIMEOUT_SECONDS") {
            self.gateway.timeout_secs = parse_u64("PAYGATE_TIMEOUT_SECONDS", &secs)?;
        }
        if let Some(minutes) = lookup("PAYGATE_ROUTE_CACHE_TTL_MINUTES") {
            self.routes.cache_ttl_minutes = parse_u64("PAYGATE_ROUTE_CACHE_TTL_MINUTES", &minutes)?;
        }
        if let Some(file) = lookup("PAYGATE_ROUTE_CACHE_FILE") {
            self.routes.cache_file = if file.is_empty() {
                None
            } else {
                Some(PathBuf::from(file))
            };
        }
        if let Some(key) = lookup("PAYGATE_API_KEY") {
            self.credentials.api_key = key;
        }
        if let Some(token) = lookup("PAYGATE_BEARER_TOKEN") {
            self.credentials.bearer_token = token;
        }
        if let Some(key) = lookup("PAYGATE_SIGNING_KEY") {
            self.credentials.signing_key = key;
        }
        Ok(())
    }

    /// Check that the configuration can sign requests.
    pub fn validate(&self) -> ClientResult<()> {
        let creds = &self.credentials;
        if creds.api_key.is_empty() {
            return Err(ClientError::config("api_key is not set"));
        }
        if creds.bearer_token.is_empty() {
            return Err(ClientError::config("bearer_token is not set"));
        }
        if creds.signing_key.is_empty() {
            return Err(ClientError::config("signing_key is not set"));
        }
        if hex::decode(&creds.signing_key).is_err() {
            return Err(ClientError::config("signing_key is not valid hex"));
        }
        if self.gateway.host.is_empty() {
            return Err(ClientError::config("gateway.host is empty"));
        }
        if self.gateway.timeout_secs == 0 {
            return Err(ClientError::config("gateway.timeout_secs must be positive"));
        }
        paygate_route::validate_ttl(self.route_ttl()).map_err(|e| {
            ClientError::config(format!(
                "routes.cache_ttl_minutes = {} is out of range: {}",
                self.routes.cache_ttl_minutes, e
            ))
        })?;
        Ok(())
    }

    /// API credentials.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(
            self.credentials.api_key.clone(),
            self.credentials.bearer_token.clone(),
            self.credentials.signing_key.clone(),
        )
    }

    /// Gateway transport configuration.
    pub fn gateway_config(&self) -> GatewayConfig {
        GatewayConfig::new(self.credentials())
            .with_host(self.gateway.host.clone())
            .with_test_host(self.gateway.test_host.clone())
            .with_https(self.gateway.https)
            .with_timeout(Duration::from_secs(self.gateway.timeout_secs))
    }

    /// Route cache TTL.
    pub fn route_ttl(&self) -> Duration {
        Duration::from_secs(self.routes.cache_ttl_minutes.saturating_mul(60))
    }
}

fn parse_bool(key: &str, value: &str) -> ClientResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ClientError::config(format!("{} must be a boolean, got {:?}", key, value))),
    }
}

fn parse_u64(key: &str, value: &str) -> ClientResult<u64> {
    value.trim().parse().map_err(|_| {
        ClientError::config(format!("{} must be a whole number, got {:?}", key, value))
    })
}

/// Base directory for SDK files.
///
/// Resolution order:
/// 1. `PAYGATE_HOME` environment variable
/// 2. Platform data directory (e.g. `~/.local/share/paygate` on Linux)
/// 3. `~/.paygate`
pub fn default_base_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("PAYGATE_HOME") {
        return PathBuf::from(dir);
    }

    directories::ProjectDirs::from("io", "paygate", "paygate")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| {
            std::env::var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("."))
                .join(".paygate")
        })
}

/// Get the default config file path.
pub fn default_config_path() -> PathBuf {
    default_base_dir().join("config.toml")
}
