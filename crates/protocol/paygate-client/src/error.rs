//! Error types for the client facade.

use paygate_gateway::GatewayError;
use paygate_route::RouteError;
use paygate_types::ErrorCode;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors returned by [`Client`](crate::Client) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request was rejected locally, before any network activity.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The client is misconfigured.
    #[error("configuration error: {0}")]
    Config(String),

    /// A gateway call failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// Route resolution failed.
    #[error(transparent)]
    Route(#[from] RouteError),

    /// A terminal transport failed outside the gateway.
    #[error("terminal error: {0}")]
    Terminal(String),

    /// The call was cancelled before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// I/O error reading configuration.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file is not valid TOML.
    #[error("config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// A request body could not be encoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ClientError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a terminal error.
    pub fn terminal(msg: impl Into<String>) -> Self {
        Self::Terminal(msg.into())
    }

    /// Error classification.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::Config(_) | Self::Io(_) | Self::Toml(_) => ErrorCode::Configuration,
            Self::Gateway(e) => e.code(),
            Self::Route(e) => e.code(),
            Self::Terminal(_) => ErrorCode::Network,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Serialization(_) => ErrorCode::Internal,
        }
    }

    /// Returns true if the call may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::Validation(_) => "Correct the request and resubmit",
            Self::Config(_) => "Check the client configuration and credentials",
            Self::Gateway(e) => e.suggestion(),
            Self::Route(e) => e.suggestion(),
            Self::Terminal(_) => "Check that the terminal is powered on and reachable",
            Self::Cancelled => "Retry the call if the result is still needed",
            Self::Io(_) => "Check that the config file exists and is readable",
            Self::Toml(_) => "Fix the syntax error in the config file",
            Self::Serialization(_) => "This is an internal error; please report it",
        }
    }
}
