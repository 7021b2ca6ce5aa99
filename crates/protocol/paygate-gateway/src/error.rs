//! Error types for gateway calls.

use paygate_auth::AuthError;
use paygate_types::ErrorCode;
use serde_json::Value;
use thiserror::Error;

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while calling the gateway.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The transport could not be configured.
    #[error("gateway configuration error: {0}")]
    Config(String),

    /// The request could not be signed.
    #[error("request signing failed: {0}")]
    Auth(#[from] AuthError),

    /// Connection, DNS or timeout failure.
    #[error("gateway unreachable: {0}")]
    Network(String),

    /// The gateway answered with `success: false`.
    #[error("gateway rejected request: {reason}")]
    Rejected {
        /// Reason reported by the gateway
        reason: String,
        /// Full response body
        body: Value,
    },

    /// Non-success HTTP status without a decodable acknowledgement.
    #[error("gateway returned HTTP {status}: {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("failed to decode gateway response: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Create a new Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Network error.
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a new Rejected error.
    pub fn rejected(reason: impl Into<String>, body: Value) -> Self {
        Self::Rejected {
            reason: reason.into(),
            body,
        }
    }

    /// Create a new Decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Error classification.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Config(_) | Self::Auth(_) => ErrorCode::Configuration,
            Self::Network(_) => ErrorCode::Network,
            Self::Rejected { .. } | Self::Http { .. } => ErrorCode::Gateway,
            Self::Decode(_) => ErrorCode::Decode,
        }
    }

    /// Returns true if the call may succeed when retried by the caller.
    ///
    /// Nothing in this crate retries on its own.
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::Config(_) => "Check the gateway host and timeout settings",
            Self::Auth(_) => "Check the API key, bearer token and signing key",
            Self::Network(_) => "Check network connectivity to the gateway and retry",
            Self::Rejected { .. } => "Inspect the response body for the gateway's reason",
            Self::Http { .. } => "Check the gateway host and request path",
            Self::Decode(_) => {
                "Client and gateway disagree on the response format; upgrade the SDK"
            }
        }
    }

    /// The response body of a rejected call, if any.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Rejected { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            Self::Config(e.to_string())
        } else if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}
