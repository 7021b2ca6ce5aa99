//! Error types for route resolution and caching.

use paygate_gateway::GatewayError;
use paygate_types::ErrorCode;
use thiserror::Error;

/// Result type for route operations.
pub type RouteResult<T> = Result<T, RouteError>;

/// Errors that can occur while resolving or caching a terminal route.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The route lookup failed at the gateway.
    #[error("route lookup failed: {0}")]
    Gateway(#[from] GatewayError),

    /// The terminal name is empty or blank.
    #[error("invalid terminal name: {0:?}")]
    InvalidTerminalName(String),

    /// The lookup was cancelled before it completed.
    #[error("route lookup cancelled")]
    Cancelled,

    /// The cache backing store failed.
    #[error("route cache error: {0}")]
    Cache(String),

    /// I/O error on a file-backed cache.
    #[error("route cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A cache file could not be encoded.
    #[error("route cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Lock poisoning error.
    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl RouteError {
    /// Create a cache error.
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create a lock poisoned error.
    pub fn lock_poisoned(msg: impl Into<String>) -> Self {
        Self::LockPoisoned(msg.into())
    }

    /// Error classification.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Gateway(e) => e.code(),
            Self::InvalidTerminalName(_) => ErrorCode::Validation,
            Self::Cancelled => ErrorCode::Cancelled,
            Self::Cache(_) | Self::Io(_) | Self::Serialization(_) | Self::LockPoisoned(_) => {
                ErrorCode::Internal
            }
        }
    }

    /// Returns true if the lookup may succeed when retried.
    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }

    /// Returns a user-friendly suggestion for recovering from this error.
    pub fn suggestion(&self) -> &str {
        match self {
            Self::Gateway(e) => e.suggestion(),
            Self::InvalidTerminalName(_) => "Pass the terminal name configured on the device",
            Self::Cancelled => "Retry the lookup if the result is still needed",
            Self::Cache(_) | Self::Io(_) | Self::Serialization(_) => {
                "Check that the route cache file is writable, or expire the cache"
            }
            Self::LockPoisoned(_) => "This is an internal error; please report it",
        }
    }
}
