//! Error types for request signing.

use paygate_types::ErrorCode;
use thiserror::Error;

/// Result type for signing operations.
pub type AuthResult<T> = Result<T, AuthError>;

/// Errors that can occur while signing a request.
///
/// Both variants are configuration errors: they are fatal to the call and
/// never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// The signing key is not valid hex.
    #[error("malformed signing key: {0}")]
    MalformedSigningKey(String),

    /// One or more credential parts are empty.
    #[error("missing credentials: {0}")]
    MissingCredentials(String),
}

impl AuthError {
    /// Create a new MalformedSigningKey error.
    pub fn malformed_signing_key(reason: impl Into<String>) -> Self {
        Self::MalformedSigningKey(reason.into())
    }

    /// Create a new MissingCredentials error.
    pub fn missing_credentials(what: impl Into<String>) -> Self {
        Self::MissingCredentials(what.into())
    }

    /// Error classification.
    pub fn code(&self) -> ErrorCode {
        ErrorCode::Configuration
    }
}
