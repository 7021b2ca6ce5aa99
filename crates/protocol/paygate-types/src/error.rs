//! Error classification shared by every Paygate crate.
//!
//! Each crate defines its own error enum; all of them map onto an
//! [`ErrorCode`] so callers can branch on the kind of failure without
//! matching every crate's variants.

use serde::{Deserialize, Serialize};

/// The kind of failure behind an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ErrorCode {
    /// Malformed signing key, missing credentials, bad configuration.
    Configuration,
    /// Request rejected locally before any network activity.
    Validation,
    /// Connection, DNS, or timeout failure.
    Network,
    /// The gateway answered with `success: false`.
    Gateway,
    /// The response body did not match the expected shape.
    Decode,
    /// The caller cancelled the operation.
    Cancelled,
    /// Unexpected internal state (lock poisoning, I/O on local files).
    Internal,
}

impl ErrorCode {
    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration",
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Gateway => "gateway",
            Self::Decode => "decode",
            Self::Cancelled => "cancelled",
            Self::Internal => "internal",
        }
    }

    /// Only network failures may succeed unchanged on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network)
    }

    /// Relative severity, higher is worse.
    ///
    /// A decode failure means client and server disagree about the contract,
    /// so it ranks above a gateway rejection.
    pub fn severity(&self) -> u8 {
        match self {
            Self::Cancelled => 0,
            Self::Validation => 1,
            Self::Gateway => 2,
            Self::Network => 2,
            Self::Configuration => 3,
            Self::Decode => 4,
            Self::Internal => 4,
        }
    }

    /// A user-facing hint for recovering from this kind of error.
    pub fn suggestion(&self) -> &'static str {
        match self {
            Self::Configuration => "Check the API key, bearer token, and hex signing key.",
            Self::Validation => "Correct the request and resubmit.",
            Self::Network => "Check connectivity to the gateway and retry.",
            Self::Gateway => "Inspect the gateway response for the rejection reason.",
            Self::Decode => "The gateway response format changed; upgrade the SDK.",
            Self::Cancelled => "The operation was cancelled by the caller.",
            Self::Internal => "This is an internal error; please report it.",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_retryable() {
        assert!(ErrorCode::Network.is_retryable());
        for code in [
            ErrorCode::Configuration,
            ErrorCode::Validation,
            ErrorCode::Gateway,
            ErrorCode::Decode,
            ErrorCode::Cancelled,
            ErrorCode::Internal,
        ] {
            assert!(!code.is_retryable(), "{code} should not be retryable");
        }
    }

    #[test]
    fn test_decode_outranks_gateway() {
        assert!(ErrorCode::Decode.severity() > ErrorCode::Gateway.severity());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&ErrorCode::Configuration).unwrap();
        assert_eq!(json, "\"configuration\"");
    }
}
