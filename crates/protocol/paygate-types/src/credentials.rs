//! API credentials.

use serde::{Deserialize, Serialize};

/// The triple that identifies a caller to the gateway.
///
/// Credentials are created once and never mutated. The signing key is
/// hex-encoded HMAC key material; it is used to compute request signatures
/// and is never transmitted.
///
/// The same shape is used for the transient, route-scoped credentials a
/// terminal route lookup may return.
#[derive(Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    api_key: String,
    bearer_token: String,
    signing_key: String,
}

impl Credentials {
    /// Create a new credential triple.
    pub fn new(
        api_key: impl Into<String>,
        bearer_token: impl Into<String>,
        signing_key: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            bearer_token: bearer_token.into(),
            signing_key: signing_key.into(),
        }
    }

    /// The public API key.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// The bearer token.
    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    /// The hex-encoded signing key.
    pub fn signing_key(&self) -> &str {
        &self.signing_key
    }

    /// Returns true if all three parts are present.
    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.bearer_token.is_empty() && !self.signing_key.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &self.api_key)
            .field("bearer_token", &"<redacted>")
            .field("signing_key", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_secrets() {
        let creds = Credentials::new("KEY", "BEARER-SECRET", "deadbeef");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("KEY"));
        assert!(!debug.contains("BEARER-SECRET"));
        assert!(!debug.contains("deadbeef"));
    }

    #[test]
    fn test_is_complete() {
        assert!(Credentials::new("k", "b", "aa").is_complete());
        assert!(!Credentials::new("k", "", "aa").is_complete());
        assert!(!Credentials::default().is_complete());
    }

    #[test]
    fn test_camel_case_json() {
        let creds: Credentials = serde_json::from_str(
            r#"{"apiKey":"K","bearerToken":"B","signingKey":"aa"}"#,
        )
        .unwrap();
        assert_eq!(creds.api_key(), "K");
        assert_eq!(creds.bearer_token(), "B");
        assert_eq!(creds.signing_key(), "aa");
    }
}
