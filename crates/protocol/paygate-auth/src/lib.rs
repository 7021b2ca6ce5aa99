//! Request signing for the Paygate gateway API.
//!
//! Every gateway call carries three headers computed from the caller's
//! [`Credentials`], the current time, and a fresh random nonce:
//!
//! ```text
//! Nonce: <64 hex chars>
//! Timestamp: <RFC 3339 UTC, second precision>
//! Authorization: Dual <bearerToken>:<apiKey>:<signature>
//! ```
//!
//! The signature is `hex(HMAC_SHA256(hex_decode(signingKey),
//! apiKey || bearerToken || timestamp || nonce))`.
//!
//! # Example
//!
//! ```rust
//! use paygate_auth::sign_headers;
//! use paygate_types::Credentials;
//!
//! let creds = Credentials::new("api-key", "bearer", "aa".repeat(32));
//! let signed = sign_headers(&creds).unwrap();
//!
//! for (key, value) in &signed.headers {
//!     // request.header(key, value);
//! #   let _ = (key, value);
//! }
//! assert_eq!(signed.nonce.len(), 64);
//! ```

use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use rand::{rngs::OsRng, RngCore};
use sha2::Sha256;

use paygate_types::constants::{
    AUTH_SCHEME, HEADER_AUTHORIZATION, HEADER_NONCE, HEADER_TIMESTAMP, NONCE_LEN,
};
use paygate_types::Credentials;

pub mod error;

pub use error::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

/// Signed headers for one outbound request.
///
/// Built fresh per call and discarded once the call completes.
#[derive(Debug, Clone)]
pub struct SignedHeaders {
    /// RFC 3339 timestamp used in the signature.
    pub timestamp: String,
    /// Hex-encoded nonce used in the signature.
    pub nonce: String,
    /// Hex-encoded HMAC-SHA256 signature.
    pub signature: String,
    /// Header key/value pairs.
    pub headers: Vec<(String, String)>,
}

/// Sign a request with the current time and a fresh nonce.
pub fn sign_headers(credentials: &Credentials) -> AuthResult<SignedHeaders> {
    sign_headers_at(credentials, Utc::now(), generate_nonce())
}

/// Sign a request with an explicit timestamp and nonce.
pub fn sign_headers_at(
    credentials: &Credentials,
    timestamp: DateTime<Utc>,
    nonce: [u8; NONCE_LEN],
) -> AuthResult<SignedHeaders> {
    if credentials.api_key().is_empty() {
        return Err(AuthError::missing_credentials("api key is empty"));
    }
    if credentials.bearer_token().is_empty() {
        return Err(AuthError::missing_credentials("bearer token is empty"));
    }
    if credentials.signing_key().is_empty() {
        return Err(AuthError::missing_credentials("signing key is empty"));
    }

    let timestamp = format_timestamp(timestamp);
    let nonce = hex::encode(nonce);
    let signature = sign(credentials, &timestamp, &nonce)?;

    let authorization = format!(
        "{} {}:{}:{}",
        AUTH_SCHEME,
        credentials.bearer_token(),
        credentials.api_key(),
        signature
    );

    let headers = vec![
        (HEADER_NONCE.to_string(), nonce.clone()),
        (HEADER_TIMESTAMP.to_string(), timestamp.clone()),
        (HEADER_AUTHORIZATION.to_string(), authorization),
    ];

    Ok(SignedHeaders {
        timestamp,
        nonce,
        signature,
        headers,
    })
}

/// Compute the hex signature for a timestamp and hex nonce.
///
/// Deterministic: identical inputs always yield the same signature.
pub fn sign(credentials: &Credentials, timestamp: &str, nonce: &str) -> AuthResult<String> {
    let key = decode_signing_key(credentials.signing_key())?;
    let message = build_message(credentials, timestamp, nonce);

    let mut mac = HmacSha256::new_from_slice(&key)
        .map_err(|e| AuthError::malformed_signing_key(e.to_string()))?;
    mac.update(&message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verify a hex signature against the credentials, in constant time.
pub fn verify_signature(
    credentials: &Credentials,
    timestamp: &str,
    nonce: &str,
    signature: &str,
) -> bool {
    let Ok(key) = decode_signing_key(credentials.signing_key()) else {
        return false;
    };
    let Ok(provided) = hex::decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(&key) else {
        return false;
    };
    mac.update(&build_message(credentials, timestamp, nonce));
    mac.verify_slice(&provided).is_ok()
}

/// Generate a nonce from the operating system's CSPRNG.
pub fn generate_nonce() -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Format a timestamp as RFC 3339 UTC with second precision, e.g.
/// `2024-01-01T00:00:00Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn decode_signing_key(signing_key: &str) -> AuthResult<Vec<u8>> {
    hex::decode(signing_key).map_err(|e| AuthError::malformed_signing_key(e.to_string()))
}

fn build_message(credentials: &Credentials, timestamp: &str, nonce: &str) -> Vec<u8> {
    let capacity = credentials.api_key().len()
        + credentials.bearer_token().len()
        + timestamp.len()
        + nonce.len();
    let mut message = Vec::with_capacity(capacity);
    message.extend_from_slice(credentials.api_key().as_bytes());
    message.extend_from_slice(credentials.bearer_token().as_bytes());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(nonce.as_bytes());
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn creds() -> Credentials {
        Credentials::new("K", "B", "aa".repeat(32))
    }

    #[test]
    fn test_sign_headers_shape() {
        let signed = sign_headers(&creds()).unwrap();

        let keys: Vec<&str> = signed.headers.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Nonce", "Timestamp", "Authorization"]);
        assert_eq!(signed.nonce.len(), 64);
        assert_eq!(signed.signature.len(), 64);
        assert!(signed.timestamp.ends_with('Z'));

        let auth = &signed.headers[2].1;
        assert_eq!(auth, &format!("Dual B:K:{}", signed.signature));
    }

    #[test]
    fn test_format_timestamp_second_precision() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
            + chrono::Duration::milliseconds(750);
        assert_eq!(format_timestamp(ts), "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_malformed_signing_key() {
        let bad = Credentials::new("K", "B", "not-hex");
        let err = sign(&bad, "2024-01-01T00:00:00Z", "00").unwrap_err();
        assert!(matches!(err, AuthError::MalformedSigningKey(_)));

        let odd = Credentials::new("K", "B", "abc");
        assert!(sign_headers(&odd).is_err());
    }

    #[test]
    fn test_missing_credentials() {
        let missing = Credentials::new("", "B", "aa");
        let err = sign_headers(&missing).unwrap_err();
        assert!(matches!(err, AuthError::MissingCredentials(_)));
    }

    #[test]
    fn test_verify_signature() {
        let signed = sign_headers(&creds()).unwrap();
        assert!(verify_signature(
            &creds(),
            &signed.timestamp,
            &signed.nonce,
            &signed.signature
        ));

        // Wrong key
        let other = Credentials::new("K", "B", "bb".repeat(32));
        assert!(!verify_signature(
            &other,
            &signed.timestamp,
            &signed.nonce,
            &signed.signature
        ));

        // Not hex
        assert!(!verify_signature(
            &creds(),
            &signed.timestamp,
            &signed.nonce,
            "zz"
        ));
    }

    #[test]
    fn test_generate_nonce_not_constant() {
        assert_ne!(generate_nonce(), generate_nonce());
    }
}
