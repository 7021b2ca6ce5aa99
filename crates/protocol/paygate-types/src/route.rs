//! Terminal route records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::credentials::Credentials;

/// Last known network location and session trust material for one terminal.
///
/// `public_key` and `raw_key` are opaque: they are cached and handed back to
/// callers unchanged, and nothing in this SDK interprets them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteRecord {
    /// Terminal name the route was resolved for.
    pub terminal_name: String,

    /// IP address on the merchant's local network.
    pub ip_address: String,

    /// Whether the terminal must be reached through the cloud relay.
    #[serde(default)]
    pub cloud_relay_enabled: bool,

    /// Short-lived credentials scoped to this terminal interaction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transient_credentials: Option<Credentials>,

    /// Terminal public key (opaque).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub public_key: String,

    /// Raw terminal key material (opaque).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub raw_key: Value,
}

impl RouteRecord {
    /// Create a directly reachable route with no transient credentials.
    pub fn new(terminal_name: impl Into<String>, ip_address: impl Into<String>) -> Self {
        Self {
            terminal_name: terminal_name.into(),
            ip_address: ip_address.into(),
            ..Default::default()
        }
    }

    /// Mark the route as relayed through the cloud.
    pub fn with_cloud_relay(mut self, enabled: bool) -> Self {
        self.cloud_relay_enabled = enabled;
        self
    }

    /// Attach transient credentials.
    pub fn with_transient_credentials(mut self, credentials: Credentials) -> Self {
        self.transient_credentials = Some(credentials);
        self
    }

    /// Attach opaque public key material.
    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = public_key.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_gateway_shape() {
        let body = json!({
            "terminalName": "Front Counter",
            "ipAddress": "192.168.1.40",
            "cloudRelayEnabled": true,
            "transientCredentials": {
                "apiKey": "TK",
                "bearerToken": "TB",
                "signingKey": "0a0b"
            },
            "publicKey": "pk-abc",
            "rawKey": {"curve": "P256", "x": "01", "y": "02"}
        });

        let route: RouteRecord = serde_json::from_value(body).unwrap();
        assert_eq!(route.terminal_name, "Front Counter");
        assert_eq!(route.ip_address, "192.168.1.40");
        assert!(route.cloud_relay_enabled);
        assert_eq!(
            route.transient_credentials.as_ref().map(|c| c.api_key()),
            Some("TK")
        );
        assert_eq!(route.raw_key["curve"], "P256");
    }

    #[test]
    fn test_optional_fields_default() {
        let route: RouteRecord =
            serde_json::from_value(json!({"terminalName": "T1", "ipAddress": "10.0.0.2"}))
                .unwrap();
        assert!(!route.cloud_relay_enabled);
        assert!(route.transient_credentials.is_none());
        assert!(route.raw_key.is_null());
    }

    #[test]
    fn test_missing_address_is_rejected() {
        let result: Result<RouteRecord, _> =
            serde_json::from_value(json!({"terminalName": "T1"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_optionals_omitted() {
        let encoded = serde_json::to_value(RouteRecord::new("T1", "10.0.0.2")).unwrap();
        let obj = encoded.as_object().unwrap();
        assert!(!obj.contains_key("transientCredentials"));
        assert!(!obj.contains_key("publicKey"));
        assert!(!obj.contains_key("rawKey"));
    }
}
