//! Full stack over HTTP against a local mock gateway.

use httpmock::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use paygate_client::{Client, ClientConfig, ClientError};
use paygate_route::{FileRouteCache, RouteCache};
use paygate_types::TransactionRequest;

fn config_for(server: &MockServer) -> ClientConfig {
    let mut config = ClientConfig::default();
    config.gateway.host = server.address().to_string();
    config.gateway.test_host = format!("{}/sandbox", server.address());
    config.gateway.https = false;
    config.gateway.timeout_secs = 5;
    config.credentials.api_key = "K".into();
    config.credentials.bearer_token = "B".into();
    config.credentials.signing_key = "aa".repeat(32);
    config
}

#[tokio::test]
async fn terminal_charge_resolves_once_and_relays() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(Method::GET)
            .path("/api/terminal-route")
            .query_param("terminal", "Front Counter")
            .header_exists("authorization");
        then.status(200).json_body(json!({
            "success": true,
            "terminalName": "Front Counter",
            "ipAddress": "192.168.1.40",
            "cloudRelayEnabled": true,
            "publicKey": "pk-1"
        }));
    });
    let relay = server.mock(|when, then| {
        when.method(Method::POST)
            .path("/api/terminal-charge")
            .json_body(json!({"terminalName": "Front Counter", "amount": "25.00"}));
        then.status(200)
            .json_body(json!({"success": true, "approved": true, "transactionId": "TX1"}));
    });

    let dir = TempDir::new().unwrap();
    let cache_file = dir.path().join("routes.json");
    let mut config = config_for(&server);
    config.routes.cache_file = Some(cache_file.clone());
    let client = Client::from_config(&config).unwrap();

    let request = TransactionRequest::for_terminal("Front Counter", "25.00");
    let first = client.charge(&request).await.unwrap();
    let second = client.charge(&request).await.unwrap();

    assert_eq!(first.transaction_id, "TX1");
    assert!(second.approved);
    lookup.assert_hits(1);
    relay.assert_hits(2);

    // The route was persisted for the next process.
    let persisted = FileRouteCache::open(&cache_file).get("Front Counter").unwrap();
    assert_eq!(persisted.unwrap().public_key, "pk-1");
}

#[tokio::test]
async fn token_charge_goes_direct_to_test_gateway() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(Method::GET).path("/api/terminal-route");
        then.status(200).json_body(json!({"success": false}));
    });
    let charge = server.mock(|when, then| {
        when.method(Method::POST)
            .path("/sandbox/api/charge")
            .header_exists("nonce")
            .header_exists("timestamp");
        then.status(200)
            .json_body(json!({"success": true, "approved": true, "authCode": "A1"}));
    });

    let client = Client::from_config(&config_for(&server)).unwrap();
    let request = TransactionRequest {
        terminal_name: "Front Counter".into(),
        ..TransactionRequest::for_token("tok_1", "5.00").with_test(true)
    };

    let response = client.charge(&request).await.unwrap();
    assert_eq!(response.auth_code, "A1");
    charge.assert();
    lookup.assert_hits(0);
}

#[tokio::test]
async fn rejected_lookup_then_recovery() {
    let server = MockServer::start();
    let mut offline = server.mock(|when, then| {
        when.method(Method::GET).path("/api/terminal-route");
        then.status(200)
            .json_body(json!({"success": false, "error": "Unknown Terminal"}));
    });

    let dir = TempDir::new().unwrap();
    let mut config = config_for(&server);
    config.routes.cache_file = Some(dir.path().join("routes.json"));
    let client = Client::from_config(&config).unwrap();

    let err = client.route("Back Office").await.unwrap_err();
    assert!(matches!(err, ClientError::Route(_)));
    offline.assert_hits(1);
    offline.delete();

    let online = server.mock(|when, then| {
        when.method(Method::GET).path("/api/terminal-route");
        then.status(200).json_body(json!({
            "success": true,
            "terminalName": "Back Office",
            "ipAddress": "192.168.1.41"
        }));
    });

    let route = client.route("Back Office").await.unwrap();
    assert_eq!(route.ip_address, "192.168.1.41");
    online.assert_hits(1);
}

#[tokio::test]
async fn heartbeat_checks_credentials() {
    let server = MockServer::start();
    let heartbeat = server.mock(|when, then| {
        when.method(Method::GET).path("/api/heartbeat");
        then.status(200).json_body(json!({"success": true}));
    });

    let client = Client::from_config(&config_for(&server)).unwrap();
    assert!(client.heartbeat(false).await.unwrap().success);
    heartbeat.assert();
}

#[test]
fn from_config_validates_credentials() {
    let mut config = ClientConfig::default();
    config.credentials.api_key = "K".into();
    config.credentials.bearer_token = "B".into();
    config.credentials.signing_key = "not-hex".into();

    let err = Client::from_config(&config).unwrap_err();
    assert!(matches!(err, ClientError::Config(_)));
}

#[tokio::test]
async fn test_terminal_charge_relays_through_test_gateway() {
    let server = MockServer::start();
    let lookup = server.mock(|when, then| {
        when.method(Method::GET)
            .path("/api/terminal-route")
            .query_param("terminal", "Patio");
        then.status(200).json_body(json!({
            "success": true,
            "terminalName": "Patio",
            "ipAddress": "192.168.1.42"
        }));
    });
    let live_relay = server.mock(|when, then| {
        when.method(Method::POST).path("/api/terminal-charge");
        then.status(200).json_body(json!({"success": true, "approved": true}));
    });
    let test_relay = server.mock(|when, then| {
        when.method(Method::POST)
            .path("/sandbox/api/terminal-charge")
            .json_body(json!({"test": true, "terminalName": "Patio", "amount": "3.00"}));
        then.status(200)
            .json_body(json!({"success": true, "approved": true, "transactionId": "TX-T"}));
    });

    let dir = TempDir::new().unwrap();
    let mut config = config_for(&server);
    config.routes.cache_file = Some(dir.path().join("routes.json"));
    let client = Client::from_config(&config).unwrap();

    let request = TransactionRequest::for_terminal("Patio", "3.00").with_test(true);
    let response = client.charge(&request).await.unwrap();

    assert_eq!(response.transaction_id, "TX-T");
    lookup.assert_hits(1);
    test_relay.assert_hits(1);
    live_relay.assert_hits(0);
}
