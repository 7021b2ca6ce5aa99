//! Fixtures shared across test suites.

use paygate_types::{Credentials, RouteRecord, TransactionRequest};

/// Credentials with a valid 32-byte signing key.
pub fn test_credentials() -> Credentials {
    Credentials::new("K", "B", "aa".repeat(32))
}

/// A directly reachable route.
pub fn test_route(terminal_name: &str, ip_address: &str) -> RouteRecord {
    RouteRecord::new(terminal_name, ip_address)
}

/// A relayed route with transient credentials.
pub fn relayed_route(terminal_name: &str) -> RouteRecord {
    RouteRecord::new(terminal_name, "")
        .with_cloud_relay(true)
        .with_transient_credentials(Credentials::new("TK", "TB", "bb".repeat(32)))
}

/// A request collected by a terminal.
pub fn terminal_request(terminal_name: &str) -> TransactionRequest {
    TransactionRequest::for_terminal(terminal_name, "10.00")
}

/// A request against an enrolled token.
pub fn token_request(token: &str) -> TransactionRequest {
    TransactionRequest::for_token(token, "10.00")
}

/// A keyed card request.
pub fn pan_request() -> TransactionRequest {
    TransactionRequest {
        pan: "4111111111111111".into(),
        expiry_month: "12".into(),
        expiry_year: "30".into(),
        amount: "10.00".into(),
        ..Default::default()
    }
}

/// A swiped card request.
pub fn track_request() -> TransactionRequest {
    TransactionRequest {
        track2: ";4111111111111111=30121010000000000000?".into(),
        amount: "10.00".into(),
        ..Default::default()
    }
}
