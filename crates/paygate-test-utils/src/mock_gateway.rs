//! Mock implementation of the `GatewayTransport` trait for testing.
//!
//! Serves terminal routes and canned responses from memory and records every
//! call, so tests can assert which requests reached the gateway.

use async_trait::async_trait;
use paygate_gateway::{GatewayError, GatewayResult, GatewayTransport};
use paygate_types::constants::TERMINAL_ROUTE_PATH;
use paygate_types::RouteRecord;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

/// One call observed by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// `GET` or `POST`.
    pub method: &'static str,
    /// Path relative to `/api`, including any query string.
    pub path: String,
    /// POST body.
    pub body: Option<Value>,
    /// Whether the test gateway was selected.
    pub test: bool,
}

struct MockGatewayInner {
    /// Terminal name -> route lookup response body.
    routes: HashMap<String, Value>,
    /// Path -> response body for every other call.
    responses: HashMap<String, Value>,
    /// When set, every call fails with this error.
    failure: Option<GatewayError>,
    /// Delay applied before answering.
    delay: Option<Duration>,
    /// Every call in arrival order.
    calls: Vec<RecordedCall>,
    /// Auto-incrementing transaction counter.
    tx_counter: u64,
}

/// A call-counting stub gateway.
///
/// Uses `Arc<RwLock<...>>` internally, so it is cheap to clone and all
/// clones share the same state.
///
/// Route lookups for unknown terminals answer
/// `{"success": false, "error": "Unknown Terminal"}`. POSTs without a canned
/// response answer an approved transaction.
#[derive(Clone)]
pub struct MockGateway {
    inner: Arc<RwLock<MockGatewayInner>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Create a mock with no routes.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockGatewayInner {
                routes: HashMap::new(),
                responses: HashMap::new(),
                failure: None,
                delay: None,
                calls: Vec::new(),
                tx_counter: 0,
            })),
        }
    }

    /// Serve a successful route lookup for `terminal_name`.
    pub fn with_route(self, terminal_name: &str, route: RouteRecord) -> Self {
        self.set_route(terminal_name, route);
        self
    }

    /// Serve a failed route lookup for `terminal_name`.
    pub fn with_rejected_route(self, terminal_name: &str, reason: &str) -> Self {
        self.inner.write().unwrap().routes.insert(
            terminal_name.to_string(),
            json!({"success": false, "error": reason}),
        );
        self
    }

    /// Answer calls to `path` with `body`.
    pub fn with_response(self, path: &str, body: Value) -> Self {
        self.inner
            .write()
            .unwrap()
            .responses
            .insert(path.to_string(), body);
        self
    }

    /// Fail every call.
    pub fn with_failure(self, error: GatewayError) -> Self {
        self.set_failure(Some(error));
        self
    }

    /// Wait before answering each call.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.inner.write().unwrap().delay = Some(delay);
        self
    }

    /// Replace the route served for `terminal_name` at runtime.
    pub fn set_route(&self, terminal_name: &str, route: RouteRecord) {
        let mut body = serde_json::to_value(&route).unwrap();
        body["success"] = json!(true);
        self.inner
            .write()
            .unwrap()
            .routes
            .insert(terminal_name.to_string(), body);
    }

    /// Set the failure mode at runtime.
    pub fn set_failure(&self, error: Option<GatewayError>) {
        self.inner.write().unwrap().failure = error;
    }

    // =========================================================================
    // Assertion Helpers
    // =========================================================================

    /// Every call so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.inner.read().unwrap().calls.clone()
    }

    /// Total number of calls.
    pub fn call_count(&self) -> usize {
        self.inner.read().unwrap().calls.len()
    }

    /// Number of route lookups, for any terminal.
    pub fn route_lookups(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| terminal_param(&c.path).is_some())
            .count()
    }

    /// Number of route lookups for one terminal.
    pub fn route_lookups_for(&self, terminal_name: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| terminal_param(&c.path).as_deref() == Some(terminal_name))
            .count()
    }

    /// Every POST so far.
    pub fn posts(&self) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == "POST")
            .collect()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.inner.write().unwrap().calls.clear();
    }

    async fn answer(&self, call: RecordedCall) -> GatewayResult<Value> {
        let delay = {
            let mut inner = self.inner.write().unwrap();
            inner.calls.push(call.clone());
            inner.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.inner.write().unwrap();
        if let Some(error) = &inner.failure {
            return Err(error.clone());
        }

        if let Some(terminal) = terminal_param(&call.path) {
            return Ok(inner.routes.get(&terminal).cloned().unwrap_or_else(
                || json!({"success": false, "error": "Unknown Terminal"}),
            ));
        }

        if let Some(body) = inner.responses.get(&call.path) {
            return Ok(body.clone());
        }

        if call.method == "GET" {
            return Ok(json!({"success": true}));
        }

        inner.tx_counter += 1;
        Ok(json!({
            "success": true,
            "approved": true,
            "transactionId": format!("TX-{}", inner.tx_counter),
        }))
    }
}

/// The `terminal` query value of a route lookup path.
fn terminal_param(path: &str) -> Option<String> {
    let query = path.strip_prefix(TERMINAL_ROUTE_PATH)?.strip_prefix('?')?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == "terminal")
        .map(|(_, value)| value.into_owned())
}

#[async_trait]
impl GatewayTransport for MockGateway {
    async fn get(&self, path: &str, test: bool) -> GatewayResult<Value> {
        self.answer(RecordedCall {
            method: "GET",
            path: path.to_string(),
            body: None,
            test,
        })
        .await
    }

    async fn post(&self, path: &str, body: Value, test: bool) -> GatewayResult<Value> {
        self.answer(RecordedCall {
            method: "POST",
            path: path.to_string(),
            body: Some(body),
            test,
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_route_lookup() {
        let mock = MockGateway::new()
            .with_route("Front Counter", RouteRecord::new("Front Counter", "10.0.0.2"));

        let body = mock
            .get("/terminal-route?terminal=Front+Counter", false)
            .await
            .unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["ipAddress"], "10.0.0.2");
        assert_eq!(mock.route_lookups_for("Front Counter"), 1);

        let unknown = mock.get("/terminal-route?terminal=T9", false).await.unwrap();
        assert_eq!(unknown["success"], false);
        assert_eq!(mock.route_lookups(), 2);
    }

    #[tokio::test]
    async fn test_default_post_and_failure() {
        let mock = MockGateway::new();
        let body = mock.post("/charge", json!({}), true).await.unwrap();
        assert_eq!(body["transactionId"], "TX-1");
        assert!(mock.posts()[0].test);

        mock.set_failure(Some(GatewayError::network("refused")));
        assert!(mock.post("/charge", json!({}), false).await.is_err());
        assert_eq!(mock.call_count(), 2);
    }
}
