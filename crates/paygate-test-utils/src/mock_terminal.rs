//! Mock implementation of the `TerminalTransport` trait for testing.

use async_trait::async_trait;
use paygate_client::{ClientError, ClientResult, TerminalTransport, Verb};
use paygate_types::RouteRecord;
use serde_json::{json, Value};
use std::sync::{Arc, RwLock};

/// One delivery observed by the mock.
#[derive(Debug, Clone)]
pub struct TerminalCall {
    pub route: RouteRecord,
    pub verb: Verb,
    pub body: Value,
}

struct MockTerminalInner {
    response: Value,
    should_fail: bool,
    calls: Vec<TerminalCall>,
}

/// A recording terminal transport. Clones share state.
#[derive(Clone)]
pub struct MockTerminal {
    inner: Arc<RwLock<MockTerminalInner>>,
}

impl Default for MockTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTerminal {
    /// Answer every delivery with an approved transaction.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MockTerminalInner {
                response: json!({"success": true, "approved": true, "transactionId": "TERM-1"}),
                should_fail: false,
                calls: Vec::new(),
            })),
        }
    }

    /// Answer every delivery with `body`.
    pub fn with_response(self, body: Value) -> Self {
        self.inner.write().unwrap().response = body;
        self
    }

    /// Fail every delivery with a terminal error.
    pub fn with_failure(self) -> Self {
        self.inner.write().unwrap().should_fail = true;
        self
    }

    /// Every delivery so far.
    pub fn calls(&self) -> Vec<TerminalCall> {
        self.inner.read().unwrap().calls.clone()
    }

    /// Number of deliveries.
    pub fn call_count(&self) -> usize {
        self.inner.read().unwrap().calls.len()
    }
}

#[async_trait]
impl TerminalTransport for MockTerminal {
    async fn send(&self, route: &RouteRecord, verb: Verb, body: Value) -> ClientResult<Value> {
        let mut inner = self.inner.write().unwrap();
        inner.calls.push(TerminalCall {
            route: route.clone(),
            verb,
            body,
        });
        if inner.should_fail {
            return Err(ClientError::terminal("terminal unreachable"));
        }
        Ok(inner.response.clone())
    }
}
