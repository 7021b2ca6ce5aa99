//! Delivery of terminal-routed transactions.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use paygate_gateway::GatewayTransport;
use paygate_types::RouteRecord;

use crate::error::ClientResult;
use crate::verb::Verb;

/// Sends a transaction to a terminal once its route is known.
///
/// The route carries the terminal's LAN address, relay flag and any
/// transient credentials. The returned JSON body must carry the usual
/// success/error acknowledgement.
#[async_trait]
pub trait TerminalTransport: Send + Sync {
    /// Deliver `body` for `verb` to the terminal at `route`.
    async fn send(&self, route: &RouteRecord, verb: Verb, body: Value) -> ClientResult<Value>;
}

/// Forwards terminal transactions through the gateway's cloud relay at
/// `POST /api/terminal-<verb>`.
///
/// The gateway reaches the terminal itself, so this works for relayed and
/// locally reachable terminals alike. Requests are signed with the client's
/// own credentials, and a request marked `test` is relayed by the test
/// gateway.
#[derive(Clone)]
pub struct RelayTerminalTransport {
    gateway: Arc<dyn GatewayTransport>,
}

impl RelayTerminalTransport {
    /// Relay through the given gateway transport.
    pub fn new(gateway: Arc<dyn GatewayTransport>) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl TerminalTransport for RelayTerminalTransport {
    async fn send(&self, route: &RouteRecord, verb: Verb, body: Value) -> ClientResult<Value> {
        let test = body.get("test").and_then(Value::as_bool).unwrap_or(false);
        debug!(
            terminal = %route.terminal_name,
            verb = %verb,
            cloud_relay = route.cloud_relay_enabled,
            test,
            "Relaying terminal transaction"
        );
        Ok(self.gateway.post(&verb.relay_path(), body, test).await?)
    }
}

impl std::fmt::Debug for RelayTerminalTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayTerminalTransport").finish_non_exhaustive()
    }
}
