//! The client facade.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use paygate_gateway::{
    check_acknowledgement, decode_acknowledged, GatewayConfig, GatewayTransport, HttpGateway,
};
use paygate_route::{
    validate_ttl, FileRouteCache, MemoryRouteCache, RouteCache, TerminalRouter,
};
use paygate_types::constants::{DEFAULT_ROUTE_CACHE_TTL, HEARTBEAT_PATH};
use paygate_types::{
    Acknowledgement, Credentials, PaymentMethod, RouteRecord, TransactionRequest,
    TransactionResponse,
};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::terminal::{RelayTerminalTransport, TerminalTransport};
use crate::verb::Verb;

/// Run `future` until it completes or `token` is cancelled.
///
/// On cancellation the future is dropped, which aborts any in-flight HTTP
/// request and releases its connection.
pub async fn cancellable<T, F>(token: &CancellationToken, future: F) -> ClientResult<T>
where
    F: Future<Output = ClientResult<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(ClientError::Cancelled),
        result = future => result,
    }
}

/// Entry point for Paygate transactions.
///
/// Each call classifies the request's payment method once. A request whose
/// only payment field is a terminal name is terminal-routed: its route is
/// resolved (normally from the cache) and the transaction is handed to the
/// [`TerminalTransport`]. Everything else is posted straight to the gateway.
///
/// Cheap to clone; clones share the gateway, router and cache.
#[derive(Clone)]
pub struct Client {
    gateway: Arc<dyn GatewayTransport>,
    router: Arc<TerminalRouter>,
    terminal: Arc<dyn TerminalTransport>,
}

impl Client {
    /// Start building a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Client over HTTPS to the default gateway hosts, sharing the
    /// process-wide route cache.
    pub fn new(credentials: Credentials) -> ClientResult<Self> {
        Self::builder().credentials(credentials).build()
    }

    /// Build the full stack from a loaded configuration.
    ///
    /// Uses a [`FileRouteCache`] when `routes.cache_file` is set, otherwise
    /// the process-wide [`MemoryRouteCache`].
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let cache: Arc<dyn RouteCache> = match &config.routes.cache_file {
            Some(path) => Arc::new(FileRouteCache::open(path)),
            None => MemoryRouteCache::shared(),
        };

        Self::builder()
            .gateway_config(config.gateway_config())
            .route_cache(cache)
            .route_cache_ttl(config.route_ttl())
            .build()
    }

    /// The terminal router.
    pub fn router(&self) -> &TerminalRouter {
        &self.router
    }

    // =========================================================================
    // Transactions
    // =========================================================================

    /// Charge a payment method.
    pub async fn charge(&self, request: &TransactionRequest) -> ClientResult<TransactionResponse> {
        self.execute(Verb::Charge, request).await
    }

    /// Authorize without capturing.
    pub async fn preauth(&self, request: &TransactionRequest) -> ClientResult<TransactionResponse> {
        self.execute(Verb::Preauth, request).await
    }

    /// Refund a payment method or earlier transaction.
    pub async fn refund(&self, request: &TransactionRequest) -> ClientResult<TransactionResponse> {
        self.execute(Verb::Refund, request).await
    }

    /// Void an earlier transaction.
    pub async fn void(&self, request: &TransactionRequest) -> ClientResult<TransactionResponse> {
        self.execute(Verb::Void, request).await
    }

    /// Capture an earlier preauthorization.
    pub async fn capture(&self, request: &TransactionRequest) -> ClientResult<TransactionResponse> {
        self.execute(Verb::Capture, request).await
    }

    /// Reverse an earlier transaction.
    pub async fn reverse(&self, request: &TransactionRequest) -> ClientResult<TransactionResponse> {
        self.execute(Verb::Reverse, request).await
    }

    /// Enroll a payment method in the token vault.
    pub async fn enroll(&self, request: &TransactionRequest) -> ClientResult<TransactionResponse> {
        self.execute(Verb::Enroll, request).await
    }

    /// Close the current batch.
    pub async fn close_batch(
        &self,
        request: &TransactionRequest,
    ) -> ClientResult<TransactionResponse> {
        self.execute(Verb::CloseBatch, request).await
    }

    /// Start a charge on a terminal and return once the terminal accepts it.
    pub async fn async_charge(
        &self,
        request: &TransactionRequest,
    ) -> ClientResult<TransactionResponse> {
        self.execute_async(Verb::Charge, request).await
    }

    /// Start a preauthorization on a terminal.
    pub async fn async_preauth(
        &self,
        request: &TransactionRequest,
    ) -> ClientResult<TransactionResponse> {
        self.execute_async(Verb::Preauth, request).await
    }

    /// Start a refund on a terminal.
    pub async fn async_refund(
        &self,
        request: &TransactionRequest,
    ) -> ClientResult<TransactionResponse> {
        self.execute_async(Verb::Refund, request).await
    }

    /// Start an enrollment on a terminal.
    pub async fn async_enroll(
        &self,
        request: &TransactionRequest,
    ) -> ClientResult<TransactionResponse> {
        self.execute_async(Verb::Enroll, request).await
    }

    /// Run any verb.
    ///
    /// A `success: false` response is returned as a
    /// [`GatewayError::Rejected`](paygate_gateway::GatewayError::Rejected).
    pub async fn execute(
        &self,
        verb: Verb,
        request: &TransactionRequest,
    ) -> ClientResult<TransactionResponse> {
        let method = request.payment_method();
        let body = serde_json::to_value(request)?;

        let raw = match &method {
            PaymentMethod::Terminal { name } => {
                debug!(verb = %verb, terminal = %name, "Dispatching terminal-routed transaction");
                let route = self.router.resolve_route(name).await?;
                self.terminal.send(&route, verb, body).await?
            }
            _ => {
                debug!(
                    verb = %verb,
                    method = method.kind(),
                    test = request.test,
                    "Dispatching gateway-direct transaction"
                );
                self.gateway.post(&verb.path(), body, request.test).await?
            }
        };

        Ok(decode_acknowledged(raw)?)
    }

    async fn execute_async(
        &self,
        verb: Verb,
        request: &TransactionRequest,
    ) -> ClientResult<TransactionResponse> {
        validate_async(verb, request)?;
        let mut request = request.clone();
        request.run_async = true;
        self.execute(verb, &request).await
    }

    // =========================================================================
    // Gateway and routes
    // =========================================================================

    /// Signed `GET /heartbeat`; succeeds when the gateway accepts the
    /// credentials.
    pub async fn heartbeat(&self, test: bool) -> ClientResult<Acknowledgement> {
        let body = self.gateway.get(HEARTBEAT_PATH, test).await?;
        Ok(check_acknowledgement(&body)?)
    }

    /// Resolve a terminal's route without transacting.
    pub async fn route(&self, terminal_name: &str) -> ClientResult<RouteRecord> {
        Ok(self.router.resolve_route(terminal_name).await?)
    }

    /// Forget the cached route for a terminal, forcing rediscovery.
    pub fn expire_route(&self, terminal_name: &str) -> ClientResult<()> {
        Ok(self.router.expire(terminal_name)?)
    }

    /// Forget every cached route.
    pub fn expire_all_routes(&self) -> ClientResult<()> {
        Ok(self.router.expire_all()?)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("router", &self.router)
            .finish_non_exhaustive()
    }
}

/// Async variants exist only for terminal-collected payments.
fn validate_async(verb: Verb, request: &TransactionRequest) -> ClientResult<()> {
    if !verb.supports_async() {
        return Err(ClientError::validation(format!(
            "{} has no asynchronous variant",
            verb
        )));
    }
    match request.payment_method() {
        PaymentMethod::Terminal { .. } => Ok(()),
        PaymentMethod::Unspecified => Err(ClientError::validation(format!(
            "async {} requires a terminal name",
            verb
        ))),
        other => Err(ClientError::validation(format!(
            "async {} must be collected by a terminal, but the request carries a {} payment method",
            verb,
            other.kind()
        ))),
    }
}

/// Builder for [`Client`].
#[derive(Default)]
pub struct ClientBuilder {
    gateway_config: Option<GatewayConfig>,
    gateway: Option<Arc<dyn GatewayTransport>>,
    route_cache: Option<Arc<dyn RouteCache>>,
    route_cache_ttl: Option<Duration>,
    terminal: Option<Arc<dyn TerminalTransport>>,
}

impl ClientBuilder {
    /// Sign requests with these credentials (default hosts unless
    /// [`gateway_config`](Self::gateway_config) is also set).
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.gateway_config = Some(match self.gateway_config.take() {
            Some(mut config) => {
                config.credentials = credentials;
                config
            }
            None => GatewayConfig::new(credentials),
        });
        self
    }

    /// Full gateway configuration for the built-in HTTP transport.
    pub fn gateway_config(mut self, config: GatewayConfig) -> Self {
        self.gateway_config = Some(config);
        self
    }

    /// Use a custom gateway transport instead of [`HttpGateway`].
    pub fn gateway(mut self, gateway: Arc<dyn GatewayTransport>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Use a dedicated route cache instead of the process-wide one.
    pub fn route_cache(mut self, cache: Arc<dyn RouteCache>) -> Self {
        self.route_cache = Some(cache);
        self
    }

    /// How long resolved routes are served from the cache.
    pub fn route_cache_ttl(mut self, ttl: Duration) -> Self {
        self.route_cache_ttl = Some(ttl);
        self
    }

    /// Deliver terminal-routed transactions with a custom transport instead
    /// of the cloud relay.
    pub fn terminal_transport(mut self, terminal: Arc<dyn TerminalTransport>) -> Self {
        self.terminal = Some(terminal);
        self
    }

    /// Build the client.
    pub fn build(self) -> ClientResult<Client> {
        let gateway: Arc<dyn GatewayTransport> = match (self.gateway, self.gateway_config) {
            (Some(gateway), _) => gateway,
            (None, Some(config)) => {
                if !config.credentials.is_complete() {
                    return Err(ClientError::config(
                        "api key, bearer token and signing key are all required",
                    ));
                }
                Arc::new(HttpGateway::new(config)?)
            }
            (None, None) => {
                return Err(ClientError::config(
                    "no gateway configured; set credentials or a gateway transport",
                ))
            }
        };

        let cache: Arc<dyn RouteCache> = match self.route_cache {
            Some(cache) => cache,
            None => MemoryRouteCache::shared(),
        };
        let ttl = self.route_cache_ttl.unwrap_or(DEFAULT_ROUTE_CACHE_TTL);
        validate_ttl(ttl)
            .map_err(|e| ClientError::config(format!("route cache TTL out of range: {}", e)))?;
        let router = TerminalRouter::new(gateway.clone(), cache).with_ttl(ttl);
        let terminal: Arc<dyn TerminalTransport> = match self.terminal {
            Some(terminal) => terminal,
            None => Arc::new(RelayTerminalTransport::new(gateway.clone())),
        };

        Ok(Client {
            gateway,
            router: Arc::new(router),
            terminal,
        })
    }
}
