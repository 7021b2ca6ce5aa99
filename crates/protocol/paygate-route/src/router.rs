//! Terminal route resolution.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::Mutex as AsyncMutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::form_urlencoded;

use paygate_gateway::{decode_acknowledged, GatewayError, GatewayTransport};
use paygate_types::constants::{DEFAULT_ROUTE_CACHE_TTL, TERMINAL_ROUTE_PATH, TERMINAL_ROUTE_QUERY};
use paygate_types::RouteRecord;

use crate::cache::RouteCache;
use crate::error::{RouteError, RouteResult};

/// Resolves terminal names to routes, cache first.
///
/// Concurrent misses for the same name are collapsed: one caller performs
/// the gateway lookup while the others wait, then read the fresh entry.
/// A failed lookup caches nothing.
pub struct TerminalRouter {
    gateway: Arc<dyn GatewayTransport>,
    cache: Arc<dyn RouteCache>,
    ttl: Duration,
    inflight: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl TerminalRouter {
    /// Create a router with the default TTL.
    pub fn new(gateway: Arc<dyn GatewayTransport>, cache: Arc<dyn RouteCache>) -> Self {
        Self {
            gateway,
            cache,
            ttl: DEFAULT_ROUTE_CACHE_TTL,
            inflight: Mutex::new(HashMap::new()),
        }
    }

    /// Set the TTL applied to routes this router stores.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// TTL applied to stored routes.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The cache this router reads and fills.
    pub fn cache(&self) -> &Arc<dyn RouteCache> {
        &self.cache
    }

    /// Resolve a terminal's route.
    ///
    /// Served from the cache while the entry is live; otherwise looked up at
    /// the gateway and cached on success.
    pub async fn resolve_route(&self, terminal_name: &str) -> RouteResult<RouteRecord> {
        validate_name(terminal_name)?;

        if let Some(route) = self.cache.get(terminal_name)? {
            debug!(terminal = terminal_name, "Route cache hit");
            return Ok(route);
        }

        let flight = self.join_flight(terminal_name)?;
        let _turn = flight.turn().await;

        // Another caller may have filled the entry while this one waited.
        if let Some(route) = self.cache.get(terminal_name)? {
            debug!(terminal = terminal_name, "Route filled by concurrent lookup");
            return Ok(route);
        }

        self.fetch_and_store(terminal_name).await
    }

    /// [`resolve_route`](Self::resolve_route), abandoned when `token` is
    /// cancelled. The in-flight request is dropped on cancellation.
    pub async fn resolve_route_cancellable(
        &self,
        terminal_name: &str,
        token: &CancellationToken,
    ) -> RouteResult<RouteRecord> {
        tokio::select! {
            biased;
            _ = token.cancelled() => Err(RouteError::Cancelled),
            result = self.resolve_route(terminal_name) => result,
        }
    }

    /// Look the route up at the gateway regardless of the cache.
    pub async fn refresh(&self, terminal_name: &str) -> RouteResult<RouteRecord> {
        validate_name(terminal_name)?;
        let flight = self.join_flight(terminal_name)?;
        let _turn = flight.turn().await;
        self.fetch_and_store(terminal_name).await
    }

    /// Drop the cached route for a terminal.
    pub fn expire(&self, terminal_name: &str) -> RouteResult<()> {
        self.cache.expire(terminal_name)
    }

    /// Drop every cached route.
    pub fn expire_all(&self) -> RouteResult<()> {
        self.cache.expire_all()
    }

    async fn fetch_and_store(&self, terminal_name: &str) -> RouteResult<RouteRecord> {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair(TERMINAL_ROUTE_QUERY, terminal_name)
            .finish();
        let path = format!("{}?{}", TERMINAL_ROUTE_PATH, query);

        debug!(terminal = terminal_name, "Looking up terminal route");

        // Route lookups always go to the live gateway.
        let body = self.gateway.get(&path, false).await?;
        let route: RouteRecord = match decode_acknowledged(body) {
            Ok(route) => route,
            Err(e) => {
                if let GatewayError::Rejected { reason, .. } = &e {
                    warn!(
                        terminal = terminal_name,
                        reason = %reason,
                        "Terminal route lookup rejected"
                    );
                }
                return Err(e.into());
            }
        };

        self.cache.put(terminal_name, route.clone(), self.ttl)?;

        info!(
            terminal = terminal_name,
            ip_address = %route.ip_address,
            cloud_relay = route.cloud_relay_enabled,
            "Terminal route refreshed"
        );

        Ok(route)
    }

    fn join_flight(&self, terminal_name: &str) -> RouteResult<Flight<'_>> {
        let mut inflight = self
            .inflight
            .lock()
            .map_err(|_| RouteError::lock_poisoned("route lookup lock poisoned"))?;
        let lock = inflight
            .entry(terminal_name.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone();

        Ok(Flight {
            router: self,
            name: terminal_name.to_string(),
            lock: Some(lock),
        })
    }
}

impl std::fmt::Debug for TerminalRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalRouter")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

/// One caller's membership in the per-name lookup queue.
///
/// The map slot is removed when the last member leaves, including when the
/// resolving future is dropped mid-flight.
struct Flight<'a> {
    router: &'a TerminalRouter,
    name: String,
    lock: Option<Arc<AsyncMutex<()>>>,
}

impl Flight<'_> {
    async fn turn(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        match &self.lock {
            Some(lock) => Some(lock.lock().await),
            None => None,
        }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if let Ok(mut inflight) = self.router.inflight.lock() {
            drop(self.lock.take());
            // Only the map's reference left.
            let idle = inflight
                .get(&self.name)
                .is_some_and(|lock| Arc::strong_count(lock) == 1);
            if idle {
                inflight.remove(&self.name);
            }
        }
    }
}

fn validate_name(terminal_name: &str) -> RouteResult<()> {
    if terminal_name.trim().is_empty() {
        return Err(RouteError::InvalidTerminalName(terminal_name.to_string()));
    }
    Ok(())
}
