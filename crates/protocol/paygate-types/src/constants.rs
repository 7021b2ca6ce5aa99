//! Protocol constants for the gateway API.
//!
//! Header names, endpoint paths, and the defaults a client falls back to when
//! no configuration overrides them.

use std::time::Duration;

// =============================================================================
// Gateway Endpoints
// =============================================================================

/// Default production gateway host.
pub const DEFAULT_GATEWAY_HOST: &str = "api.paygate.io";

/// Default test gateway host.
pub const DEFAULT_TEST_GATEWAY_HOST: &str = "test.paygate.io";

/// Prefix prepended to every gateway path.
pub const API_PREFIX: &str = "/api";

/// Terminal route discovery endpoint.
pub const TERMINAL_ROUTE_PATH: &str = "/terminal-route";

/// Query parameter carrying the terminal name on route discovery.
pub const TERMINAL_ROUTE_QUERY: &str = "terminal";

/// Credential check endpoint.
pub const HEARTBEAT_PATH: &str = "/heartbeat";

// =============================================================================
// Authentication Headers
// =============================================================================

/// Header carrying the hex-encoded request nonce.
pub const HEADER_NONCE: &str = "Nonce";

/// Header carrying the RFC 3339 request timestamp.
pub const HEADER_TIMESTAMP: &str = "Timestamp";

/// Header carrying `Dual <bearer>:<apiKey>:<signature>`.
pub const HEADER_AUTHORIZATION: &str = "Authorization";

/// Authorization scheme name.
pub const AUTH_SCHEME: &str = "Dual";

/// Raw nonce length in bytes (hex-encoded to twice this length).
pub const NONCE_LEN: usize = 32;

// =============================================================================
// Timing
// =============================================================================

/// Default lifetime of a cached terminal route: 60 minutes.
pub const DEFAULT_ROUTE_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Default per-call HTTP timeout: 60 seconds.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
