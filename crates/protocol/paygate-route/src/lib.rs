//! Terminal route resolution and caching.
//!
//! Point-of-sale transactions address a terminal by name. Finding where that
//! terminal lives (LAN address, cloud relay flag, transient credentials) is
//! a gateway round-trip, so resolved routes are cached with a TTL and served
//! locally until they expire or are invalidated.
//!
//! ```text
//! resolve_route("Front Counter")
//!        │
//!        ▼
//!  ┌────────────┐ hit  ┌──────────────┐
//!  │ RouteCache │ ───▶ │ RouteRecord  │
//!  └────────────┘      └──────────────┘
//!        │ miss               ▲
//!        ▼                    │ put (success only)
//!  GET /api/terminal-route?terminal=Front+Counter
//! ```
//!
//! # Components
//!
//! - **[`RouteCache`]**: storage contract, with [`MemoryRouteCache`] (in
//!   process, optionally process-wide via [`MemoryRouteCache::shared`]) and
//!   [`FileRouteCache`] (survives restarts)
//! - **[`TerminalRouter`]**: cache-first resolution with single-flight
//!   lookups and cancellation
//! - **[`Clock`]**: time source for expiry

pub mod cache;
pub mod clock;
pub mod error;
pub mod file;
pub mod router;

pub use cache::{validate_ttl, CacheEntry, MemoryRouteCache, RouteCache};
pub use clock::{Clock, SystemClock};
pub use error::{RouteError, RouteResult};
pub use file::FileRouteCache;
pub use router::TerminalRouter;
