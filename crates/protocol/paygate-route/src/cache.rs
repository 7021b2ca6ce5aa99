//! Route cache trait and the in-memory backend.
//!
//! Entries expire by TTL or explicit invalidation only; there is no size
//! eviction. An entry whose expiry is at or before the current instant is
//! reported as a miss, never as a stale hit.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use paygate_types::RouteRecord;

use crate::clock::{Clock, SystemClock};
use crate::error::{RouteError, RouteResult};

/// Terminal name to route storage with per-entry expiry.
///
/// Implementations are shared between tasks and must be internally
/// synchronized. `put` is last-write-wins.
pub trait RouteCache: Send + Sync {
    /// Return the live route for a terminal, or `None` on miss or expiry.
    fn get(&self, terminal_name: &str) -> RouteResult<Option<RouteRecord>>;

    /// Store a route, replacing any existing entry, expiring after `ttl`.
    fn put(&self, terminal_name: &str, route: RouteRecord, ttl: Duration) -> RouteResult<()>;

    /// Remove the entry for a terminal.
    fn expire(&self, terminal_name: &str) -> RouteResult<()>;

    /// Remove every entry.
    fn expire_all(&self) -> RouteResult<()>;
}

/// A cached route and the instant it stops being served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    pub route: RouteRecord,
    pub expires_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry expiring `ttl` after `now`.
    pub fn new(route: RouteRecord, now: DateTime<Utc>, ttl: Duration) -> RouteResult<Self> {
        let expires_at = expiry(now, ttl)?;
        Ok(Self { route, expires_at })
    }

    /// Returns true while the entry may still be served.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

fn expiry(now: DateTime<Utc>, ttl: Duration) -> RouteResult<DateTime<Utc>> {
    let ttl = chrono::Duration::from_std(ttl)
        .map_err(|e| RouteError::cache(format!("invalid TTL: {}", e)))?;
    now.checked_add_signed(ttl)
        .ok_or_else(|| RouteError::cache("TTL overflows the calendar"))
}

/// Check that entries stored now with `ttl` get a representable expiry.
pub fn validate_ttl(ttl: Duration) -> RouteResult<()> {
    expiry(Utc::now(), ttl).map(|_| ())
}

static SHARED: OnceLock<Arc<MemoryRouteCache>> = OnceLock::new();

/// In-process route cache guarded by a read/write lock.
#[derive(Debug)]
pub struct MemoryRouteCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl MemoryRouteCache {
    /// Create an empty cache on the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty cache on the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// The process-wide cache shared by every client that does not bring
    /// its own.
    pub fn shared() -> Arc<MemoryRouteCache> {
        SHARED.get_or_init(|| Arc::new(MemoryRouteCache::new())).clone()
    }

    /// Number of live entries.
    pub fn len(&self) -> RouteResult<usize> {
        let now = self.clock.now();
        let entries = self
            .entries
            .read()
            .map_err(|_| RouteError::lock_poisoned("route cache lock poisoned"))?;
        Ok(entries.values().filter(|e| e.is_live(now)).count())
    }

    /// Returns true if no live entry remains.
    pub fn is_empty(&self) -> RouteResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl Default for MemoryRouteCache {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteCache for MemoryRouteCache {
    fn get(&self, terminal_name: &str) -> RouteResult<Option<RouteRecord>> {
        let now = self.clock.now();
        let entries = self
            .entries
            .read()
            .map_err(|_| RouteError::lock_poisoned("route cache lock poisoned"))?;

        Ok(entries
            .get(terminal_name)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.route.clone()))
    }

    fn put(&self, terminal_name: &str, route: RouteRecord, ttl: Duration) -> RouteResult<()> {
        let entry = CacheEntry::new(route, self.clock.now(), ttl)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RouteError::lock_poisoned("route cache lock poisoned"))?;
        entries.insert(terminal_name.to_string(), entry);
        Ok(())
    }

    fn expire(&self, terminal_name: &str) -> RouteResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RouteError::lock_poisoned("route cache lock poisoned"))?;
        entries.remove(terminal_name);
        Ok(())
    }

    fn expire_all(&self) -> RouteResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RouteError::lock_poisoned("route cache lock poisoned"))?;
        entries.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    #[test]
    fn test_put_then_get() {
        let cache = MemoryRouteCache::new();
        assert!(cache.get("T1").unwrap().is_none());

        cache.put("T1", RouteRecord::new("T1", "10.0.0.2"), HOUR).unwrap();
        let route = cache.get("T1").unwrap().unwrap();
        assert_eq!(route.ip_address, "10.0.0.2");
        assert_eq!(cache.len().unwrap(), 1);
    }

    #[test]
    fn test_put_overwrites() {
        let cache = MemoryRouteCache::new();
        cache
            .put(
                "T1",
                RouteRecord::new("T1", "10.0.0.2").with_public_key("old"),
                HOUR,
            )
            .unwrap();
        cache.put("T1", RouteRecord::new("T1", "10.0.0.3"), HOUR).unwrap();

        let route = cache.get("T1").unwrap().unwrap();
        assert_eq!(route.ip_address, "10.0.0.3");
        // Replaced, not merged.
        assert!(route.public_key.is_empty());
    }

    #[test]
    fn test_zero_ttl_is_immediate_miss() {
        let cache = MemoryRouteCache::new();
        cache
            .put("T1", RouteRecord::new("T1", "10.0.0.2"), Duration::ZERO)
            .unwrap();
        assert!(cache.get("T1").unwrap().is_none());
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_expire_removes_entry() {
        let cache = MemoryRouteCache::new();
        cache.put("T1", RouteRecord::new("T1", "10.0.0.2"), HOUR).unwrap();
        cache.put("T2", RouteRecord::new("T2", "10.0.0.3"), HOUR).unwrap();

        cache.expire("T1").unwrap();
        assert!(cache.get("T1").unwrap().is_none());
        assert!(cache.get("T2").unwrap().is_some());

        // Expiring an unknown name is a no-op.
        cache.expire("missing").unwrap();

        cache.expire_all().unwrap();
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let cache = Arc::new(MemoryRouteCache::new());
        let poisoner = cache.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("poison the route cache lock");
        })
        .join();

        assert!(matches!(cache.len(), Err(RouteError::LockPoisoned(_))));
        assert!(cache.is_empty().is_err());
        assert!(cache.get("T1").is_err());
    }

    #[test]
    fn test_shared_is_process_wide() {
        let a = MemoryRouteCache::shared();
        let b = MemoryRouteCache::shared();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_validate_ttl() {
        validate_ttl(Duration::ZERO).unwrap();
        validate_ttl(HOUR).unwrap();
        assert!(matches!(
            validate_ttl(Duration::from_secs(u64::MAX)),
            Err(RouteError::Cache(_))
        ));
        // Fits in a chrono duration but not on the calendar.
        let million_years = Duration::from_secs(1_000_000 * 365 * 24 * 3600);
        assert!(validate_ttl(million_years).is_err());
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let now = Utc::now();
        let entry = CacheEntry::new(RouteRecord::new("T1", "10.0.0.2"), now, HOUR).unwrap();
        assert!(entry.is_live(now));
        assert!(!entry.is_live(entry.expires_at));
    }

    #[test]
    fn test_concurrent_writers() {
        let cache = Arc::new(MemoryRouteCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = cache.clone();
                std::thread::spawn(move || {
                    for j in 0..100 {
                        let name = format!("T{}", j % 10);
                        let ip = format!("10.0.{}.{}", i, j);
                        cache.put(&name, RouteRecord::new(&name, ip), HOUR).unwrap();
                        assert!(cache.get(&name).unwrap().is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len().unwrap(), 10);
    }
}
