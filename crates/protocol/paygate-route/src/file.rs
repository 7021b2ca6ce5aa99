//! File-backed route cache.
//!
//! The backing file is a JSON object mapping terminal name to
//! `{ "route": ..., "expiresAt": ... }`. It is read once on open and
//! rewritten after every mutation.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use paygate_types::RouteRecord;

use crate::cache::{CacheEntry, RouteCache};
use crate::clock::{Clock, SystemClock};
use crate::error::{RouteError, RouteResult};

/// Route cache persisted to a JSON file so routes survive restarts.
///
/// A mutation reaches memory only after the file write succeeds, so a failed
/// write leaves both exactly as they were.
///
/// Writes are synchronous and happen under the cache lock, on whichever task
/// stores the route. That is fine for a handful of terminals; callers
/// resolving many routes concurrently should prefer [`MemoryRouteCache`].
///
/// [`MemoryRouteCache`]: crate::MemoryRouteCache
#[derive(Debug)]
pub struct FileRouteCache {
    path: PathBuf,
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl FileRouteCache {
    /// Open (or start) a cache file on the system clock.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self::open_with_clock(path, Arc::new(SystemClock))
    }

    /// Open (or start) a cache file on the given clock.
    ///
    /// A missing, unreadable or corrupt file yields an empty cache; the
    /// file is replaced on the next write.
    pub fn open_with_clock(path: impl AsRef<Path>, clock: Arc<dyn Clock>) -> Self {
        let path = path.as_ref().to_path_buf();
        let now = clock.now();
        let mut entries = load(&path);
        entries.retain(|_, entry| entry.is_live(now));

        debug!(path = %path.display(), entries = entries.len(), "Opened route cache file");

        Self {
            path,
            entries: Mutex::new(entries),
            clock,
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &HashMap<String, CacheEntry>) -> RouteResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(&json)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn lock(&self) -> RouteResult<std::sync::MutexGuard<'_, HashMap<String, CacheEntry>>> {
        self.entries
            .lock()
            .map_err(|_| RouteError::lock_poisoned("route cache file lock poisoned"))
    }
}

fn load(path: &Path) -> HashMap<String, CacheEntry> {
    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "Route cache file unreadable, starting empty"
            );
            return HashMap::new();
        }
    };

    match serde_json::from_slice(&data) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Route cache file corrupt, starting empty");
            HashMap::new()
        }
    }
}

impl RouteCache for FileRouteCache {
    fn get(&self, terminal_name: &str) -> RouteResult<Option<RouteRecord>> {
        let now = self.clock.now();
        let entries = self.lock()?;
        Ok(entries
            .get(terminal_name)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.route.clone()))
    }

    fn put(&self, terminal_name: &str, route: RouteRecord, ttl: Duration) -> RouteResult<()> {
        let entry = CacheEntry::new(route, self.clock.now(), ttl)?;
        let mut entries = self.lock()?;
        let mut next = entries.clone();
        next.insert(terminal_name.to_string(), entry);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn expire(&self, terminal_name: &str) -> RouteResult<()> {
        let mut entries = self.lock()?;
        if !entries.contains_key(terminal_name) {
            return Ok(());
        }
        let mut next = entries.clone();
        next.remove(terminal_name);
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }

    fn expire_all(&self) -> RouteResult<()> {
        let mut entries = self.lock()?;
        self.persist(&HashMap::new())?;
        entries.clear();
        Ok(())
    }
}
