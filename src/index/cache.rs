//! TTL cache for raw query results
//!
//! The cache is an explicit object owned by the backend rather than ambient
//! process state, and time is injected through the `Clock` trait so TTL
//! expiry is deterministic under test. Entries are never evicted proactively;
//! processes are short-lived CLI invocations, so unbounded growth is
//! acceptable. A long-running service would need an entry cap here.

use rustc_hash::FxHashMap;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

/// Time source for cache expiry decisions
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time, the production clock
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().expect("clock lock poisoned");
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().expect("clock lock poisoned")
    }
}

struct CacheEntry {
    result: String,
    stored_at: Instant,
}

/// Expression-keyed result cache with a fixed TTL
pub struct QueryCache {
    entries: RwLock<FxHashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Box<dyn Clock>,
}

impl QueryCache {
    pub fn new(ttl: Duration, clock: Box<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(FxHashMap::default()),
            ttl,
            clock,
        }
    }

    /// Look up a fresh entry. Expired entries are dropped on access.
    pub fn get(&self, key: &str) -> Option<String> {
        {
            let entries = self.entries.read().expect("cache lock poisoned");
            if let Some(entry) = entries.get(key) {
                if self.clock.now().duration_since(entry.stored_at) < self.ttl {
                    return Some(entry.result.clone());
                }
            } else {
                return None;
            }
        }
        // Entry exists but is stale.
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.remove(key);
        None
    }

    pub fn insert(&self, key: String, result: String) {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        entries.insert(
            key,
            CacheEntry {
                result,
                stored_at: self.clock.now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.write().expect("cache lock poisoned").clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
