//! TTL cache of the latest mood per scope
//!
//! Entries are replaced on recomputation and ignored once stale; nothing is
//! evicted. The clock is injected so tests can move time forward.

use chrono::{DateTime, Utc};
use moodscope_core::CountryMood;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Default time a computed mood stays fresh
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}

/// Storage for computed moods, keyed by scope cache key.
///
/// `get` returns only fresh values; `now` is the time new values are
/// stamped with.
pub trait MoodStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Arc<CountryMood>>;

    fn put(&self, key: String, value: CountryMood) -> Arc<CountryMood>;

    fn now(&self) -> DateTime<Utc>;
}

/// A cached mood and the time it was computed
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub computed_at: DateTime<Utc>,
    pub value: Arc<CountryMood>,
}

/// In-memory mood cache
pub struct MoodCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl MoodCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Number of stored entries, stale ones included
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Stored entry regardless of age
    pub fn entry(&self, key: &str) -> Option<CacheEntry> {
        self.entries.read().get(key).cloned()
    }

    fn is_fresh(&self, computed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // An entry stamped in the future (clock skew) counts as fresh
        match (now - computed_at).to_std() {
            Ok(age) => age < self.ttl,
            Err(_) => true,
        }
    }
}

impl Default for MoodCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL)
    }
}

impl MoodStore for MoodCache {
    fn get(&self, key: &str) -> Option<Arc<CountryMood>> {
        let entry = self.entries.read().get(key).cloned()?;
        if self.is_fresh(entry.computed_at, self.clock.now()) {
            Some(entry.value)
        } else {
            debug!(key, computed_at = %entry.computed_at, "Cache entry is stale");
            None
        }
    }

    fn put(&self, key: String, value: CountryMood) -> Arc<CountryMood> {
        let value = Arc::new(value);
        let entry = CacheEntry {
            computed_at: value.computed_at,
            value: Arc::clone(&value),
        };
        self.entries.write().insert(key, entry);
        value
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }
}
