//! Time-to-live cache with an injected clock.
//!
//! Entries expire on time alone. There is no invalidation hook for upstream
//! writes. Population runs under the lock, so concurrent callers in one
//! window see the same value and the loader runs at most once per window.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-driven clock for tests. Starts at construction time and only moves
/// when `advance` is called.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut offset = self.offset.lock().unwrap_or_else(|p| p.into_inner());
        *offset += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        let offset = *self.offset.lock().unwrap_or_else(|p| p.into_inner());
        self.origin + offset
    }
}

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        // A panicking loader leaves the map itself consistent.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn is_fresh(&self, entry: &Entry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.inserted_at) < self.ttl
    }

    /// Fresh value for `key`, if any.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let entries = self.lock();
        entries
            .get(key)
            .filter(|e| self.is_fresh(e, now))
            .map(|e| e.value.clone())
    }

    pub fn insert(&self, key: K, value: V) {
        let inserted_at = self.clock.now();
        self.lock().insert(key, Entry { value, inserted_at });
    }

    /// Return the fresh value for `key`, or run `load` and cache its result.
    ///
    /// Errors are returned to the caller and not cached, so the next call
    /// tries again.
    pub fn get_or_try_insert_with<E, F>(&self, key: K, load: F) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        let mut entries = self.lock();
        let now = self.clock.now();
        if let Some(entry) = entries.get(&key) {
            if self.is_fresh(entry, now) {
                return Ok(entry.value.clone());
            }
        }

        let value = load()?;
        entries.insert(
            key,
            Entry {
                value: value.clone(),
                inserted_at: self.clock.now(),
            },
        );
        Ok(value)
    }

    /// Drop every entry, fresh or not.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Drop expired entries and return how many remain.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut entries = self.lock();
        entries.retain(|_, e| now.saturating_duration_since(e.inserted_at) < self.ttl);
        entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
