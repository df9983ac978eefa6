//! Single-slot and keyed caches with a fixed time-to-live.
//!
//! A value is fresh while `now - stored_at < ttl`. Stale values are kept so
//! a fallback chain can still serve them when every upstream fails.

use std::hash::Hash;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use parking_lot::RwLock;

use crate::port::Clock;

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    stored_at: DateTime<Utc>,
}

impl<T> Entry<T> {
    fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.stored_at < ttl
    }
}

/// Cache holding at most one value.
pub struct TtlCache<T> {
    slot: RwLock<Option<Entry<T>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<T: Clone> TtlCache<T> {
    /// Create an empty cache with the given TTL.
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            slot: RwLock::new(None),
            ttl,
            clock,
        }
    }

    /// The cached value if it has not expired.
    #[must_use]
    pub fn get_fresh(&self) -> Option<T> {
        let now = self.clock.now();
        self.slot
            .read()
            .as_ref()
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// The cached value regardless of age.
    #[must_use]
    pub fn get_any(&self) -> Option<T> {
        self.slot.read().as_ref().map(|entry| entry.value.clone())
    }

    /// Replace the cached value, stamping it with the current time.
    pub fn put(&self, value: T) {
        let stored_at = self.clock.now();
        *self.slot.write() = Some(Entry { value, stored_at });
    }

    /// Drop the cached value.
    pub fn clear(&self) {
        *self.slot.write() = None;
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Cache holding one value per key, each with its own timestamp.
pub struct KeyedTtlCache<K, V> {
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl<K, V> KeyedTtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    #[must_use]
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
            clock,
        }
    }

    /// The value for `key` if it has not expired.
    #[must_use]
    pub fn get_fresh(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh(now, self.ttl))
            .map(|entry| entry.value.clone())
    }

    /// The value for `key` regardless of age.
    #[must_use]
    pub fn get_any(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn put(&self, key: K, value: V) {
        let stored_at = self.clock.now();
        self.entries.insert(key, Entry { value, stored_at });
    }

    pub fn remove(&self, key: &K) {
        self.entries.remove(key);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
