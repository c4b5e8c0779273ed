//! Time-boxed memoization of backend responses.
//!
//! Tab-local; avoids redundant network calls during a page's lifetime.
//! Entries expire after their TTL and are evicted lazily on the next read,
//! so a stale value can never be observed or resurrected.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;

/// A memoized backend response.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    stored_at: DateTime<Utc>,
    ttl: Duration,
}

impl CacheEntry {
    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.stored_at >= self.ttl
    }
}

/// Tab-local response cache keyed by query identifier.
///
/// Cheap to clone; clones share entries. Invalidate the affected keys after
/// any mutating operation on the same resource.
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    default_ttl: Duration,
}

impl ResponseCache {
    /// Creates a cache whose entries default to the given TTL.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            default_ttl,
        }
    }

    /// Stores a value under `key` with the default TTL, overwriting any
    /// previous entry.
    pub fn put(&self, key: &str, value: Value) {
        self.put_with_ttl(key, value, self.default_ttl);
    }

    /// Stores a value with an explicit TTL.
    pub fn put_with_ttl(&self, key: &str, value: Value, ttl: Duration) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(
                key.to_owned(),
                CacheEntry {
                    value,
                    stored_at: Utc::now(),
                    ttl,
                },
            );
        }
    }

    /// Returns the stored value while it is fresh.
    ///
    /// An expired entry reads as absent and is evicted on the spot.
    pub fn get(&self, key: &str) -> Option<Value> {
        let now = Utc::now();

        {
            let entries = self.entries.read().ok()?;
            match entries.get(key) {
                Some(entry) if !entry.is_expired_at(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // expired: evict, re-checking under the write lock
        if let Ok(mut entries) = self.entries.write() {
            if entries.get(key).is_some_and(|e| e.is_expired_at(now)) {
                entries.remove(key);
            }
        }
        None
    }

    /// Removes one entry. Returns whether it was present.
    pub fn invalidate(&self, key: &str) -> bool {
        self.entries
            .write()
            .map(|mut entries| entries.remove(key).is_some())
            .unwrap_or(false)
    }

    /// Removes every entry whose key starts with `prefix`.
    ///
    /// Useful after a mutation that affects a whole resource family, e.g.
    /// `invalidate_prefix("courses:")` after enrolling in a course.
    pub fn invalidate_prefix(&self, prefix: &str) -> usize {
        self.entries
            .write()
            .map(|mut entries| {
                let before = entries.len();
                entries.retain(|key, _| !key.starts_with(prefix));
                before - entries.len()
            })
            .unwrap_or(0)
    }

    /// Removes all expired entries.
    ///
    /// Returns the number of entries pruned.
    pub fn prune_expired(&self) -> u64 {
        let now = Utc::now();
        self.entries
            .write()
            .map(|mut entries| {
                let before = entries.len();
                entries.retain(|_, entry| !entry.is_expired_at(now));
                u64::try_from(before - entries.len()).unwrap_or(u64::MAX)
            })
            .unwrap_or(0)
    }

    /// Number of entries currently stored, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
