//! Time-bounded memoization for callers of the engine
//!
//! The engine itself keeps no state between calls. Callers that want to
//! avoid recomputing a forecast or refetching a series wrap the call in a
//! [`Memoizer`], keyed on the content hash of (ticker, date range,
//! function name).

use chrono::NaiveDate;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::debug;

/// Identity of one memoized call
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// SHA-256 of the ticker, inclusive date range and function name
    pub fn new(ticker: &str, start: NaiveDate, end: NaiveDate, function: &str) -> Self {
        let (start, end) = (start.to_string(), end.to_string());
        let mut hasher = Sha256::new();
        for part in [ticker, start.as_str(), end.as_str(), function] {
            hasher.update(part.as_bytes());
            // Separator so ("AB", "C") and ("A", "BC") differ
            hasher.update([0u8]);
        }
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// Shared TTL cache of computed values
///
/// Clones share the same entries. A zero TTL disables caching.
#[derive(Debug)]
pub struct Memoizer<V> {
    inner: Arc<Mutex<HashMap<CacheKey, CacheEntry<V>>>>,
    ttl: Duration,
}

impl<V> Clone for Memoizer<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            ttl: self.ttl,
        }
    }
}

impl<V: Clone> Memoizer<V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Memoizer that never stores anything
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<CacheKey, CacheEntry<V>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Unexpired value for `key`
    ///
    /// An expired entry found here is dropped.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let mut entries = self.entries();
        if let Some(entry) = entries.get(key) {
            if Instant::now() < entry.expires_at {
                return Some(entry.value.clone());
            }
        }
        if entries.remove(key).is_some() {
            debug!(key = key.as_str(), "evicted expired entry");
        }
        None
    }

    /// Store `value` and sweep out every expired entry
    pub fn insert(&self, key: CacheKey, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        let mut entries = self.entries();
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + self.ttl,
            },
        );
    }

    /// Cached value for `key`, or the result of `compute`, stored
    ///
    /// `compute` runs without the lock held.
    pub fn get_or_compute(&self, key: CacheKey, compute: impl FnOnce() -> V) -> V {
        if let Some(value) = self.get(&key) {
            debug!(key = key.as_str(), "cache hit");
            return value;
        }
        debug!(key = key.as_str(), "cache miss");
        let value = compute();
        self.insert(key, value.clone());
        value
    }

    /// Like [`Memoizer::get_or_compute`], but errors are returned and not cached
    pub fn get_or_try_compute<E>(
        &self,
        key: CacheKey,
        compute: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        if let Some(value) = self.get(&key) {
            debug!(key = key.as_str(), "cache hit");
            return Ok(value);
        }
        debug!(key = key.as_str(), "cache miss");
        let value = compute()?;
        self.insert(key, value.clone());
        Ok(value)
    }

    /// Drop expired entries
    pub fn clear_expired(&self) {
        let now = Instant::now();
        self.entries().retain(|_, entry| entry.expires_at > now);
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    /// Stored entries, including expired ones not yet cleared
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn key(function: &str) -> CacheKey {
        CacheKey::new(
            "AAPL",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            function,
        )
    }

    #[test]
    fn test_key_depends_on_every_part() {
        assert_eq!(key("forecast"), key("forecast"));
        assert_ne!(key("forecast"), key("rsi"));
        assert_eq!(key("forecast").as_str().len(), 64);
    }

    #[test]
    fn test_second_call_is_served_from_cache() {
        let cache = Memoizer::new(Duration::from_secs(60));
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            42
        };
        assert_eq!(cache.get_or_compute(key("forecast"), compute), 42);
        assert_eq!(cache.get_or_compute(key("forecast"), compute), 42);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_entries_expire() {
        let cache = Memoizer::new(Duration::from_millis(20));
        cache.insert(key("forecast"), 1.5);
        assert_eq!(cache.get(&key("forecast")), Some(1.5));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&key("forecast")), None);
        cache.clear_expired();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_expired_entries_do_not_accumulate() {
        let cache = Memoizer::new(Duration::from_millis(20));
        cache.insert(key("forecast"), 1);
        cache.insert(key("rsi"), 2);
        std::thread::sleep(Duration::from_millis(40));

        cache.insert(key("macd"), 3);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key("macd")), Some(3));

        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&key("macd")), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache: Memoizer<u32> = Memoizer::new(Duration::from_secs(60));
        let failed: Result<u32, &str> = cache.get_or_try_compute(key("profile"), || Err("rate limited"));
        assert!(failed.is_err());
        assert!(cache.is_empty());
        let ok: Result<u32, &str> = cache.get_or_try_compute(key("profile"), || Ok(7));
        assert_eq!(ok, Ok(7));
    }

    #[test]
    fn test_disabled_cache_stores_nothing() {
        let cache = Memoizer::disabled();
        cache.insert(key("forecast"), "x".to_string());
        assert!(cache.get(&key("forecast")).is_none());
    }
}
