//! Cache Store Module
//!
//! Thread-safe wrapper around a single [`LruCache`] of [`ByteView`] values.

use parking_lot::Mutex;

use crate::cache::{ByteView, CacheStats, LruCache};

#[derive(Debug, Default)]
struct Inner {
    /// Built on the first `add`, so unused groups allocate nothing
    lru: Option<LruCache<ByteView>>,
    stats: CacheStats,
}

// == Cache Store ==
/// Concurrency-safe cache shared by every caller of a group.
///
/// All access, including lookups (which reorder recency), goes through one
/// mutex. The underlying engine is never handed out.
#[derive(Debug)]
pub struct CacheStore {
    cache_bytes: u64,
    inner: Mutex<Inner>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store bounded to `cache_bytes` (`0` = unbounded).
    pub fn new(cache_bytes: u64) -> Self {
        Self {
            cache_bytes,
            inner: Mutex::new(Inner::default()),
        }
    }

    // == Add ==
    /// Stores a value, building the engine on first use.
    pub fn add(&self, key: &str, value: ByteView) {
        let mut inner = self.inner.lock();
        let cache_bytes = self.cache_bytes;
        inner
            .lru
            .get_or_insert_with(|| LruCache::new(cache_bytes, None))
            .add(key, value);
    }

    // == Get ==
    /// Looks up a value and records the hit or miss.
    ///
    /// A store that has never been written to answers `None` without
    /// building the engine.
    pub fn get(&self, key: &str) -> Option<ByteView> {
        let mut inner = self.inner.lock();
        let found = inner.lru.as_mut().and_then(|lru| lru.get(key).cloned());
        match found {
            Some(_) => inner.stats.record_hit(),
            None => inner.stats.record_miss(),
        }
        found
    }

    // == Stats ==
    /// Returns hit/miss counters together with current occupancy.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        if let Some(lru) = inner.lru.as_ref() {
            stats.entries = lru.len();
            stats.bytes = lru.bytes();
        }
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.inner.lock().lru.as_ref().map_or(0, LruCache::len)
    }

    /// Returns true when the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the combined footprint of the stored entries.
    pub fn bytes(&self) -> u64 {
        self.inner.lock().lru.as_ref().map_or(0, LruCache::bytes)
    }

    /// Returns the configured byte budget.
    pub fn cache_bytes(&self) -> u64 {
        self.cache_bytes
    }

    #[cfg(test)]
    fn is_initialized(&self) -> bool {
        self.inner.lock().lru.is_some()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(100);
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.cache_bytes(), 100);
    }

    #[test]
    fn test_store_get_before_add_stays_lazy() {
        let store = CacheStore::new(100);

        assert!(store.get("missing").is_none());
        assert!(!store.is_initialized());

        store.add("key", ByteView::from("value"));
        assert!(store.is_initialized());
    }

    #[test]
    fn test_store_add_and_get() {
        let store = CacheStore::new(100);

        store.add("key1", ByteView::from("value1"));

        assert_eq!(store.get("key1"), Some(ByteView::from("value1")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.bytes(), 4 + 6);
    }

    #[test]
    fn test_store_eviction() {
        let store = CacheStore::new(10);

        store.add("k1", ByteView::from("v1"));
        store.add("k2", ByteView::from("v2"));
        store.add("k3", ByteView::from("v3"));

        assert!(store.get("k1").is_none());
        assert_eq!(store.get("k2"), Some(ByteView::from("v2")));
        assert_eq!(store.get("k3"), Some(ByteView::from("v3")));
    }

    #[test]
    fn test_store_stats() {
        let store = CacheStore::new(100);

        store.add("key1", ByteView::from("value1"));
        store.get("key1");
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.bytes, 10);
    }

    #[test]
    fn test_store_concurrent_access() {
        let store = Arc::new(CacheStore::new(0));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let store = store.clone();
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("t{}-{}", t, i);
                        store.add(&key, ByteView::from(key.as_str()));
                        assert!(store.get(&key).is_some());
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 800);
        assert_eq!(store.stats().hits, 800);
    }
}
