//! Cache Statistics Module
//!
//! Tracks lookup and load counters for a cache group.

use serde::Serialize;

// == Cache Stats ==
/// Snapshot of cache performance metrics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing in the cache
    pub misses: u64,
    /// Successful loader invocations
    pub loads: u64,
    /// Loader invocations that returned an error
    pub load_errors: u64,
    /// Live entries in the cache
    pub entries: usize,
    /// Combined footprint of the live entries, in bytes
    pub bytes: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Record Hit ==
    /// Counts one lookup served from the cache.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    // == Record Miss ==
    /// Counts one lookup the cache could not serve.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }
}
