//! Cache Statistics Module
//!
//! Tracks ad cache behaviour: hits, misses, refreshes, failed fetches and
//! invalidations.

use serde::Serialize;

// == Cache Stats ==
/// Tracks ad cache metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Calls answered from a fresh entry
    pub hits: u64,
    /// Calls that had to go to the store
    pub misses: u64,
    /// Fetches that replaced the entry
    pub refreshes: u64,
    /// Fetches that failed
    pub fetch_failures: u64,
    /// Explicit invalidations
    pub invalidations: u64,
    /// Number of ads in the current entry
    pub cached_ads: usize,
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
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts a refresh and the size of the new entry.
    pub fn record_refresh(&mut self, cached_ads: usize) {
        self.refreshes += 1;
        self.cached_ads = cached_ads;
    }

    pub fn record_fetch_failure(&mut self) {
        self.fetch_failures += 1;
    }

    pub fn record_invalidation(&mut self) {
        self.invalidations += 1;
        self.cached_ads = 0;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = CacheStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.refreshes, 0);
        assert_eq!(stats.cached_ads, 0);
    }

    #[test]
    fn test_hit_rate_no_requests() {
        let stats = CacheStats::new();
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = CacheStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_refresh_then_invalidate() {
        let mut stats = CacheStats::new();
        stats.record_refresh(12);
        assert_eq!(stats.refreshes, 1);
        assert_eq!(stats.cached_ads, 12);

        stats.record_invalidation();
        assert_eq!(stats.invalidations, 1);
        assert_eq!(stats.cached_ads, 0);
    }

    #[test]
    fn test_record_fetch_failure() {
        let mut stats = CacheStats::new();
        stats.record_fetch_failure();
        stats.record_fetch_failure();
        assert_eq!(stats.fetch_failures, 2);
    }
}
