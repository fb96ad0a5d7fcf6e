//! Cache Entry Module
//!
//! Defines the cached ad set together with the instant it was fetched.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::models::AdRecord;

// == Cache Entry ==
/// The full ad set from one successful fetch.
///
/// Entries are never edited; a refresh builds a new entry and replaces the
/// old one wholesale.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Ads in store order (newest first)
    ads: Arc<Vec<AdRecord>>,
    /// When the fetch completed
    fetched_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Wraps a freshly fetched ad set.
    pub fn new(ads: Vec<AdRecord>) -> Self {
        Self {
            ads: Arc::new(ads),
            fetched_at: Instant::now(),
        }
    }

    /// Shared handle to the cached ads.
    pub fn ads(&self) -> Arc<Vec<AdRecord>> {
        Arc::clone(&self.ads)
    }

    pub fn len(&self) -> usize {
        self.ads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ads.is_empty()
    }

    /// Time elapsed since the fetch completed.
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    // == Is Stale ==
    /// An entry is stale once its age reaches the TTL.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.age() >= ttl
    }
}
