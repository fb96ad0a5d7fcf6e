//! Ad Cache Module
//!
//! Process-local, time-bounded copy of the full ad set. Every placement query
//! reads through this cache; the store is only hit on a miss or after expiry.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, CacheStats, DEFAULT_TTL};
use crate::error::Result;
use crate::models::AdRecord;
use crate::store::AdStore;

// == Cache Slot ==
#[derive(Debug, Default)]
struct Slot {
    entry: Option<CacheEntry>,
    /// Bumped on every invalidation; a fetch only installs its result if the
    /// epoch it started under is still current.
    epoch: u64,
}

// == Ad Cache ==
/// Cache of the full ad set with TTL expiry and explicit invalidation.
pub struct AdCache {
    store: Arc<dyn AdStore>,
    ttl: Duration,
    slot: RwLock<Slot>,
    stats: Mutex<CacheStats>,
}

impl AdCache {
    // == Constructor ==
    /// Creates an empty cache in front of `store`.
    pub fn new(store: Arc<dyn AdStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl,
            slot: RwLock::new(Slot::default()),
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Creates a cache with the default five minute TTL.
    pub fn with_default_ttl(store: Arc<dyn AdStore>) -> Self {
        Self::new(store, DEFAULT_TTL)
    }

    // == Get All ==
    /// Returns the full ad set, newest first.
    ///
    /// A failed fetch yields an empty set; the error is logged and counted.
    pub async fn get_all(&self) -> Arc<Vec<AdRecord>> {
        match self.try_get_all().await {
            Ok(ads) => ads,
            Err(_) => Arc::new(Vec::new()),
        }
    }

    /// Like [`AdCache::get_all`] but surfaces fetch failures.
    ///
    /// A failed fetch leaves the current entry untouched.
    pub async fn try_get_all(&self) -> Result<Arc<Vec<AdRecord>>> {
        let (fresh, epoch) = {
            let slot = self.slot.read().await;
            let fresh = slot
                .entry
                .as_ref()
                .filter(|entry| !entry.is_stale(self.ttl))
                .map(CacheEntry::ads);
            (fresh, slot.epoch)
        };

        if let Some(ads) = fresh {
            self.stats.lock().await.record_hit();
            debug!("Serving {} ads from cache", ads.len());
            return Ok(ads);
        }

        self.stats.lock().await.record_miss();
        debug!("Fetching fresh ads from store");

        let ads = match self.store.select_all().await {
            Ok(ads) => ads,
            Err(err) => {
                self.stats.lock().await.record_fetch_failure();
                warn!("Failed to fetch ads: {}", err);
                return Err(err);
            }
        };

        let entry = CacheEntry::new(ads);
        if entry.is_empty() {
            warn!("Ad store returned no ads");
        }
        let ads = entry.ads();
        let installed = {
            let mut slot = self.slot.write().await;
            if slot.epoch == epoch {
                // Last completed fetch wins
                slot.entry = Some(entry);
                true
            } else {
                false
            }
        };

        if installed {
            self.stats.lock().await.record_refresh(ads.len());
            info!("Ad cache refreshed: {} ads for {:?}", ads.len(), self.ttl);
        } else {
            debug!("Cache invalidated during fetch; not caching result");
        }
        Ok(ads)
    }

    // == Invalidate ==
    /// Drops the cached entry unconditionally.
    pub async fn invalidate(&self) {
        {
            let mut slot = self.slot.write().await;
            slot.entry = None;
            slot.epoch += 1;
        }
        self.stats.lock().await.record_invalidation();
        info!("Ad cache invalidated");
    }

    /// Whether a fresh entry is currently held.
    pub async fn is_warm(&self) -> bool {
        self.slot
            .read()
            .await
            .entry
            .as_ref()
            .is_some_and(|entry| !entry.is_stale(self.ttl))
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let cached_ads = self
            .slot
            .read()
            .await
            .entry
            .as_ref()
            .map_or(0, CacheEntry::len);
        let mut stats = self.stats.lock().await.clone();
        stats.cached_ads = cached_ads;
        stats
    }
}
