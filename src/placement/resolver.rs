//! Placement Resolver
//!
//! Maps the full ad set, a placement and an instant to the ordered ads to
//! render. The pure functions take `now` explicitly; [`PlacementResolver`]
//! reads through the ad cache with the current time.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::AdCache;
use crate::models::{AdRecord, Placement};

/// Limit used by most slots, which render a single ad
pub const DEFAULT_LIMIT: i64 = 1;

/// Limit for slots that render every matching ad (the header band)
pub const UNBOUNDED_LIMIT: i64 = i64::MAX;

fn capacity(limit: i64) -> usize {
    usize::try_from(limit).unwrap_or(usize::MAX)
}

// == Resolve Placement ==
/// Eligible ads whose canonical placement equals `placement`, highest
/// priority first, at most `limit` of them.
///
/// Equal priorities keep their incoming (newest first) order. An unknown
/// placement or a non-positive limit yields no ads.
pub fn resolve_placement(
    ads: &[AdRecord],
    placement: &str,
    limit: i64,
    now: DateTime<Utc>,
) -> Vec<AdRecord> {
    if limit <= 0 {
        return Vec::new();
    }
    let Ok(requested) = placement.parse::<Placement>() else {
        debug!("Unknown placement requested: {}", placement);
        return Vec::new();
    };

    let mut matched: Vec<&AdRecord> = ads
        .iter()
        .filter(|ad| ad.placement.canonical() == requested && ad.is_eligible_at(now))
        .collect();
    // sort_by is stable
    matched.sort_by(|a, b| b.priority.cmp(&a.priority));

    matched
        .into_iter()
        .take(capacity(limit))
        .cloned()
        .collect()
}

// == Resolve General ==
/// Eligible ads not reserved for the header or footer, in incoming order,
/// at most `limit` of them.
pub fn resolve_general(ads: &[AdRecord], limit: i64, now: DateTime<Utc>) -> Vec<AdRecord> {
    if limit <= 0 {
        return Vec::new();
    }
    ads.iter()
        .filter(|ad| !ad.placement.is_reserved() && ad.is_eligible_at(now))
        .take(capacity(limit))
        .cloned()
        .collect()
}

// == Placement Resolver ==
/// Answers placement queries from the ad cache.
#[derive(Clone)]
pub struct PlacementResolver {
    cache: Arc<AdCache>,
}

impl PlacementResolver {
    pub fn new(cache: Arc<AdCache>) -> Self {
        Self { cache }
    }

    /// Ads to render in `placement`, best first.
    pub async fn resolve(&self, placement: &str, limit: i64) -> Vec<AdRecord> {
        let ads = self.cache.get_all().await;
        let resolved = resolve_placement(&ads, placement, limit, Utc::now());
        debug!(
            "Resolved {} of {} ads for placement {}",
            resolved.len(),
            ads.len(),
            placement
        );
        resolved
    }

    /// Ads for non-curated banner bands.
    pub async fn resolve_general(&self, limit: i64) -> Vec<AdRecord> {
        let ads = self.cache.get_all().await;
        resolve_general(&ads, limit, Utc::now())
    }
}
