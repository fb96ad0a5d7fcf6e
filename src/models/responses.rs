//! Response DTOs for the ad delivery API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use tracing::warn;

use crate::cache::CacheStats;
use crate::error::AdError;
use crate::models::{AdRecord, AdType, Creative, Placement};
use crate::tracking::{BatchStats, Navigation, TrackerState};

/// Render-ready view of an ad
#[derive(Debug, Clone, Serialize)]
pub struct AdView {
    pub id: String,
    pub title: String,
    pub ad_type: AdType,
    pub placement: Placement,
    pub creative: Creative,
    pub link_url: Option<String>,
    pub priority: i32,
}

impl TryFrom<&AdRecord> for AdView {
    type Error = AdError;

    fn try_from(ad: &AdRecord) -> Result<Self, Self::Error> {
        let creative = ad
            .creative()
            .ok_or_else(|| AdError::MalformedAd(format!("ad '{}' has no creative", ad.id)))?;
        Ok(Self {
            id: ad.id.clone(),
            title: ad.title.clone(),
            ad_type: ad.ad_type,
            placement: ad.placement,
            creative,
            link_url: ad.link_url.clone(),
            priority: ad.priority,
        })
    }
}

/// Response body for the ad listing endpoints
#[derive(Debug, Clone, Serialize)]
pub struct AdsResponse {
    /// Requested placement, or "general"
    pub placement: String,
    /// Number of ads returned
    pub count: usize,
    /// Ads in render order
    pub ads: Vec<AdView>,
}

impl AdsResponse {
    /// Builds the response, skipping ads that cannot be rendered.
    pub fn new(placement: impl Into<String>, ads: &[AdRecord]) -> Self {
        let ads: Vec<AdView> = ads
            .iter()
            .filter_map(|ad| match AdView::try_from(ad) {
                Ok(view) => Some(view),
                Err(err) => {
                    warn!("Skipping ad: {}", err);
                    None
                }
            })
            .collect();
        Self {
            placement: placement.into(),
            count: ads.len(),
            ads,
        }
    }
}

/// Response body for POST /ads/:id/impression
#[derive(Debug, Clone, Serialize)]
pub struct ImpressionResponse {
    pub ad_id: String,
    /// Batcher state after queuing the impression
    pub state: TrackerState,
}

/// Response body for POST /ads/:id/click
#[derive(Debug, Clone, Serialize)]
pub struct ClickResponse {
    pub ad_id: String,
    /// Whether the click counter increment succeeded
    pub recorded: bool,
    /// Where the client should open, if the ad links anywhere
    pub navigation: Option<Navigation>,
}

/// Response body for admin mutations and cache invalidation
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub cache: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub cache_hit_rate: f64,
    pub impressions: BatchStats,
    pub impression_state: TrackerState,
}

impl StatsResponse {
    pub fn new(cache: CacheStats, impressions: BatchStats, impression_state: TrackerState) -> Self {
        Self {
            cache_hit_rate: cache.hit_rate(),
            cache,
            impressions,
            impression_state,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
