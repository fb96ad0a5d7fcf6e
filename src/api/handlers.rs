//! API Handlers
//!
//! HTTP request handlers for each ad delivery endpoint.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::admin::AdminGateway;
use crate::cache::AdCache;
use crate::config::Config;
use crate::error::{AdError, Result};
use crate::models::{
    AdDraft, AdPatch, AdRecord, AdsResponse, ClickResponse, HealthResponse, ImpressionResponse,
    LimitQuery, MessageResponse, StatsResponse,
};
use crate::placement::PlacementResolver;
use crate::store::AdStore;
use crate::tracking::{ClickTracker, ImpressionBatcher};

/// Application state shared across all handlers.
///
/// Every component is built once here and shared by reference; handlers
/// never reach for global state.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<AdCache>,
    pub resolver: PlacementResolver,
    pub impressions: ImpressionBatcher,
    pub clicks: ClickTracker,
    pub admin: AdminGateway,
}

impl AppState {
    /// Wires the core around `store`.
    pub fn new(store: Arc<dyn AdStore>, cache_ttl: Duration, debounce: Duration) -> Self {
        let cache = Arc::new(AdCache::new(store.clone(), cache_ttl));
        Self {
            resolver: PlacementResolver::new(cache.clone()),
            impressions: ImpressionBatcher::new(store.clone(), debounce),
            clicks: ClickTracker::new(store.clone()),
            admin: AdminGateway::new(store, cache.clone()),
            cache,
        }
    }

    /// Wires the core with the TTL and debounce delay from the Config.
    pub fn from_config(config: &Config, store: Arc<dyn AdStore>) -> Self {
        Self::new(store, config.cache_ttl(), config.impression_debounce())
    }
}

/// Handler for GET /ads
///
/// Eligible ads outside the header and footer bands.
pub async fn general_ads_handler(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<AdsResponse> {
    let ads = state.resolver.resolve_general(query.limit()).await;
    Json(AdsResponse::new("general", &ads))
}

/// Handler for GET /ads/placement/:placement
///
/// Without `?limit`, the header returns every eligible ad and other
/// placements return one.
pub async fn placement_ads_handler(
    State(state): State<AppState>,
    Path(placement): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Json<AdsResponse> {
    let ads = state.resolver.resolve(&placement, query.limit_for(&placement)).await;
    Json(AdsResponse::new(placement, &ads))
}

/// Handler for POST /ads/:id/impression
///
/// Queues the impression and answers before it is sent.
pub async fn impression_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> (StatusCode, Json<ImpressionResponse>) {
    state.impressions.record(id.clone()).await;
    let response = ImpressionResponse {
        ad_id: id,
        state: state.impressions.state().await,
    };
    (StatusCode::ACCEPTED, Json(response))
}

/// Handler for POST /ads/:id/click
///
/// Counts the click and returns the navigation for the ad's link. The
/// navigation is returned even when counting failed.
pub async fn click_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let ad = find_ad(&state, &id).await?;
    let outcome = state.clicks.record(&ad).await;

    let response = ClickResponse {
        ad_id: id,
        recorded: outcome.recorded.is_ok(),
        navigation: outcome.navigation,
    };
    Ok(([(header::REFERRER_POLICY, "no-referrer")], Json(response)))
}

async fn find_ad(state: &AppState, id: &str) -> Result<AdRecord> {
    state
        .cache
        .get_all()
        .await
        .iter()
        .find(|ad| ad.id == id)
        .cloned()
        .ok_or_else(|| AdError::NotFound(id.to_string()))
}

/// Handler for POST /admin/ads
pub async fn create_ad_handler(
    State(state): State<AppState>,
    Json(draft): Json<AdDraft>,
) -> Result<(StatusCode, Json<AdRecord>)> {
    let ad = state.admin.create(draft).await?;
    Ok((StatusCode::CREATED, Json(ad)))
}

/// Handler for PATCH /admin/ads/:id
pub async fn update_ad_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<AdPatch>,
) -> Result<Json<AdRecord>> {
    let ad = state.admin.update(&id, patch).await?;
    Ok(Json(ad))
}

/// Handler for DELETE /admin/ads/:id
pub async fn delete_ad_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.admin.delete(&id).await?;
    Ok(Json(MessageResponse::new(format!(
        "Ad '{}' deleted successfully",
        id
    ))))
}

/// Handler for POST /cache/invalidate
pub async fn invalidate_handler(State(state): State<AppState>) -> Json<MessageResponse> {
    state.cache.invalidate().await;
    Json(MessageResponse::new("Ad cache invalidated"))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.cache.stats().await,
        state.impressions.stats().await,
        state.impressions.state().await,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
