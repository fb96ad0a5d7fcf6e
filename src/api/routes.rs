//! API Routes
//!
//! Configures the Axum router with all ad delivery endpoints.

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    click_handler, create_ad_handler, delete_ad_handler, general_ads_handler, health_handler,
    impression_handler, invalidate_handler, placement_ads_handler, stats_handler,
    update_ad_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /ads` - Eligible ads outside header/footer
/// - `GET /ads/placement/:placement` - Ads resolved for a placement
/// - `POST /ads/:id/impression` - Queue an impression
/// - `POST /ads/:id/click` - Count a click and get the navigation
/// - `POST /admin/ads` - Create an ad
/// - `PATCH /admin/ads/:id` - Update an ad
/// - `DELETE /admin/ads/:id` - Delete an ad
/// - `POST /cache/invalidate` - Drop the ad cache
/// - `GET /stats` - Cache and tracking statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: any origin, since ad slots are embedded by third-party pages
/// - Tracing: one span per request
pub fn create_router(state: AppState) -> Router {
    // Ad slots are requested cross-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ads", get(general_ads_handler))
        .route("/ads/placement/:placement", get(placement_ads_handler))
        .route("/ads/:id/impression", post(impression_handler))
        .route("/ads/:id/click", post(click_handler))
        .route("/admin/ads", post(create_ad_handler))
        .route(
            "/admin/ads/:id",
            patch(update_ad_handler).delete(delete_ad_handler),
        )
        .route("/cache/invalidate", post(invalidate_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdRecord, Placement};
    use crate::store::InMemoryAdStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use std::time::Duration;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let store = Arc::new(InMemoryAdStore::with_ads(vec![AdRecord::new(
            "a1",
            "Header",
            Placement::Header,
        )
        .with_image("https://cdn/a1.png")]));
        let state = AppState::new(store, Duration::from_secs(300), Duration::from_millis(100));
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_placement_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/ads/placement/header?limit=5")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_impression_endpoint_accepted() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ads/a1/impression")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_click_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/ads/missing/click")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
