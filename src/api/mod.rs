//! API Module
//!
//! HTTP handlers and routing for the ad delivery REST API.
//!
//! # Endpoints
//! - `GET /ads` - Eligible ads outside header/footer
//! - `GET /ads/placement/:placement` - Ads resolved for a placement
//! - `POST /ads/:id/impression` - Queue an impression
//! - `POST /ads/:id/click` - Count a click
//! - `POST|PATCH|DELETE /admin/ads[/:id]` - Admin mutations
//! - `POST /cache/invalidate` - Drop the ad cache
//! - `GET /stats` - Statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
