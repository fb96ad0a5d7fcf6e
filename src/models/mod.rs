//! Data model and DTOs for the ad delivery core
//!
//! `ad` holds the ad record as owned by the ad store; `requests` and
//! `responses` define the HTTP request/response bodies.

pub mod ad;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use ad::{AdDraft, AdPatch, AdRecord, AdType, Creative, Placement};
pub use requests::LimitQuery;
pub use responses::{
    AdView, AdsResponse, ClickResponse, HealthResponse, ImpressionResponse, MessageResponse,
    StatsResponse,
};
