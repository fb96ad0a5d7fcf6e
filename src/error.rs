//! Error types for the ad delivery core
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Ad Error Enum ==
/// Unified error type for the ad delivery core.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdError {
    /// The ad store could not be reached or rejected the request
    #[error("Ad store unavailable: {0}")]
    StoreUnavailable(String),

    /// An impression or click increment failed
    #[error("Tracking failed: {0}")]
    TrackingFailed(String),

    /// Ad not found
    #[error("Ad not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Ad record carries no creative payload
    #[error("Malformed ad: {0}")]
    MalformedAd(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AdError {
    fn from(err: reqwest::Error) -> Self {
        AdError::StoreUnavailable(err.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for AdError {
    fn into_response(self) -> Response {
        let status = match &self {
            AdError::StoreUnavailable(_) => StatusCode::BAD_GATEWAY,
            AdError::TrackingFailed(_) => StatusCode::BAD_GATEWAY,
            AdError::NotFound(_) => StatusCode::NOT_FOUND,
            AdError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AdError::MalformedAd(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AdError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the ad delivery core.
pub type Result<T> = std::result::Result<T, AdError>;
