//! Request DTOs for the ad delivery API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;

use crate::models::Placement;
use crate::placement::{DEFAULT_LIMIT, UNBOUNDED_LIMIT};

/// Query string for the ad listing endpoints (`?limit=N`)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LimitQuery {
    /// Maximum number of ads to return; zero or negative yields no ads
    #[serde(default)]
    pub limit: Option<i64>,
}

impl LimitQuery {
    /// Effective limit, falling back to a single ad.
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Effective limit for a placement request. The header band renders
    /// every matching ad unless the caller asks for fewer.
    pub fn limit_for(&self, placement: &str) -> i64 {
        match self.limit {
            Some(limit) => limit,
            None if placement == Placement::Header.as_str() => UNBOUNDED_LIMIT,
            None => DEFAULT_LIMIT,
        }
    }
}
