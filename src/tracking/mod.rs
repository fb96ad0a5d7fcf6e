//! Tracking Module
//!
//! Relays engagement to the ad store. Impressions are debounced and batched;
//! clicks go straight to the store.
//!
//! Both trackers move through the same states: `Idle` → `Pending` (impressions
//! only, timer armed) → `InFlight` → back to `Idle`, whether the store call
//! succeeded or the batch was dropped.

mod clicks;
mod impressions;

use std::time::Duration;

use serde::Serialize;

pub use clicks::{ClickOutcome, ClickTracker, Navigation};
pub use impressions::{BatchStats, ImpressionBatcher};

/// Quiet period after the latest impression before a batch is sent
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_secs(2);

// == Tracker State ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerState {
    /// Nothing buffered, nothing being sent
    Idle,
    /// Events buffered and a flush timer armed
    Pending,
    /// A store call is in progress
    InFlight,
}
