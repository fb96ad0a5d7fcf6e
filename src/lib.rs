//! Ad Delivery - cached ad placement with batched engagement tracking
//!
//! Serves the ads for a page placement from a time-bounded cache of the full
//! ad set and relays impressions (debounced, batched) and clicks to the ad
//! store.

pub mod admin;
pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod placement;
pub mod store;
pub mod tasks;
pub mod tracking;

pub use admin::AdminGateway;
pub use api::AppState;
pub use cache::AdCache;
pub use config::Config;
pub use error::{AdError, Result};
pub use placement::PlacementResolver;
pub use store::{AdStore, InMemoryAdStore, RestAdStore};
pub use tracking::{ClickTracker, ImpressionBatcher};
