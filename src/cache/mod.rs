//! Cache Module
//!
//! Provides the time-bounded, whole-set ad cache with explicit invalidation.

mod ad_cache;
mod entry;
mod stats;

use std::time::Duration;

// Re-export public types
pub use ad_cache::AdCache;
pub use entry::CacheEntry;
pub use stats::CacheStats;

// == Public Constants ==
/// How long a fetched ad set is served before the next call refreshes it
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);
