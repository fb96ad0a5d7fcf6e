//! Ad Store Module
//!
//! The ad store is the sole owner of durable ad state. The core reads the
//! full ad set from it and relays counter increments to it; everything else
//! (schema, CRUD screens) lives behind this trait.

mod memory;
mod rest;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{AdDraft, AdPatch, AdRecord};

pub use memory::InMemoryAdStore;
pub use rest::RestAdStore;

// == Ad Store Trait ==
/// Persistent table of ad records.
#[async_trait]
pub trait AdStore: Send + Sync + 'static {
    /// Returns every ad, most recently created first.
    async fn select_all(&self) -> Result<Vec<AdRecord>>;

    /// Inserts a new ad and returns the stored record.
    async fn insert(&self, draft: AdDraft) -> Result<AdRecord>;

    /// Applies a partial update and returns the stored record.
    async fn update(&self, id: &str, patch: AdPatch) -> Result<AdRecord>;

    /// Deletes an ad.
    async fn delete(&self, id: &str) -> Result<()>;

    /// Increments `impression_count` by one for each id in a single call.
    async fn increment_impressions(&self, ad_ids: &[String]) -> Result<()>;

    /// Increments `click_count` by exactly one.
    async fn increment_click(&self, ad_id: &str) -> Result<()>;
}
