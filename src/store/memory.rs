//! In-Memory Ad Store
//!
//! Process-local ad store used when no hosted store is configured. Keeps a
//! journal of the calls it receives and can be switched offline to simulate
//! an outage.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::error::{AdError, Result};
use crate::models::{AdDraft, AdPatch, AdRecord};
use crate::store::AdStore;

// == Call Journal ==
#[derive(Debug, Default)]
struct Journal {
    impression_batches: Vec<Vec<String>>,
    click_calls: Vec<String>,
}

// == In-Memory Store ==
#[derive(Debug, Default)]
pub struct InMemoryAdStore {
    ads: RwLock<Vec<AdRecord>>,
    journal: Mutex<Journal>,
    select_calls: AtomicUsize,
    offline: AtomicBool,
    latency_ms: AtomicU64,
}

impl InMemoryAdStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given ads.
    pub fn with_ads(ads: Vec<AdRecord>) -> Self {
        Self {
            ads: RwLock::new(ads),
            ..Self::default()
        }
    }

    /// Switches the store on or off. While off, every call fails.
    pub fn set_available(&self, available: bool) {
        self.offline.store(!available, Ordering::SeqCst);
    }

    /// Adds an artificial delay to every call.
    pub fn set_latency(&self, latency: Duration) {
        self.latency_ms
            .store(latency.as_millis() as u64, Ordering::SeqCst);
    }

    /// Number of `select_all` calls received, including failed ones.
    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    /// Every impression batch received, in arrival order, including failed ones.
    pub async fn impression_batches(&self) -> Vec<Vec<String>> {
        self.journal.lock().await.impression_batches.clone()
    }

    /// Every click increment received, in arrival order, including failed ones.
    pub async fn click_calls(&self) -> Vec<String> {
        self.journal.lock().await.click_calls.clone()
    }

    /// Looks up a single ad by id.
    pub async fn get(&self, id: &str) -> Option<AdRecord> {
        self.ads.read().await.iter().find(|ad| ad.id == id).cloned()
    }

    async fn enter(&self) -> Result<()> {
        let latency = self.latency_ms.load(Ordering::SeqCst);
        if latency > 0 {
            tokio::time::sleep(Duration::from_millis(latency)).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(AdError::StoreUnavailable(
                "in-memory store is offline".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl AdStore for InMemoryAdStore {
    async fn select_all(&self) -> Result<Vec<AdRecord>> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        self.enter().await?;

        let mut ads = self.ads.read().await.clone();
        // Stable, so ads sharing a timestamp keep insertion order
        ads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(ads)
    }

    async fn insert(&self, draft: AdDraft) -> Result<AdRecord> {
        self.enter().await?;

        let ad = draft.into_record(Uuid::new_v4().to_string(), Utc::now());
        self.ads.write().await.push(ad.clone());
        Ok(ad)
    }

    async fn update(&self, id: &str, patch: AdPatch) -> Result<AdRecord> {
        self.enter().await?;

        let mut ads = self.ads.write().await;
        let ad = ads
            .iter_mut()
            .find(|ad| ad.id == id)
            .ok_or_else(|| AdError::NotFound(id.to_string()))?;
        patch.apply(ad);
        Ok(ad.clone())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.enter().await?;

        let mut ads = self.ads.write().await;
        let before = ads.len();
        ads.retain(|ad| ad.id != id);
        if ads.len() == before {
            return Err(AdError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn increment_impressions(&self, ad_ids: &[String]) -> Result<()> {
        self.journal
            .lock()
            .await
            .impression_batches
            .push(ad_ids.to_vec());
        self.enter()
            .await
            .map_err(|err| AdError::TrackingFailed(err.to_string()))?;

        // Unknown ids are ignored, matching an UPDATE that touches no rows
        let mut ads = self.ads.write().await;
        for ad in ads.iter_mut().filter(|ad| ad_ids.contains(&ad.id)) {
            ad.impression_count += 1;
        }
        Ok(())
    }

    async fn increment_click(&self, ad_id: &str) -> Result<()> {
        self.journal.lock().await.click_calls.push(ad_id.to_string());
        self.enter()
            .await
            .map_err(|err| AdError::TrackingFailed(err.to_string()))?;

        if let Some(ad) = self.ads.write().await.iter_mut().find(|ad| ad.id == ad_id) {
            ad.click_count += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdType, Placement};
    use chrono::Duration as ChronoDuration;

    fn draft(title: &str) -> AdDraft {
        AdDraft {
            title: title.to_string(),
            ad_type: AdType::Banner,
            placement: Placement::Sidebar,
            image_url: Some("https://cdn.example/ad.png".to_string()),
            ad_code: None,
            link_url: None,
            is_active: true,
            priority: 0,
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_select_all_newest_first() {
        let now = Utc::now();
        let mut older = AdRecord::new("old", "Old", Placement::Header);
        older.created_at = now - ChronoDuration::hours(1);
        let newer = AdRecord::new("new", "New", Placement::Header);
        let store = InMemoryAdStore::with_ads(vec![older, newer]);

        let ads = store.select_all().await.unwrap();
        let ids: Vec<&str> = ads.iter().map(|ad| ad.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "old"]);
        assert_eq!(store.select_calls(), 1);
    }

    #[tokio::test]
    async fn test_insert_update_delete() {
        let store = InMemoryAdStore::new();

        let ad = store.insert(draft("First")).await.unwrap();
        assert_eq!(ad.impression_count, 0);
        assert!(store.get(&ad.id).await.is_some());

        let patch = AdPatch {
            priority: Some(4),
            ..AdPatch::default()
        };
        let updated = store.update(&ad.id, patch).await.unwrap();
        assert_eq!(updated.priority, 4);

        store.delete(&ad.id).await.unwrap();
        assert!(store.get(&ad.id).await.is_none());
        assert!(matches!(
            store.delete(&ad.id).await,
            Err(AdError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_increments() {
        let store = InMemoryAdStore::with_ads(vec![
            AdRecord::new("a1", "One", Placement::Sidebar),
            AdRecord::new("a2", "Two", Placement::Sidebar),
        ]);

        store
            .increment_impressions(&["a1".to_string(), "a2".to_string(), "ghost".to_string()])
            .await
            .unwrap();
        store.increment_click("a2").await.unwrap();

        assert_eq!(store.get("a1").await.unwrap().impression_count, 1);
        assert_eq!(store.get("a2").await.unwrap().impression_count, 1);
        assert_eq!(store.get("a2").await.unwrap().click_count, 1);
        assert_eq!(store.impression_batches().await.len(), 1);
        assert_eq!(store.click_calls().await, vec!["a2".to_string()]);
    }

    #[tokio::test]
    async fn test_offline_store_fails_but_journals() {
        let store = InMemoryAdStore::with_ads(vec![AdRecord::new("a1", "One", Placement::Sidebar)]);
        store.set_available(false);

        assert!(matches!(
            store.select_all().await,
            Err(AdError::StoreUnavailable(_))
        ));
        assert!(matches!(
            store.increment_click("a1").await,
            Err(AdError::TrackingFailed(_))
        ));
        assert_eq!(store.select_calls(), 1);
        assert_eq!(store.click_calls().await.len(), 1);
        assert_eq!(store.get("a1").await.unwrap().click_count, 0);

        store.set_available(true);
        assert!(store.select_all().await.is_ok());
    }
}
