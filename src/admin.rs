//! Admin Gateway
//!
//! Mutations issued by the back office. The store does the work; the
//! gateway's job is to drop the ad cache after every mutation that succeeds
//! so the next placement query sees the change.

use std::sync::Arc;

use tracing::info;

use crate::cache::AdCache;
use crate::error::{AdError, Result};
use crate::models::{AdDraft, AdPatch, AdRecord};
use crate::store::AdStore;

#[derive(Clone)]
pub struct AdminGateway {
    store: Arc<dyn AdStore>,
    cache: Arc<AdCache>,
}

impl AdminGateway {
    pub fn new(store: Arc<dyn AdStore>, cache: Arc<AdCache>) -> Self {
        Self { store, cache }
    }

    pub async fn create(&self, draft: AdDraft) -> Result<AdRecord> {
        if let Some(msg) = draft.validate() {
            return Err(AdError::InvalidRequest(msg));
        }
        let ad = self.store.insert(draft).await?;
        self.cache.invalidate().await;
        info!("Ad {} created", ad.id);
        Ok(ad)
    }

    pub async fn update(&self, id: &str, patch: AdPatch) -> Result<AdRecord> {
        if let Some(msg) = patch.validate() {
            return Err(AdError::InvalidRequest(msg));
        }
        let ad = self.store.update(id, patch).await?;
        self.cache.invalidate().await;
        info!("Ad {} updated", id);
        Ok(ad)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.store.delete(id).await?;
        self.cache.invalidate().await;
        info!("Ad {} deleted", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AdType, Placement};
    use crate::store::InMemoryAdStore;

    fn setup() -> (Arc<InMemoryAdStore>, Arc<AdCache>, AdminGateway) {
        let store = Arc::new(InMemoryAdStore::with_ads(vec![AdRecord::new(
            "a1",
            "Existing",
            Placement::Sidebar,
        )
        .with_image("https://cdn/a1.png")]));
        let cache = Arc::new(AdCache::with_default_ttl(store.clone()));
        let gateway = AdminGateway::new(store.clone(), cache.clone());
        (store, cache, gateway)
    }

    fn draft() -> AdDraft {
        AdDraft {
            title: "Fresh".to_string(),
            ad_type: AdType::Video,
            placement: Placement::PreRoll,
            image_url: None,
            ad_code: Some("<video></video>".to_string()),
            link_url: None,
            is_active: true,
            priority: 1,
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn test_create_invalidates_cache() {
        let (store, cache, gateway) = setup();
        assert_eq!(cache.get_all().await.len(), 1);

        let ad = gateway.create(draft()).await.unwrap();
        assert!(!cache.is_warm().await);

        let ads = cache.get_all().await;
        assert_eq!(ads.len(), 2);
        assert!(ads.iter().any(|a| a.id == ad.id));
        assert_eq!(store.select_calls(), 2);
    }

    #[tokio::test]
    async fn test_update_and_delete_invalidate_cache() {
        let (_store, cache, gateway) = setup();
        cache.get_all().await;

        let patch = AdPatch {
            priority: Some(9),
            ..AdPatch::default()
        };
        gateway.update("a1", patch).await.unwrap();
        assert_eq!(cache.get_all().await[0].priority, 9);

        gateway.delete("a1").await.unwrap();
        assert!(cache.get_all().await.is_empty());
        assert_eq!(cache.stats().await.invalidations, 2);
    }

    #[tokio::test]
    async fn test_failed_mutation_keeps_cache() {
        let (_store, cache, gateway) = setup();
        cache.get_all().await;

        assert!(matches!(
            gateway.delete("missing").await,
            Err(AdError::NotFound(_))
        ));
        assert!(cache.is_warm().await);
        assert_eq!(cache.stats().await.invalidations, 0);
    }

    #[tokio::test]
    async fn test_invalid_requests_rejected() {
        let (_store, _cache, gateway) = setup();

        let mut bad = draft();
        bad.ad_code = None;
        assert!(matches!(
            gateway.create(bad).await,
            Err(AdError::InvalidRequest(_))
        ));
        assert!(matches!(
            gateway.update("a1", AdPatch::default()).await,
            Err(AdError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_update_cannot_strip_creative() {
        let (store, cache, gateway) = setup();
        cache.get_all().await;

        let patch = AdPatch {
            image_url: Some(None),
            ad_code: Some(None),
            ..AdPatch::default()
        };
        assert!(matches!(
            gateway.update("a1", patch).await,
            Err(AdError::InvalidRequest(_))
        ));

        let stored = store.get("a1").await.unwrap();
        assert!(stored.creative().is_some());
        assert!(cache.is_warm().await);
    }
}
