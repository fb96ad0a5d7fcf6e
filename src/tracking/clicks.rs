//! Click Tracker
//!
//! Counts clicks one store call at a time and tells the caller where to
//! navigate. Counting and navigation are independent: a failed increment
//! never takes the navigation away.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{AdError, Result};
use crate::models::AdRecord;
use crate::store::AdStore;

// == Navigation ==
/// New-tab navigation to an ad's link that grants the opened page no
/// handle on the opener and sends no referrer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub url: String,
    /// Browsing context to open, always a new tab
    pub target: String,
    /// `window.open` feature string
    pub features: String,
    /// Value for the `Referrer-Policy` header
    pub referrer_policy: String,
}

impl Navigation {
    pub fn new_tab(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            target: "_blank".to_string(),
            features: "noopener,noreferrer".to_string(),
            referrer_policy: "no-referrer".to_string(),
        }
    }
}

// == Click Outcome ==
#[derive(Debug)]
pub struct ClickOutcome {
    /// Present whenever the ad has a link, whatever happened to the count
    pub navigation: Option<Navigation>,
    /// Result of the click counter increment
    pub recorded: Result<()>,
}

// == Click Tracker ==
#[derive(Clone)]
pub struct ClickTracker {
    store: Arc<dyn AdStore>,
}

impl ClickTracker {
    pub fn new(store: Arc<dyn AdStore>) -> Self {
        Self { store }
    }

    /// Records one click on `ad`: exactly one increment call, never batched.
    pub async fn record(&self, ad: &AdRecord) -> ClickOutcome {
        let navigation = ad
            .link_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(Navigation::new_tab);

        let recorded = match self.store.increment_click(&ad.id).await {
            Ok(()) => {
                debug!("Click tracked for ad {}", ad.id);
                Ok(())
            }
            Err(err) => {
                warn!("Failed to track click for ad {}: {}", ad.id, err);
                Err(match err {
                    AdError::TrackingFailed(_) => err,
                    other => AdError::TrackingFailed(other.to_string()),
                })
            }
        };

        ClickOutcome {
            navigation,
            recorded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Placement;
    use crate::store::InMemoryAdStore;

    #[tokio::test]
    async fn test_click_without_link_only_counts() {
        let ad = AdRecord::new("a1", "No link", Placement::Sidebar);
        let store = Arc::new(InMemoryAdStore::with_ads(vec![ad.clone()]));
        let tracker = ClickTracker::new(store.clone());

        let outcome = tracker.record(&ad).await;

        assert!(outcome.recorded.is_ok());
        assert!(outcome.navigation.is_none());
        assert_eq!(store.click_calls().await, vec!["a1".to_string()]);
        assert_eq!(store.get("a1").await.unwrap().click_count, 1);
    }

    #[tokio::test]
    async fn test_click_with_link_opens_isolated_tab() {
        let ad = AdRecord::new("a1", "Linked", Placement::Header)
            .with_link("https://advertiser.example/landing");
        let store = Arc::new(InMemoryAdStore::with_ads(vec![ad.clone()]));
        let tracker = ClickTracker::new(store.clone());

        let outcome = tracker.record(&ad).await;
        let navigation = outcome.navigation.unwrap();

        assert_eq!(navigation.url, "https://advertiser.example/landing");
        assert_eq!(navigation.target, "_blank");
        assert_eq!(navigation.features, "noopener,noreferrer");
        assert_eq!(navigation.referrer_policy, "no-referrer");
    }

    #[tokio::test]
    async fn test_failed_count_keeps_navigation() {
        let ad = AdRecord::new("a1", "Linked", Placement::Header)
            .with_link("https://advertiser.example");
        let store = Arc::new(InMemoryAdStore::with_ads(vec![ad.clone()]));
        store.set_available(false);
        let tracker = ClickTracker::new(store.clone());

        let outcome = tracker.record(&ad).await;

        assert!(matches!(outcome.recorded, Err(AdError::TrackingFailed(_))));
        assert!(outcome.navigation.is_some());
        // One attempt, no retry
        assert_eq!(store.click_calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_each_click_is_its_own_call() {
        let ad = AdRecord::new("a1", "Ad", Placement::Content);
        let store = Arc::new(InMemoryAdStore::with_ads(vec![ad.clone()]));
        let tracker = ClickTracker::new(store.clone());

        tracker.record(&ad).await;
        tracker.record(&ad).await;

        assert_eq!(store.click_calls().await.len(), 2);
        assert_eq!(store.get("a1").await.unwrap().click_count, 2);
    }

    #[tokio::test]
    async fn test_blank_link_is_ignored() {
        let ad = AdRecord::new("a1", "Blank", Placement::Content).with_link("   ");
        let store = Arc::new(InMemoryAdStore::with_ads(vec![ad.clone()]));
        let tracker = ClickTracker::new(store);

        assert!(tracker.record(&ad).await.navigation.is_none());
    }
}
