//! Ad record model
//!
//! Defines the ad record as stored by the ad store, its placement and type
//! enums, and the draft/patch shapes used by admin mutations.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// == Ad Type ==
/// Kind of creative an ad carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdType {
    Banner,
    Display,
    Native,
    Popup,
    Video,
}

// == Placement ==
/// Named slot in the page layout where an ad may appear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Placement {
    Header,
    Content,
    Sidebar,
    Footer,
    BetweenVideos,
    PreRoll,
    MidRoll,
    PostRoll,
    Modal,
}

impl Placement {
    pub const ALL: [Placement; 9] = [
        Placement::Header,
        Placement::Content,
        Placement::Sidebar,
        Placement::Footer,
        Placement::BetweenVideos,
        Placement::PreRoll,
        Placement::MidRoll,
        Placement::PostRoll,
        Placement::Modal,
    ];

    /// Wire name of the placement.
    pub fn as_str(&self) -> &'static str {
        match self {
            Placement::Header => "header",
            Placement::Content => "content",
            Placement::Sidebar => "sidebar",
            Placement::Footer => "footer",
            Placement::BetweenVideos => "between-videos",
            Placement::PreRoll => "pre-roll",
            Placement::MidRoll => "mid-roll",
            Placement::PostRoll => "post-roll",
            Placement::Modal => "modal",
        }
    }

    /// Logical placement key used for matching.
    ///
    /// `between-videos` slots render inside the content stream, so they
    /// collapse onto `content`.
    pub fn canonical(self) -> Placement {
        match self {
            Placement::BetweenVideos => Placement::Content,
            other => other,
        }
    }

    /// Header and footer bands are curated and never served by the general query.
    pub fn is_reserved(self) -> bool {
        matches!(self, Placement::Header | Placement::Footer)
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Placement::ALL
            .iter()
            .copied()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown placement: {}", s))
    }
}

// == Creative ==
/// Renderable payload of an ad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Creative {
    /// Image to render, linked through the ad's link URL
    Image(String),
    /// Raw markup or script supplied by the ad network
    Markup(String),
}

// == Ad Record ==
/// A single ad as held by the ad store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdRecord {
    pub id: String,
    pub title: String,
    pub ad_type: AdType,
    pub placement: Placement,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub ad_code: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub priority: i32,
    pub start_date: DateTime<Utc>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub impression_count: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub click_count: u64,
    pub created_at: DateTime<Utc>,
}

impl AdRecord {
    /// Creates an active, priority-zero banner with no creative and no end date.
    pub fn new(id: impl Into<String>, title: impl Into<String>, placement: Placement) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            ad_type: AdType::Banner,
            placement,
            image_url: None,
            ad_code: None,
            link_url: None,
            is_active: true,
            priority: 0,
            start_date: now,
            end_date: None,
            impression_count: 0,
            click_count: 0,
            created_at: now,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_end_date(mut self, end_date: DateTime<Utc>) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.ad_code = Some(code.into());
        self
    }

    pub fn with_link(mut self, url: impl Into<String>) -> Self {
        self.link_url = Some(url.into());
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }

    // == Eligibility ==
    /// An ad is eligible at `now` when it is active and its end date, if any,
    /// lies strictly after `now`.
    pub fn is_eligible_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.end_date.map_or(true, |end| end > now)
    }

    // == Creative ==
    /// Returns the renderable payload, preferring the image over markup.
    pub fn creative(&self) -> Option<Creative> {
        fn non_empty(s: &Option<String>) -> Option<&str> {
            s.as_deref().filter(|v| !v.trim().is_empty())
        }
        non_empty(&self.image_url)
            .map(|url| Creative::Image(url.to_string()))
            .or_else(|| non_empty(&self.ad_code).map(|code| Creative::Markup(code.to_string())))
    }
}

// == Ad Draft ==
/// Insertable fields of a new ad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdDraft {
    pub title: String,
    pub ad_type: AdType,
    pub placement: Placement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
}

impl AdDraft {
    /// Validates the draft
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.title.trim().is_empty() {
            return Some("Title cannot be empty".to_string());
        }
        let blank = |s: &Option<String>| s.as_deref().map_or(true, |v| v.trim().is_empty());
        if blank(&self.image_url) && blank(&self.ad_code) {
            return Some("Either image_url or ad_code must be provided".to_string());
        }
        None
    }

    /// Materializes the draft into a record with fresh counters.
    pub fn into_record(self, id: String, now: DateTime<Utc>) -> AdRecord {
        AdRecord {
            id,
            title: self.title,
            ad_type: self.ad_type,
            placement: self.placement,
            image_url: self.image_url,
            ad_code: self.ad_code,
            link_url: self.link_url,
            is_active: self.is_active,
            priority: self.priority,
            start_date: self.start_date.unwrap_or(now),
            end_date: self.end_date,
            impression_count: 0,
            click_count: 0,
            created_at: now,
        }
    }
}

// == Ad Patch ==
/// Partial update of an ad. Absent fields are left untouched; for the
/// nullable columns an explicit `null` clears the value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ad_type: Option<AdType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub image_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub ad_code: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub link_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<Option<DateTime<Utc>>>,
}

impl AdPatch {
    pub fn is_empty(&self) -> bool {
        *self == AdPatch::default()
    }

    /// Validates the patch
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.is_empty() {
            return Some("Update carries no fields".to_string());
        }
        if self.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Some("Title cannot be empty".to_string());
        }
        let cleared = |field: &Option<Option<String>>| {
            matches!(field, Some(value) if value.as_deref().map_or(true, |v| v.trim().is_empty()))
        };
        if cleared(&self.image_url) && cleared(&self.ad_code) {
            return Some("Cannot clear both image_url and ad_code".to_string());
        }
        None
    }

    /// Applies the patch in place.
    pub fn apply(&self, ad: &mut AdRecord) {
        if let Some(title) = &self.title {
            ad.title = title.clone();
        }
        if let Some(ad_type) = self.ad_type {
            ad.ad_type = ad_type;
        }
        if let Some(placement) = self.placement {
            ad.placement = placement;
        }
        if let Some(image_url) = &self.image_url {
            ad.image_url = image_url.clone();
        }
        if let Some(ad_code) = &self.ad_code {
            ad.ad_code = ad_code.clone();
        }
        if let Some(link_url) = &self.link_url {
            ad.link_url = link_url.clone();
        }
        if let Some(is_active) = self.is_active {
            ad.is_active = is_active;
        }
        if let Some(priority) = self.priority {
            ad.priority = priority;
        }
        if let Some(start_date) = self.start_date {
            ad.start_date = start_date;
        }
        if let Some(end_date) = self.end_date {
            ad.end_date = end_date;
        }
    }
}

// == Serde Helpers ==
fn default_true() -> bool {
    true
}

/// Store columns without a NOT NULL constraint may come back as `null`.
fn null_as_default<'de, D, T>(de: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(de)?.unwrap_or_default())
}

fn double_option<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_placement_wire_names() {
        for placement in Placement::ALL {
            let json = serde_json::to_string(&placement).unwrap();
            assert_eq!(json, format!("\"{}\"", placement.as_str()));
            assert_eq!(placement.as_str().parse::<Placement>().unwrap(), placement);
        }
    }

    #[test]
    fn test_unknown_placement_rejected() {
        assert!("billboard".parse::<Placement>().is_err());
        assert!("Header".parse::<Placement>().is_err());
    }

    #[test]
    fn test_between_videos_canonicalizes_to_content() {
        assert_eq!(Placement::BetweenVideos.canonical(), Placement::Content);
        assert_eq!(Placement::Sidebar.canonical(), Placement::Sidebar);
    }

    #[test]
    fn test_eligibility() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let ad = AdRecord::new("a1", "Open", Placement::Header);
        assert!(ad.is_eligible_at(now));

        let expired = ad.clone().with_end_date(now - Duration::days(1));
        assert!(!expired.is_eligible_at(now));

        // End date equal to now is already past the window
        let boundary = ad.clone().with_end_date(now);
        assert!(!boundary.is_eligible_at(now));

        let future = ad.clone().with_end_date(now + Duration::seconds(1));
        assert!(future.is_eligible_at(now));

        assert!(!ad.inactive().is_eligible_at(now));
    }

    #[test]
    fn test_creative_prefers_image() {
        let ad = AdRecord::new("a1", "Both", Placement::Sidebar)
            .with_image("https://cdn.example/banner.png")
            .with_code("<script></script>");
        assert_eq!(
            ad.creative(),
            Some(Creative::Image("https://cdn.example/banner.png".to_string()))
        );
    }

    #[test]
    fn test_creative_falls_back_to_markup() {
        let ad = AdRecord::new("a1", "Code", Placement::Sidebar)
            .with_image("  ")
            .with_code("<div>ad</div>");
        assert_eq!(ad.creative(), Some(Creative::Markup("<div>ad</div>".to_string())));
        assert_eq!(AdRecord::new("a2", "Bare", Placement::Sidebar).creative(), None);
    }

    #[test]
    fn test_record_deserializes_store_row_with_nulls() {
        let json = r#"{
            "id": "3f1c",
            "title": "Spring sale",
            "ad_type": "native",
            "placement": "between-videos",
            "image_url": null,
            "ad_code": "<div>sale</div>",
            "link_url": null,
            "is_active": true,
            "priority": null,
            "start_date": "2024-03-01T00:00:00Z",
            "end_date": null,
            "impression_count": 12,
            "click_count": null,
            "created_at": "2024-02-28T10:00:00Z"
        }"#;
        let ad: AdRecord = serde_json::from_str(json).unwrap();
        assert_eq!(ad.placement, Placement::BetweenVideos);
        assert_eq!(ad.ad_type, AdType::Native);
        assert_eq!(ad.priority, 0);
        assert_eq!(ad.click_count, 0);
        assert_eq!(ad.impression_count, 12);
        assert!(ad.end_date.is_none());
    }

    #[test]
    fn test_draft_validation() {
        let mut draft = AdDraft {
            title: "Launch".to_string(),
            ad_type: AdType::Display,
            placement: Placement::Sidebar,
            image_url: None,
            ad_code: None,
            link_url: None,
            is_active: true,
            priority: 3,
            start_date: None,
            end_date: None,
        };
        assert!(draft.validate().is_some());

        draft.ad_code = Some("<div/>".to_string());
        assert!(draft.validate().is_none());

        draft.title = " ".to_string();
        assert!(draft.validate().is_some());
    }

    #[test]
    fn test_patch_distinguishes_absent_and_null() {
        let patch: AdPatch = serde_json::from_str(r#"{"priority": 7, "end_date": null}"#).unwrap();
        assert_eq!(patch.priority, Some(7));
        assert_eq!(patch.end_date, Some(None));
        assert_eq!(patch.link_url, None);

        let now = Utc::now();
        let mut ad = AdRecord::new("a1", "Promo", Placement::Footer)
            .with_end_date(now)
            .with_link("https://example.com");
        patch.apply(&mut ad);
        assert_eq!(ad.priority, 7);
        assert!(ad.end_date.is_none());
        assert_eq!(ad.link_url.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn test_patch_clearing_every_creative_rejected() {
        let patch: AdPatch =
            serde_json::from_str(r#"{"image_url": null, "ad_code": null}"#).unwrap();
        assert!(patch.validate().is_some());

        let patch: AdPatch =
            serde_json::from_str(r#"{"image_url": null, "ad_code": "<div/>"}"#).unwrap();
        assert!(patch.validate().is_none());

        let patch: AdPatch = serde_json::from_str(r#"{"image_url": null}"#).unwrap();
        assert!(patch.validate().is_none());

        assert!(AdPatch::default().validate().is_some());
    }

    #[test]
    fn test_empty_patch() {
        assert!(AdPatch::default().is_empty());
        let patch: AdPatch = serde_json::from_str(r#"{"title": "New"}"#).unwrap();
        assert!(!patch.is_empty());
    }
}
