//! Hosted Ad Store
//!
//! Talks to a hosted relational store exposing a PostgREST table at
//! `/rest/v1/ads` and two counter functions under `/functions/v1`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::error::{AdError, Result};
use crate::models::{AdDraft, AdPatch, AdRecord};
use crate::store::AdStore;

const ADS_TABLE: &str = "/rest/v1/ads";
const INCREMENT_IMPRESSION_FN: &str = "/functions/v1/increment-impression";
const INCREMENT_CLICK_FN: &str = "/functions/v1/increment-click";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// == REST Store ==
#[derive(Debug, Clone)]
pub struct RestAdStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RestAdStore {
    /// Creates a client for the store at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AdError::Internal(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        match &self.api_key {
            Some(key) => builder.header("apikey", key).bearer_auth(key),
            None => builder,
        }
    }

    /// Sends a table request and decodes the returned rows.
    async fn rows<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Vec<T>> {
        let rows = checked(builder.send().await?).await?.json::<Vec<T>>().await?;
        Ok(rows)
    }

    async fn post_function(&self, function: &str, body: Value) -> Result<()> {
        let response = self.request(Method::POST, function).json(&body).send().await?;
        checked(response).await?;
        Ok(())
    }

    /// Counter functions report failures as tracking errors.
    async fn invoke(&self, function: &str, body: Value) -> Result<()> {
        self.post_function(function, body)
            .await
            .map_err(|err| AdError::TrackingFailed(err.to_string()))
    }
}

/// Turns a non-success status into a store error carrying the response body.
async fn checked(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AdError::StoreUnavailable(format!("{}: {}", status, body)))
}

/// Decodes one table row. A row that does not fit the ad shape is skipped
/// so it cannot take the rest of the set down with it.
fn decode_row(row: Value) -> Option<AdRecord> {
    let id = row.get("id").and_then(Value::as_str).map(str::to_string);
    match serde_json::from_value::<AdRecord>(row) {
        Ok(ad) => Some(ad),
        Err(err) => {
            warn!("Skipping malformed ad row {:?}: {}", id, err);
            None
        }
    }
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

#[async_trait]
impl AdStore for RestAdStore {
    async fn select_all(&self) -> Result<Vec<AdRecord>> {
        let builder = self
            .request(Method::GET, ADS_TABLE)
            .query(&[("select", "*"), ("order", "created_at.desc")]);
        let rows: Vec<Value> = self.rows(builder).await?;
        let fetched = rows.len();
        let ads: Vec<AdRecord> = rows.into_iter().filter_map(decode_row).collect();
        debug!("Fetched {} of {} ads from hosted store", ads.len(), fetched);
        Ok(ads)
    }

    async fn insert(&self, draft: AdDraft) -> Result<AdRecord> {
        let builder = self
            .request(Method::POST, ADS_TABLE)
            .header("Prefer", "return=representation")
            .json(&[draft]);
        self.rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AdError::Internal("insert returned no row".to_string()))
    }

    async fn update(&self, id: &str, patch: AdPatch) -> Result<AdRecord> {
        let builder = self
            .request(Method::PATCH, ADS_TABLE)
            .query(&id_filter(id))
            .header("Prefer", "return=representation")
            .json(&patch);
        self.rows(builder)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AdError::NotFound(id.to_string()))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let builder = self
            .request(Method::DELETE, ADS_TABLE)
            .query(&id_filter(id))
            .header("Prefer", "return=representation");
        let deleted: Vec<AdRecord> = self.rows(builder).await?;
        if deleted.is_empty() {
            return Err(AdError::NotFound(id.to_string()));
        }
        Ok(())
    }

    async fn increment_impressions(&self, ad_ids: &[String]) -> Result<()> {
        self.invoke(INCREMENT_IMPRESSION_FN, json!({ "ad_ids": ad_ids }))
            .await
    }

    async fn increment_click(&self, ad_id: &str) -> Result<()> {
        self.invoke(INCREMENT_CLICK_FN, json!({ "ad_id": ad_id }))
            .await
    }
}
