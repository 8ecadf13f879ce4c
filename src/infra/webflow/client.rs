use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

use crate::services::content_store::{ContentStore, ItemPage, PAGE_SIZE};

/// [`ContentStore`] implementation against the Webflow v2 CMS API.
///
/// The bearer token is handed in at construction; nothing about the
/// credential is process-global.
pub struct WebflowClient {
    base_url: String,
    token: String,
    http: reqwest::Client,
}

impl WebflowClient {
    pub fn new(token: String) -> Result<Self> {
        Self::with_base_url(token, "https://api.webflow.com/v2".to_string())
    }

    pub fn with_base_url(token: String, base_url: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            base_url,
            token,
            http,
        })
    }

    async fn get_items(&self, url: String) -> Result<ItemPage> {
        let response = self
            .http
            .get(&url)
            .header("accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("API returned status {}: {}", status, body));
        }

        let page: ItemPage = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse response: {}", e))?;

        Ok(page)
    }
}

#[async_trait]
impl ContentStore for WebflowClient {
    async fn fetch_page(&self, collection_id: &str, offset: u32) -> Result<ItemPage> {
        let url = format!(
            "{}/collections/{}/items?limit={}&offset={}",
            self.base_url, collection_id, PAGE_SIZE, offset
        );
        self.get_items(url).await
    }

    async fn fetch_reference_list(&self, collection_id: &str) -> Result<ItemPage> {
        let url = format!("{}/collections/{}/items", self.base_url, collection_id);
        self.get_items(url).await
    }

    async fn patch_live(
        &self,
        collection_id: &str,
        item_id: &str,
        field_data: serde_json::Value,
    ) -> Result<serde_json::Value> {
        let url = format!(
            "{}/collections/{}/items/{}/live",
            self.base_url, collection_id, item_id
        );

        let response = self
            .http
            .patch(&url)
            .header("accept", "application/json")
            .header("Authorization", format!("Bearer {}", self.token))
            .json(&json!({ "fieldData": field_data }))
            .send()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send patch request: {}", e))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Patch to item {} returned status {}: {}",
                item_id,
                status,
                body
            ));
        }

        let ack = response
            .json()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to parse patch response: {}", e))?;

        Ok(ack)
    }
}
