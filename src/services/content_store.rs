//! Trait and types for the remote collection store.

use anyhow::Result;
use serde::Deserialize;

/// Number of items requested per page. The remote API caps list responses
/// at 100; pagination advances the offset by this amount until an empty
/// page comes back.
pub const PAGE_SIZE: u32 = 100;

/// A single item from a CMS collection: its id plus the raw `fieldData`
/// payload, left as JSON until a typed record decodes it.
#[derive(Debug, Clone, Deserialize)]
pub struct CmsItem {
    pub id: String,
    #[serde(rename = "fieldData", default)]
    pub field_data: serde_json::Value,
}

/// One page of a collection listing.
#[derive(Debug, Deserialize)]
pub struct ItemPage {
    #[serde(default)]
    pub items: Vec<CmsItem>,
}

/// Abstraction over the CMS backend (e.g., Webflow).
///
/// Every method is fallible on transport or non-success HTTP status; the
/// caller treats any failure as fatal for the run.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetches up to [`PAGE_SIZE`] items of `collection_id` starting at `offset`.
    async fn fetch_page(&self, collection_id: &str, offset: u32) -> Result<ItemPage>;

    /// Fetches a small reference collection in one request (assumed ≤100 entries).
    async fn fetch_reference_list(&self, collection_id: &str) -> Result<ItemPage>;

    /// Sends a partial field update to one item, published live.
    /// Returns the ack payload for logging; it is not validated further.
    async fn patch_live(
        &self,
        collection_id: &str,
        item_id: &str,
        field_data: serde_json::Value,
    ) -> Result<serde_json::Value>;
}
