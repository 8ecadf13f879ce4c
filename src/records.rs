//! Typed views over the CMS item payloads.
//!
//! The remote collections store loosely structured `fieldData` objects;
//! these records pin down which fields are required and which may be
//! absent, instead of dynamic key access.

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::services::content_store::CmsItem;

/// One subscription offer, as stored in the plan collection.
///
/// Every field except the business flag may be missing on a record;
/// an absent or null `bedriftsabonnement` counts as not-business.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlanRecord {
    #[serde(rename = "mobiloperator")]
    pub carrier: Option<String>,
    #[serde(rename = "pris")]
    pub price: Option<f64>,
    #[serde(rename = "mobildata")]
    pub data_tier: Option<String>,
    #[serde(rename = "bedriftsabonnement")]
    pub business: Option<bool>,
}

impl PlanRecord {
    /// Decodes a plan record from a CMS item. Unknown fields are ignored.
    pub fn from_item(item: &CmsItem) -> Result<Self> {
        serde_json::from_value(item.field_data.clone())
            .with_context(|| format!("Failed to decode plan record {}", item.id))
    }

    pub fn is_business(&self) -> bool {
        self.business.unwrap_or(false)
    }
}

#[derive(Debug, Deserialize)]
struct CarrierFields {
    name: String,
    slug: String,
}

/// Reference data for one carrier: display name and public page slug.
#[derive(Debug, Clone)]
pub struct CarrierInfo {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Carrier id → [`CarrierInfo`] mapping, loaded once per run.
///
/// Every carrier id encountered while aggregating or publishing must
/// already exist here; a miss fails the run rather than silently skipping.
/// Keyed by a `BTreeMap` so iteration (and thus the badge-clear write
/// order) is the same on every run over unchanged data.
#[derive(Debug, Default)]
pub struct CarrierDirectory {
    carriers: BTreeMap<String, CarrierInfo>,
}

impl CarrierDirectory {
    /// Builds the directory from the carrier reference collection.
    /// `name` and `slug` are required on every entry.
    pub fn from_items(items: &[CmsItem]) -> Result<Self> {
        let mut carriers = BTreeMap::new();
        for item in items {
            let fields: CarrierFields = serde_json::from_value(item.field_data.clone())
                .with_context(|| format!("Carrier item {} is missing name or slug", item.id))?;
            carriers.insert(
                item.id.clone(),
                CarrierInfo {
                    id: item.id.clone(),
                    name: fields.name,
                    slug: fields.slug,
                },
            );
        }
        Ok(Self { carriers })
    }

    pub fn get(&self, carrier_id: &str) -> Result<&CarrierInfo> {
        match self.carriers.get(carrier_id) {
            Some(info) => Ok(info),
            None => bail!("Carrier id {} not present in the carrier directory", carrier_id),
        }
    }

    pub fn len(&self) -> usize {
        self.carriers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.carriers.is_empty()
    }

    /// Iterates over all carriers in the directory, in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &CarrierInfo> {
        self.carriers.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str, field_data: serde_json::Value) -> CmsItem {
        CmsItem {
            id: id.to_string(),
            field_data,
        }
    }

    #[test]
    fn test_plan_record_full() {
        let it = item(
            "p1",
            json!({
                "mobiloperator": "op-1",
                "pris": 249.0,
                "mobildata": "10",
                "bedriftsabonnement": true,
                "name": "Some Plan"
            }),
        );
        let plan = PlanRecord::from_item(&it).unwrap();
        assert_eq!(plan.carrier.as_deref(), Some("op-1"));
        assert_eq!(plan.price, Some(249.0));
        assert_eq!(plan.data_tier.as_deref(), Some("10"));
        assert!(plan.is_business());
    }

    #[test]
    fn test_plan_record_missing_fields_default() {
        let plan = PlanRecord::from_item(&item("p2", json!({ "name": "Bare" }))).unwrap();
        assert!(plan.carrier.is_none());
        assert!(plan.price.is_none());
        assert!(plan.data_tier.is_none());
        assert!(!plan.is_business());
    }

    #[test]
    fn test_plan_record_null_business_flag() {
        let plan =
            PlanRecord::from_item(&item("p3", json!({ "bedriftsabonnement": null }))).unwrap();
        assert!(!plan.is_business());
    }

    #[test]
    fn test_directory_lookup() {
        let dir = CarrierDirectory::from_items(&[
            item("op-1", json!({ "name": "Alfa Mobil", "slug": "alfa-mobil" })),
            item("op-2", json!({ "name": "Beta Tele", "slug": "beta-tele" })),
        ])
        .unwrap();

        assert_eq!(dir.len(), 2);
        assert_eq!(dir.get("op-1").unwrap().slug, "alfa-mobil");
        assert!(dir.get("op-9").is_err());
    }

    #[test]
    fn test_directory_iterates_in_id_order() {
        // Insertion order must not leak into iteration order.
        let dir = CarrierDirectory::from_items(&[
            item("op-c", json!({ "name": "Gamma Net", "slug": "gamma-net" })),
            item("op-a", json!({ "name": "Alfa Mobil", "slug": "alfa-mobil" })),
            item("op-b", json!({ "name": "Beta Tele", "slug": "beta-tele" })),
        ])
        .unwrap();

        let ids: Vec<&str> = dir.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["op-a", "op-b", "op-c"]);
    }

    #[test]
    fn test_directory_requires_name_and_slug() {
        let result = CarrierDirectory::from_items(&[item("op-1", json!({ "name": "NoSlug" }))]);
        assert!(result.is_err());
    }
}
