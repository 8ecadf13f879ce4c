//! Writes the computed results back into the CMS: badge clears, badge
//! sets, and the statistics record patch.

use anyhow::Result;
use serde_json::json;
use tracing::{debug, info};

use crate::records::CarrierDirectory;
use crate::report::{StatsReport, format_price};
use crate::run::Collections;
use crate::services::content_store::ContentStore;

/// Blanks both badge fields on every carrier in the directory.
///
/// Must complete before any new badge is set, so a carrier that lost its
/// extreme position does not keep a stale badge.
pub async fn clear_badges<S: ContentStore>(
    store: &S,
    collections: &Collections,
    directory: &CarrierDirectory,
) -> Result<()> {
    for carrier in directory.iter() {
        let ack = store
            .patch_live(
                &collections.carriers,
                &carrier.id,
                json!({
                    "pris-billig": "",
                    "pris-dyr": ""
                }),
            )
            .await?;
        debug!(carrier = %carrier.name, ack = %ack, "Cleared price badges");
    }

    info!(carrier_count = directory.len(), "Price badges cleared");
    Ok(())
}

/// Sets the "cheapest" badge on one carrier and the "most expensive" badge
/// on the other. Exactly these two carriers end the run with a badge.
pub async fn set_badges<S: ContentStore>(
    store: &S,
    collections: &Collections,
    report: &StatsReport,
) -> Result<()> {
    let cheapest_ack = store
        .patch_live(
            &collections.carriers,
            &report.cheapest.id,
            json!({
                "pris-billig": format!(
                    "{} er kåret til Norges billigste mobiloperatør",
                    report.cheapest.name
                )
            }),
        )
        .await?;
    debug!(carrier = %report.cheapest.name, ack = %cheapest_ack, "Set cheapest badge");

    let expensive_ack = store
        .patch_live(
            &collections.carriers,
            &report.most_expensive.id,
            json!({
                "pris-dyr": format!(
                    "{} er kåret til Norges dyreste mobiloperatør",
                    report.most_expensive.name
                )
            }),
        )
        .await?;
    debug!(carrier = %report.most_expensive.name, ack = %expensive_ack, "Set most expensive badge");

    info!(
        cheapest = %report.cheapest.name,
        most_expensive = %report.most_expensive.name,
        "Carrier badges updated"
    );
    Ok(())
}

/// Patches the single statistics item with all computed fields. Numeric
/// fields are sent as strings, matching what the site templates expect.
pub async fn publish_stats<S: ContentStore>(
    store: &S,
    collections: &Collections,
    report: &StatsReport,
) -> Result<()> {
    let ack = store
        .patch_live(
            &collections.stats,
            &collections.stats_item,
            json!({
                "name": "Stats",
                "slug": "stats",
                "antall-avtaler": report.contract_count.to_string(),
                "antall-operatorer": report.carrier_count.to_string(),
                "paragraf-billig-dyr-2": format!("<p>{}</p>", report.paragraph),
                "avg-price-10": format_price(report.median_price_10gb),
                "avg-price-100": format_price(report.median_price_100gb),
                "h1": report.headline,
                "dato": report.date_label
            }),
        )
        .await?;

    debug!(ack = %ack, "Statistics patch acknowledged");
    info!(
        contracts = report.contract_count,
        carriers = report.carrier_count,
        "Statistics record updated"
    );
    Ok(())
}
