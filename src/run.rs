//! One full recomputation run: load the carrier directory, clear badges,
//! aggregate every plan page, derive the report, publish.

use anyhow::Result;
use chrono::NaiveDate;
use tracing::{debug, info};

use crate::aggregate::PriceAggregate;
use crate::publish::{clear_badges, publish_stats, set_badges};
use crate::records::{CarrierDirectory, PlanRecord};
use crate::report::StatsReport;
use crate::services::content_store::{ContentStore, PAGE_SIZE};

/// The three fixed CMS collections the job addresses, plus the id of the
/// single statistics item inside the stats collection.
#[derive(Debug, Clone)]
pub struct Collections {
    pub plans: String,
    pub carriers: String,
    pub stats: String,
    pub stats_item: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            plans: "6660c15ec77f5270c0a534d2".to_string(),
            carriers: "6662d0070fad018b334db523".to_string(),
            stats: "66b3eb1589ff4ef9005da526".to_string(),
            stats_item: "66b3eb26ab5d3a893f2acd9e".to_string(),
        }
    }
}

/// Pages through the whole plan collection, feeding every record into a
/// fresh [`PriceAggregate`]. Stops at the first empty page.
pub async fn aggregate_plans<S: ContentStore>(
    store: &S,
    collections: &Collections,
) -> Result<PriceAggregate> {
    let mut aggregate = PriceAggregate::default();
    let mut offset = 0;

    loop {
        let page = store.fetch_page(&collections.plans, offset).await?;
        if page.items.is_empty() {
            break;
        }

        debug!(offset, items = page.items.len(), "Plan page fetched");
        for item in &page.items {
            aggregate.observe(&PlanRecord::from_item(item)?);
        }

        offset += PAGE_SIZE;
    }

    info!(
        contracts = aggregate.contract_count,
        carriers = aggregate.carrier_count(),
        "Plan aggregation complete"
    );
    Ok(aggregate)
}

/// Executes one sequential run against `store`.
///
/// Order is fixed: directory load, badge clears for every carrier,
/// paginated aggregation, report derivation, badge sets, statistics
/// patch. With `dry_run` set, everything is computed and logged but no
/// write is issued (including the clears).
#[tracing::instrument(skip(store, collections, today), fields(date = %today))]
pub async fn run<S: ContentStore>(
    store: &S,
    collections: &Collections,
    today: NaiveDate,
    dry_run: bool,
) -> Result<StatsReport> {
    let reference = store.fetch_reference_list(&collections.carriers).await?;
    let directory = CarrierDirectory::from_items(&reference.items)?;
    info!(carrier_count = directory.len(), "Carrier directory loaded");

    if !dry_run {
        clear_badges(store, collections, &directory).await?;
    }

    let aggregate = aggregate_plans(store, collections).await?;
    let report = StatsReport::build(&aggregate, &directory, today)?;

    info!(
        cheapest = %report.cheapest.name,
        most_expensive = %report.most_expensive.name,
        gap_percent = %format!("{:.1}", report.price_gap_percent),
        median_10gb = report.median_price_10gb,
        median_100gb = report.median_price_100gb,
        headline = %report.headline,
        "Report derived"
    );

    if dry_run {
        info!("Dry run: skipping badge and statistics writes");
        return Ok(report);
    }

    set_badges(store, collections, &report).await?;
    publish_stats(store, collections, &report).await?;

    Ok(report)
}
