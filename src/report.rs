//! Derived statistics: per-carrier means, extremes, medians, and the
//! published prose.

use anyhow::{Result, bail};
use chrono::{Datelike, NaiveDate};

use crate::aggregate::PriceAggregate;
use crate::records::{CarrierDirectory, CarrierInfo};

/// Lowercase Norwegian month names, indexed by `month0`. The published site
/// is Norwegian; using a fixed table keeps runs independent of host locale.
static MONTHS: [&str; 12] = [
    "januar",
    "februar",
    "mars",
    "april",
    "mai",
    "juni",
    "juli",
    "august",
    "september",
    "oktober",
    "november",
    "desember",
];

/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the median of a slice of values. An even-length input averages
/// the two middle values. Returns 0.0 for empty input.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Renders a price the way the stats fields expect: integral values without
/// a decimal point, everything else with its natural formatting.
pub fn format_price(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

/// Everything the publisher writes: the two extreme carriers, the stats
/// fields, and the dated headline.
#[derive(Debug)]
pub struct StatsReport {
    pub contract_count: usize,
    pub carrier_count: usize,
    pub cheapest: CarrierInfo,
    pub most_expensive: CarrierInfo,
    pub price_gap_percent: f64,
    pub paragraph: String,
    pub median_price_10gb: f64,
    pub median_price_100gb: f64,
    pub headline: String,
    pub date_label: String,
}

impl StatsReport {
    /// Derives the full report from one aggregation pass.
    ///
    /// Fails when no carrier has any non-business price (there is nothing
    /// to rank), or when an aggregated carrier id is missing from the
    /// directory.
    pub fn build(
        aggregate: &PriceAggregate,
        directory: &CarrierDirectory,
        today: NaiveDate,
    ) -> Result<Self> {
        let (cheapest_id, min_mean, most_expensive_id, max_mean) =
            extremes_by_mean(&aggregate.non_business_prices)?;

        let cheapest = directory.get(cheapest_id)?.clone();
        let most_expensive = directory.get(most_expensive_id)?.clone();

        let price_gap_percent = (max_mean - min_mean) / max_mean * 100.0;

        let cheapest_link = carrier_link(&cheapest);
        let most_expensive_link = carrier_link(&most_expensive);
        let paragraph = format!(
            "Mobiloperatøren {} er den som har de billigste avtalene på privatmarkedet mobilabonnement, \
             de er faktisk {:.1}% billigere enn den dyreste leverandøren på privatmarkedet mobiltelefoni \
             som er {}.",
            cheapest_link, price_gap_percent, most_expensive_link
        );

        let month = MONTHS[today.month0() as usize];
        let headline = format!("Alle mobiloperatører {} {}", month, today.year());
        let date_label = format!("{} {}", month, today.year());

        Ok(Self {
            contract_count: aggregate.contract_count,
            carrier_count: aggregate.carrier_count(),
            cheapest,
            most_expensive,
            price_gap_percent,
            paragraph,
            median_price_10gb: median(&aggregate.prices_10gb),
            median_price_100gb: median(&aggregate.prices_100gb),
            headline,
            date_label,
        })
    }
}

fn carrier_link(carrier: &CarrierInfo) -> String {
    format!(
        "<a href=\"/mobiltelefoni/mobiloperatorer/{}\">{}</a>",
        carrier.slug, carrier.name
    )
}

/// Selects the carriers with the minimum and maximum mean price.
///
/// Ties on the mean break toward the lexically smallest carrier id, for
/// both extremes, so repeated runs over unchanged data pick the same
/// carriers regardless of map iteration order.
fn extremes_by_mean(
    prices: &std::collections::HashMap<String, Vec<f64>>,
) -> Result<(&str, f64, &str, f64)> {
    let mut cheapest: Option<(&str, f64)> = None;
    let mut most_expensive: Option<(&str, f64)> = None;

    for (id, carrier_prices) in prices {
        if carrier_prices.is_empty() {
            continue;
        }
        let avg = mean(carrier_prices);

        match cheapest {
            Some((best_id, best)) if avg > best || (avg == best && id.as_str() > best_id) => {}
            _ => cheapest = Some((id.as_str(), avg)),
        }
        match most_expensive {
            Some((best_id, best)) if avg < best || (avg == best && id.as_str() > best_id) => {}
            _ => most_expensive = Some((id.as_str(), avg)),
        }
    }

    match (cheapest, most_expensive) {
        (Some((min_id, min_mean)), Some((max_id, max_mean))) => {
            Ok((min_id, min_mean, max_id, max_mean))
        }
        _ => bail!("No non-business prices found; cannot rank carriers"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content_store::CmsItem;
    use serde_json::json;
    use std::collections::HashMap;

    fn directory() -> CarrierDirectory {
        CarrierDirectory::from_items(&[
            CmsItem {
                id: "op-a".to_string(),
                field_data: json!({ "name": "Alfa Mobil", "slug": "alfa-mobil" }),
            },
            CmsItem {
                id: "op-b".to_string(),
                field_data: json!({ "name": "Beta Tele", "slug": "beta-tele" }),
            },
            CmsItem {
                id: "op-c".to_string(),
                field_data: json!({ "name": "Gamma Net", "slug": "gamma-net" }),
            },
        ])
        .unwrap()
    }

    fn aggregate_with_means() -> PriceAggregate {
        // Means: op-a 100, op-b 200, op-c 150.
        let mut agg = PriceAggregate::default();
        agg.non_business_prices = HashMap::from([
            ("op-a".to_string(), vec![90.0, 110.0]),
            ("op-b".to_string(), vec![200.0]),
            ("op-c".to_string(), vec![100.0, 200.0]),
        ]);
        agg.all_prices = agg.non_business_prices.clone();
        agg.contract_count = 5;
        agg
    }

    #[test]
    fn test_mean_empty() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_median_empty_is_zero() {
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(250.0), "250");
        assert_eq!(format_price(247.5), "247.5");
        assert_eq!(format_price(0.0), "0");
    }

    #[test]
    fn test_extremes_and_gap() {
        let report = StatsReport::build(
            &aggregate_with_means(),
            &directory(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        )
        .unwrap();

        assert_eq!(report.cheapest.id, "op-a");
        assert_eq!(report.most_expensive.id, "op-b");
        assert_eq!(report.price_gap_percent, 50.0);
    }

    #[test]
    fn test_paragraph_links_and_gap() {
        let report = StatsReport::build(
            &aggregate_with_means(),
            &directory(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        )
        .unwrap();

        assert!(report.paragraph.contains("50.0%"));
        assert!(report
            .paragraph
            .contains("<a href=\"/mobiltelefoni/mobiloperatorer/alfa-mobil\">Alfa Mobil</a>"));
        assert!(report
            .paragraph
            .contains("<a href=\"/mobiltelefoni/mobiloperatorer/beta-tele\">Beta Tele</a>"));
    }

    #[test]
    fn test_headline_and_date_label() {
        let report = StatsReport::build(
            &aggregate_with_means(),
            &directory(),
            NaiveDate::from_ymd_opt(2026, 8, 29).unwrap(),
        )
        .unwrap();

        assert_eq!(report.headline, "Alle mobiloperatører august 2026");
        assert_eq!(report.date_label, "august 2026");
    }

    #[test]
    fn test_tie_breaks_to_smallest_id() {
        let mut agg = PriceAggregate::default();
        agg.non_business_prices = HashMap::from([
            ("op-b".to_string(), vec![100.0]),
            ("op-a".to_string(), vec![100.0]),
            ("op-c".to_string(), vec![200.0]),
        ]);

        let (min_id, _, max_id, _) = extremes_by_mean(&agg.non_business_prices).unwrap();
        assert_eq!(min_id, "op-a");
        assert_eq!(max_id, "op-c");
    }

    #[test]
    fn test_no_prices_fails() {
        let agg = PriceAggregate::default();
        let result = StatsReport::build(
            &agg,
            &directory(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_carrier_fails() {
        let mut agg = PriceAggregate::default();
        agg.non_business_prices =
            HashMap::from([("op-unknown".to_string(), vec![100.0])]);

        let result = StatsReport::build(
            &agg,
            &directory(),
            NaiveDate::from_ymd_opt(2026, 8, 1).unwrap(),
        );
        assert!(result.is_err());
    }
}
