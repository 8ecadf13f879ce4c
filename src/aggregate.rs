//! In-memory price accumulation over the paginated plan collection.

use std::collections::HashMap;

use crate::records::PlanRecord;

/// Accumulated prices for one full pass over the plan collection.
///
/// Built incrementally while paging and discarded after the run. A record
/// with a known carrier and known price lands in that carrier's all-plans
/// bucket always, and in the non-business bucket unless the business flag
/// is set. Tier lists only take non-business prices whose data label is
/// exactly `"10"` or `"100"`.
#[derive(Debug, Default)]
pub struct PriceAggregate {
    /// Total records seen, including those missing carrier or price.
    pub contract_count: usize,
    /// Per-carrier prices across all plans; only its key count is reported.
    pub all_prices: HashMap<String, Vec<f64>>,
    /// Per-carrier prices for non-business plans; drives the extremes.
    pub non_business_prices: HashMap<String, Vec<f64>>,
    /// Non-business prices at the 10GB tier.
    pub prices_10gb: Vec<f64>,
    /// Non-business prices at the 100GB tier.
    pub prices_100gb: Vec<f64>,
}

impl PriceAggregate {
    pub fn observe(&mut self, plan: &PlanRecord) {
        self.contract_count += 1;

        let (Some(carrier), Some(price)) = (&plan.carrier, plan.price) else {
            return;
        };

        self.all_prices.entry(carrier.clone()).or_default().push(price);

        if plan.is_business() {
            return;
        }

        self.non_business_prices
            .entry(carrier.clone())
            .or_default()
            .push(price);

        match plan.data_tier.as_deref() {
            Some("10") => self.prices_10gb.push(price),
            Some("100") => self.prices_100gb.push(price),
            _ => {}
        }
    }

    /// Number of distinct carriers with at least one priced plan.
    pub fn carrier_count(&self) -> usize {
        self.all_prices.len()
    }
}
