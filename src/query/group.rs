use serde::Serialize;
use std::collections::BTreeMap;

use crate::dataset::{Period, Record};
use crate::process::metrics::{compute_congestion, CaseCounts};

/// Summed counts for one `(period, tier)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTierGroup {
    pub period: Period,
    pub tier: String,
    pub new_cases: u64,
    pub closed_cases: u64,
    pub pending_cases: u64,
    /// Recomputed from the summed counts, not averaged from rows.
    pub congestion_rate: f64,
}

impl CaseCounts for PeriodTierGroup {
    fn pending_cases(&self) -> u64 {
        self.pending_cases
    }

    fn closed_cases(&self) -> u64 {
        self.closed_cases
    }

    fn set_congestion_rate(&mut self, rate: f64) {
        self.congestion_rate = rate;
    }
}

/// One group per distinct `(period, tier)`, ordered by period then tier.
/// Sums saturate at `u64::MAX`.
pub fn group_by_period_and_tier(records: &[Record]) -> Vec<PeriodTierGroup> {
    let mut sums: BTreeMap<(&Period, &str), [u64; 3]> = BTreeMap::new();
    for r in records {
        let s = sums.entry((&r.period, r.tier.as_str())).or_default();
        s[0] = s[0].saturating_add(r.new_cases);
        s[1] = s[1].saturating_add(r.closed_cases);
        s[2] = s[2].saturating_add(r.pending_cases);
    }

    let mut groups: Vec<PeriodTierGroup> = sums
        .into_iter()
        .map(|((period, tier), [new_cases, closed_cases, pending_cases])| PeriodTierGroup {
            period: period.clone(),
            tier: tier.to_string(),
            new_cases,
            closed_cases,
            pending_cases,
            congestion_rate: 0.0,
        })
        .collect();
    compute_congestion(&mut groups);
    groups
}

/// Grouped points of one tier, ordered by period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierSeries {
    pub tier: String,
    pub points: Vec<PeriodTierGroup>,
}

/// Split groups into per-tier time series (tiers sorted).
pub fn tier_series(groups: &[PeriodTierGroup]) -> Vec<TierSeries> {
    let mut by_tier: BTreeMap<&str, Vec<PeriodTierGroup>> = BTreeMap::new();
    for g in groups {
        by_tier.entry(g.tier.as_str()).or_default().push(g.clone());
    }
    by_tier
        .into_iter()
        .map(|(tier, mut points)| {
            points.sort_by(|a, b| a.period.cmp(&b.period));
            TierSeries {
                tier: tier.to_string(),
                points,
            }
        })
        .collect()
}

/// Headline numbers for the chart page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSummary {
    pub total_pending_cases: u64,
    pub total_closed_cases: u64,
    /// Mean of per-row rates; 0 when there are no rows.
    pub current_rate: f64,
}

pub fn chart_summary(records: &[Record]) -> ChartSummary {
    let totals = super::Totals::from_records(records);
    ChartSummary {
        total_pending_cases: totals.total_pending_cases,
        total_closed_cases: totals.total_closed_cases,
        current_rate: totals.avg_congestion_rate,
    }
}
