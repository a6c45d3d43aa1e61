//! Read-only views over one dataset generation.
//!
//! Every function here returns freshly owned data; nothing borrows from the
//! store past the call.

pub mod facets;
pub mod group;

pub use facets::{Facets, PeriodRange};
pub use group::{ChartSummary, PeriodTierGroup, TierSeries};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dataset::{Dataset, Record};

/// Filter value meaning "no filter".
pub const ALL: &str = "all";

/// Equality filters on the labels plus an inclusive period range.
///
/// A field that is `None`, empty, or [`ALL`] does not filter. Predicates are
/// AND-ed. Period bounds compare against the canonical `YYYY-MM` token as
/// plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filters {
    pub tier: Option<String>,
    pub district: Option<String>,
    pub unit: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tier(mut self, v: impl Into<String>) -> Self {
        self.tier = Some(v.into());
        self
    }

    pub fn district(mut self, v: impl Into<String>) -> Self {
        self.district = Some(v.into());
        self
    }

    pub fn unit(mut self, v: impl Into<String>) -> Self {
        self.unit = Some(v.into());
        self
    }

    pub fn date_from(mut self, v: impl Into<String>) -> Self {
        self.date_from = Some(v.into());
        self
    }

    pub fn date_to(mut self, v: impl Into<String>) -> Self {
        self.date_to = Some(v.into());
        self
    }

    pub fn matches(&self, r: &Record) -> bool {
        let eq = |f: &Option<String>, v: &str| label_filter(f).map_or(true, |want| want == v);
        let period = r.period.as_str();

        eq(&self.tier, &r.tier)
            && eq(&self.district, &r.district)
            && eq(&self.unit, &r.unit)
            && bound(&self.date_from).map_or(true, |from| period >= from)
            && bound(&self.date_to).map_or(true, |to| period <= to)
    }
}

fn label_filter(f: &Option<String>) -> Option<&str> {
    f.as_deref().filter(|s| !s.is_empty() && *s != ALL)
}

fn bound(f: &Option<String>) -> Option<&str> {
    f.as_deref().filter(|s| !s.is_empty())
}

/// Count sums saturate at `u64::MAX`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Totals {
    pub total_new_cases: u64,
    pub total_closed_cases: u64,
    pub total_pending_cases: u64,
    /// Mean of per-row rates; 0 for an empty selection.
    pub avg_congestion_rate: f64,
}

impl Totals {
    pub fn from_records(rows: &[Record]) -> Self {
        let mut t = Totals::default();
        let mut rate_sum = 0.0;
        for r in rows {
            t.total_new_cases = t.total_new_cases.saturating_add(r.new_cases);
            t.total_closed_cases = t.total_closed_cases.saturating_add(r.closed_cases);
            t.total_pending_cases = t.total_pending_cases.saturating_add(r.pending_cases);
            rate_sum += r.congestion_rate;
        }
        if !rows.is_empty() {
            t.avg_congestion_rate = rate_sum / rows.len() as f64;
        }
        t
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub rows: Vec<Record>,
    pub totals: Totals,
    pub count: usize,
}

/// Matching records, in dataset order.
pub fn filter_records(records: &[Record], filters: &Filters) -> Vec<Record> {
    records
        .par_iter()
        .filter(|r| filters.matches(r))
        .cloned()
        .collect()
}

pub fn run(dataset: &Dataset, filters: &Filters) -> QueryResult {
    let rows = filter_records(&dataset.records, filters);
    let totals = Totals::from_records(&rows);
    debug!(
        generation = dataset.generation,
        matched = rows.len(),
        of = dataset.len(),
        "query"
    );
    QueryResult {
        count: rows.len(),
        rows,
        totals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{dataset, max_count_dataset};

    fn fixture() -> Dataset {
        dataset(&[
            ("2023-01", "INICIAL", "A", "U1", 2, 8),
            ("2023-02", "INICIAL", "B", "U2", 5, 5),
            ("2023-03", "FINAL", "A", "U3", 0, 0),
            ("2023-04", "INICIAL", "A", "U1", 3, 1),
        ])
    }

    #[test]
    fn no_filters_returns_everything() {
        let ds = fixture();
        let res = run(&ds, &Filters::new());
        assert_eq!(res.count, res.rows.len());
        assert_eq!(res.rows, ds.records);
    }

    #[test]
    fn all_and_empty_mean_unfiltered() {
        let ds = fixture();
        let res = run(&ds, &Filters::new().tier(ALL).district("").unit(ALL).date_from(""));
        assert_eq!(res.count, 4);
    }

    #[test]
    fn filters_compose_with_and() {
        let ds = fixture();
        let by_tier = run(&ds, &Filters::new().tier("INICIAL"));
        let by_both = run(&ds, &Filters::new().tier("INICIAL").district("A"));
        assert_eq!(by_tier.count, 3);
        assert_eq!(by_both.count, 2);
        assert!(by_both.rows.iter().all(|r| by_tier.rows.contains(r)));
    }

    #[test]
    fn period_bounds_are_inclusive() {
        let ds = fixture();
        let res = run(&ds, &Filters::new().date_from("2023-02").date_to("2023-03"));
        let periods: Vec<&str> = res.rows.iter().map(|r| r.period.as_str()).collect();
        assert_eq!(periods, vec!["2023-02", "2023-03"]);

        // plain string comparison: "2023" sorts before every "2023-MM"
        assert_eq!(run(&ds, &Filters::new().date_from("2023")).count, 4);
    }

    #[test]
    fn totals_over_filtered_rows() {
        let ds = fixture();
        let res = run(&ds, &Filters::new().tier("INICIAL"));
        assert_eq!(res.totals.total_pending_cases, 10);
        assert_eq!(res.totals.total_closed_cases, 14);
        assert_eq!(res.totals.total_new_cases, 24);
        // (20 + 50 + 75) / 3
        assert!((res.totals.avg_congestion_rate - 48.333_333).abs() < 1e-4);
    }

    #[test]
    fn empty_selection_has_zero_totals() {
        let ds = fixture();
        let res = run(&ds, &Filters::new().tier("INTERMEDIÁRIA"));
        assert_eq!(res.count, 0);
        assert_eq!(res.totals, Totals::default());
    }

    #[test]
    fn huge_counts_saturate_instead_of_overflowing() {
        let ds = max_count_dataset(3);
        let res = run(&ds, &Filters::new());
        assert_eq!(res.count, 3);
        assert_eq!(res.totals.total_new_cases, u64::MAX);
        assert_eq!(res.totals.total_closed_cases, u64::MAX);
        assert_eq!(res.totals.total_pending_cases, u64::MAX);
        assert_eq!(res.totals.avg_congestion_rate, 50.0);
    }

    #[test]
    fn single_record_example() {
        let ds = dataset(&[("2023-01", "INICIAL", "A", "U1", 2, 8)]);
        let res = run(&ds, &Filters::new().tier("INICIAL"));
        assert_eq!(res.count, 1);
        assert_eq!(res.totals.total_pending_cases, 2);
        assert_eq!(res.totals.avg_congestion_rate, 20.0);
    }
}
