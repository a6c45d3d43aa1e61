use serde::Serialize;
use std::collections::BTreeSet;

use crate::dataset::{Dataset, Period};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodRange {
    pub min: Option<Period>,
    pub max: Option<Period>,
}

/// Distinct label values (sorted) and the period span of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub tiers: Vec<String>,
    pub districts: Vec<String>,
    pub units: Vec<String>,
    pub period: PeriodRange,
}

pub fn list_facets(dataset: &Dataset) -> Facets {
    let mut tiers = BTreeSet::new();
    let mut districts = BTreeSet::new();
    let mut units = BTreeSet::new();
    let mut range = PeriodRange::default();

    for r in &dataset.records {
        tiers.insert(r.tier.as_str());
        districts.insert(r.district.as_str());
        units.insert(r.unit.as_str());
        if range.min.as_ref().map_or(true, |m| r.period < *m) {
            range.min = Some(r.period.clone());
        }
        if range.max.as_ref().map_or(true, |m| r.period > *m) {
            range.max = Some(r.period.clone());
        }
    }

    let owned = |s: BTreeSet<&str>| -> Vec<String> { s.into_iter().map(str::to_string).collect() };
    Facets {
        tiers: owned(tiers),
        districts: owned(districts),
        units: owned(units),
        period: range,
    }
}
