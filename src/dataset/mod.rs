pub mod store;

pub use store::DatasetStore;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

/// Canonical `YYYY-MM` period token.
///
/// String order equals chronological order for four-digit years, so range
/// filters compare the token directly.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Period(String);

impl Period {
    pub(crate) fn from_date(date: NaiveDate) -> Self {
        Period(date.format("%Y-%m").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One validated row of the working set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub period: Period,
    pub tier: String,
    pub district: String,
    pub unit: String,
    pub new_cases: u64,
    pub closed_cases: u64,
    pub pending_cases: u64,
    pub congestion_rate: f64,
}

/// One generation of the working set.
#[derive(Debug, Clone, Serialize)]
pub struct Dataset {
    /// Assigned by `DatasetStore::commit`; 0 until committed.
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            generation: 0,
            loaded_at: Utc::now(),
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
