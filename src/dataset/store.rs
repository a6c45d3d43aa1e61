use std::sync::{Arc, PoisonError, RwLock};
use tracing::{info, warn};

use super::{Dataset, Record};
use crate::error::{IngestError, NoDatasetError};
use crate::process;
use crate::query::{self, ChartSummary, Facets, Filters, PeriodTierGroup, QueryResult};
use crate::table::RawTable;

struct Inner {
    current: Option<Arc<Dataset>>,
    last_generation: u64,
}

/// Process-wide working set: one immutable `Dataset` generation at a time.
///
/// Readers clone the `Arc` under a short read lock and then work lock-free on
/// that generation; `commit` swaps the pointer under the write lock, so a
/// reader sees either the old generation or the new one, never a mix.
pub struct DatasetStore {
    inner: RwLock<Inner>,
}

impl Default for DatasetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                current: None,
                last_generation: 0,
            }),
        }
    }

    /// Atomically replace the working set. Returns the new generation number.
    pub fn commit(&self, mut dataset: Dataset) -> u64 {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        guard.last_generation += 1;
        dataset.generation = guard.last_generation;
        let generation = dataset.generation;
        let rows = dataset.len();
        guard.current = Some(Arc::new(dataset));
        drop(guard);

        info!(generation, rows, "committed dataset");
        generation
    }

    /// Current generation, or `NoDatasetError` before the first commit.
    pub fn snapshot(&self) -> Result<Arc<Dataset>, NoDatasetError> {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        guard.current.clone().ok_or(NoDatasetError)
    }

    /// 0 until something has been committed.
    pub fn generation(&self) -> u64 {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .last_generation
    }

    /// Run the ingestion pipeline and commit only if it succeeds.
    /// On failure the previous generation stays in place.
    pub fn ingest_and_commit(&self, raw: RawTable) -> Result<u64, IngestError> {
        match process::ingest(raw) {
            Ok(dataset) => Ok(self.commit(dataset)),
            Err(e) => {
                warn!(error = %e, generation = self.generation(), "upload rejected; keeping current dataset");
                Err(e)
            }
        }
    }

    pub fn query(&self, filters: &Filters) -> Result<QueryResult, NoDatasetError> {
        let ds = self.snapshot()?;
        Ok(query::run(&ds, filters))
    }

    pub fn list_facets(&self) -> Result<Facets, NoDatasetError> {
        let ds = self.snapshot()?;
        Ok(query::facets::list_facets(&ds))
    }

    pub fn group_by_period_and_tier(&self) -> Result<Vec<PeriodTierGroup>, NoDatasetError> {
        let ds = self.snapshot()?;
        Ok(query::group::group_by_period_and_tier(&ds.records))
    }

    pub fn export_rows(&self, filters: &Filters) -> Result<Vec<Record>, NoDatasetError> {
        let ds = self.snapshot()?;
        Ok(query::filter_records(&ds.records, filters))
    }

    pub fn chart_summary(&self) -> Result<ChartSummary, NoDatasetError> {
        let ds = self.snapshot()?;
        Ok(query::group::chart_summary(&ds.records))
    }
}
