// src/process/mod.rs
//! Ingestion pipeline: schema check → congestion rate → period normalization.

pub mod convert;
pub mod metrics;
pub mod period;
pub mod schema;

use anyhow::{Context, Result};
use std::panic::{self, AssertUnwindSafe};
use tracing::{info, warn};

use crate::dataset::{Dataset, Record};
use crate::error::IngestError;
use crate::table::RawTable;

/// Turn an uploaded table into a candidate `Dataset`.
///
/// Schema failures come back verbatim as `IngestError::Schema`; anything that
/// goes wrong afterwards (including a panic) is an `IngestError::Processing`.
/// The result may be empty when every period failed to parse. Committing it
/// is the caller's decision.
#[tracing::instrument(level = "info", skip(raw), fields(rows = raw.len()))]
pub fn ingest(mut raw: RawTable) -> Result<Dataset, IngestError> {
    if let Err(e) = schema::validate(&mut raw) {
        warn!(reason = %e, "schema validation failed");
        return Err(e.into());
    }

    let records = panic::catch_unwind(AssertUnwindSafe(|| process_validated(&raw)))
        .map_err(|payload| IngestError::Processing(panic_message(payload.as_ref())))??;

    info!(input = raw.len(), kept = records.len(), "processed upload");
    Ok(Dataset::new(records))
}

fn process_validated(raw: &RawTable) -> Result<Vec<Record>> {
    let mut staged = convert::to_staged_rows(raw).context("converting validated rows")?;
    metrics::compute_congestion(&mut staged);
    Ok(period::normalize(staged))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unexpected panic".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use crate::table::Cell;
    use crate::test_support::{init_test_logging, raw_table, sample_row};

    #[test]
    fn single_row_end_to_end() {
        init_test_logging();
        let raw = raw_table(vec![vec![
            Cell::text("2023-01"),
            Cell::text("INICIAL"),
            Cell::text("A"),
            Cell::text("U1"),
            Cell::Int(10),
            Cell::Int(8),
            Cell::Int(2),
        ]]);
        let ds = ingest(raw).expect("ingest");
        assert_eq!(ds.len(), 1);
        let r = &ds.records[0];
        assert_eq!(r.period.as_str(), "2023-01");
        assert_eq!((r.new_cases, r.closed_cases, r.pending_cases), (10, 8, 2));
        assert_eq!(r.congestion_rate, 20.0);
    }

    #[test]
    fn schema_reason_is_returned_verbatim() {
        let mut raw = raw_table(vec![sample_row("2023-01", "INICIAL", 2, 8)]);
        raw.headers[1] = "entrancia".into();
        assert_eq!(
            ingest(raw).unwrap_err(),
            IngestError::Schema(SchemaError::MissingColumns(vec!["tier".into()]))
        );
    }

    #[test]
    fn input_rates_are_recomputed() {
        let mut raw = raw_table(vec![sample_row("2023-01", "INICIAL", 1, 3)]);
        raw.headers.push("congestion_rate".into());
        raw.rows[0].push(Cell::Float(99.9));
        let ds = ingest(raw).expect("ingest");
        assert_eq!(ds.records[0].congestion_rate, 25.0);
    }

    #[test]
    fn unparseable_periods_shrink_the_dataset() {
        let raw = raw_table(vec![
            sample_row("2023-01", "INICIAL", 1, 1),
            sample_row("01/2023", "INICIAL", 1, 1),
            sample_row("2023-02", "FINAL", 1, 1),
        ]);
        let input = raw.len();
        let ds = ingest(raw).expect("ingest");
        assert!(ds.len() <= input);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[1].tier, "FINAL");
    }

    #[test]
    fn all_rows_dropped_is_still_a_dataset() {
        let raw = raw_table(vec![sample_row("n/a", "INICIAL", 1, 1)]);
        let ds = ingest(raw).expect("ingest");
        assert!(ds.is_empty());
    }

    #[test]
    fn panic_payloads_become_messages() {
        let caught = panic::catch_unwind(|| panic!("boom {}", 1)).unwrap_err();
        assert_eq!(panic_message(caught.as_ref()), "boom 1");
    }
}
