//! Shared fixtures for unit tests.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::dataset::Dataset;
use crate::process::{self, schema::REQUIRED_COLUMNS};
use crate::table::{Cell, RawTable};

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,caseload=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Table with exactly the required headers.
pub fn raw_table(rows: Vec<Vec<Cell>>) -> RawTable {
    RawTable {
        headers: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows,
    }
}

/// `new_cases` is `pending + closed`; district `A`, unit `U1`.
pub fn sample_row(period: &str, tier: &str, pending: i64, closed: i64) -> Vec<Cell> {
    vec![
        Cell::text(period),
        Cell::text(tier),
        Cell::text("A"),
        Cell::text("U1"),
        Cell::Int(pending + closed),
        Cell::Int(closed),
        Cell::Int(pending),
    ]
}

/// Ingested dataset from `(period, tier, district, unit, pending, closed)` rows.
pub fn dataset(rows: &[(&str, &str, &str, &str, i64, i64)]) -> Dataset {
    let rows = rows
        .iter()
        .map(|&(period, tier, district, unit, pending, closed)| {
            vec![
                Cell::text(period),
                Cell::text(tier),
                Cell::text(district),
                Cell::text(unit),
                Cell::Int(pending + closed),
                Cell::Int(closed),
                Cell::Int(pending),
            ]
        })
        .collect();
    process::ingest(raw_table(rows)).expect("fixture rows are valid")
}

/// `n` rows in one `(period, tier)` with every count at `i64::MAX`.
pub fn max_count_dataset(n: usize) -> Dataset {
    let rows = (0..n)
        .map(|i| {
            vec![
                Cell::text("2023-01"),
                Cell::text("FINAL"),
                Cell::text("A"),
                Cell::text(format!("U{}", i)),
                Cell::Int(i64::MAX),
                Cell::Int(i64::MAX),
                Cell::Int(i64::MAX),
            ]
        })
        .collect();
    process::ingest(raw_table(rows)).expect("max counts are valid")
}
