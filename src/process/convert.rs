use anyhow::{anyhow, Context, Result};

use super::metrics::CaseCounts;
use super::schema::REQUIRED_COLUMNS;
use crate::table::{Cell, RawTable};

/// A validated row whose period has not been normalized yet.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedRow {
    pub period: Cell,
    pub tier: String,
    pub district: String,
    pub unit: String,
    pub new_cases: u64,
    pub closed_cases: u64,
    pub pending_cases: u64,
    pub congestion_rate: f64,
}

impl CaseCounts for StagedRow {
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

/// Convert a table that already passed `schema::validate` into typed rows.
/// Any input column named `congestion_rate` is ignored.
pub fn to_staged_rows(table: &RawTable) -> Result<Vec<StagedRow>> {
    let mut idx = [0usize; 7];
    for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = table
            .column_index(name)
            .ok_or_else(|| anyhow!("column `{}` vanished after validation", name))?;
    }
    table
        .rows
        .iter()
        .enumerate()
        .map(|(n, row)| build_row(row, &idx).with_context(|| format!("row {}", n + 1)))
        .collect()
}

fn build_row(row: &[Cell], idx: &[usize; 7]) -> Result<StagedRow> {
    let [period, tier, district, unit, new_cases, closed_cases, pending_cases] = *idx;
    let cell = |i: usize| {
        row.get(i)
            .ok_or_else(|| anyhow!("row is shorter than the header"))
    };
    let label = |i: usize| cell(i).and_then(cell_to_label);
    let count = |i: usize| cell(i).and_then(cell_to_count);

    Ok(StagedRow {
        period: cell(period)?.clone(),
        tier: label(tier)?,
        district: label(district)?,
        unit: label(unit)?,
        new_cases: count(new_cases)?,
        closed_cases: count(closed_cases)?,
        pending_cases: count(pending_cases)?,
        congestion_rate: 0.0,
    })
}

fn cell_to_label(cell: &Cell) -> Result<String> {
    match cell {
        Cell::Text(s) => Ok(s.clone()),
        Cell::Int(n) => Ok(n.to_string()),
        Cell::Float(x) => Ok(x.to_string()),
        Cell::Null => Err(anyhow!("unexpected empty label")),
    }
}

fn cell_to_count(cell: &Cell) -> Result<u64> {
    match cell {
        Cell::Int(n) => u64::try_from(*n).map_err(|_| anyhow!("negative count {}", n)),
        other => Err(anyhow!("count was not coerced: {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::schema;
    use crate::test_support::{raw_table, sample_row};

    #[test]
    fn converts_validated_rows() -> Result<()> {
        let mut table = raw_table(vec![sample_row("2023-01", "INICIAL", 2, 8)]);
        schema::validate(&mut table)?;
        let rows = to_staged_rows(&table)?;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period, Cell::text("2023-01"));
        assert_eq!(rows[0].district, "A");
        assert_eq!((rows[0].pending_cases, rows[0].closed_cases), (2, 8));
        Ok(())
    }

    #[test]
    fn unvalidated_counts_are_a_processing_error() {
        let mut table = raw_table(vec![sample_row("2023-01", "INICIAL", 2, 8)]);
        table.rows[0][5] = Cell::text("8");
        let err = to_staged_rows(&table).unwrap_err();
        assert!(format!("{:#}", err).starts_with("row 1: count was not coerced"));
    }
}
