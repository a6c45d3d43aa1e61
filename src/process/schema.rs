use rayon::prelude::*;
use tracing::debug;

use crate::error::SchemaError;
use crate::table::{Cell, RawTable};

/// Columns every upload must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "period",
    "tier",
    "district",
    "unit",
    "new_cases",
    "closed_cases",
    "pending_cases",
];

/// Required columns holding case counts.
pub const NUMERIC_COLUMNS: [&str; 3] = ["new_cases", "closed_cases", "pending_cases"];

/// Check `table` against the required-column contract.
///
/// 1. every required column must exist (sorted list of the missing ones otherwise)
/// 2. count columns are coerced in place; unusable cells become `Cell::Null`
/// 3. any `Null` left in a required column rejects the whole table
pub fn validate(table: &mut RawTable) -> Result<(), SchemaError> {
    let mut missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| table.column_index(c).is_none())
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        missing.sort();
        return Err(SchemaError::MissingColumns(missing));
    }

    let required: Vec<usize> = REQUIRED_COLUMNS
        .iter()
        .filter_map(|c| table.column_index(c))
        .collect();

    for col in NUMERIC_COLUMNS {
        if let Some(idx) = table.column_index(col) {
            coerce_column(table, idx, col)?;
        }
    }

    let has_gap = table
        .rows
        .par_iter()
        .any(|row| required.iter().any(|&i| row.get(i).map_or(true, Cell::is_null)));
    if has_gap {
        return Err(SchemaError::MissingData);
    }

    Ok(())
}

/// True when no cell of the column holds text.
pub fn is_numeric_column(table: &RawTable, idx: usize) -> bool {
    table
        .rows
        .iter()
        .filter_map(|r| r.get(idx))
        .all(|c| !matches!(c, Cell::Text(_)))
}

fn coerce_column(table: &mut RawTable, idx: usize, name: &str) -> Result<(), SchemaError> {
    let width = table.headers.len();
    if table.rows.iter().any(|r| r.len() != width) {
        return Err(SchemaError::NonNumericColumn(name.to_string()));
    }

    debug!(
        column = name,
        textual = !is_numeric_column(table, idx),
        "coercing count column"
    );
    table.rows.par_iter_mut().for_each(|row| {
        let cell = &mut row[idx];
        *cell = coerce_count(cell);
    });
    Ok(())
}

/// Non-negative whole numbers survive as `Cell::Int`; anything else is `Cell::Null`.
pub fn coerce_count(cell: &Cell) -> Cell {
    match cell {
        Cell::Int(n) if *n >= 0 => Cell::Int(*n),
        Cell::Float(x) => float_to_count(*x),
        Cell::Text(s) => {
            let s = s.trim();
            if let Ok(n) = s.parse::<i64>() {
                if n >= 0 {
                    Cell::Int(n)
                } else {
                    Cell::Null
                }
            } else if let Ok(x) = s.parse::<f64>() {
                float_to_count(x)
            } else {
                Cell::Null
            }
        }
        _ => Cell::Null,
    }
}

fn float_to_count(x: f64) -> Cell {
    if x.is_finite() && x >= 0.0 && x.fract() == 0.0 && x < i64::MAX as f64 {
        Cell::Int(x as i64)
    } else {
        Cell::Null
    }
}
