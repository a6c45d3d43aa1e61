use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

use super::convert::StagedRow;
use crate::dataset::{Period, Record};
use crate::table::Cell;

/// `%Y-%m`: four-digit year (0001 onwards), one- or two-digit month, nothing else.
static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").expect("static regex"));

/// Strict parse of a year-month token into its canonical `YYYY-MM` form.
pub fn parse_period(s: &str) -> Option<Period> {
    let caps = YEAR_MONTH.captures(s)?;
    let year: i32 = caps[1].parse().ok().filter(|y| *y >= 1)?;
    let month: u32 = caps[2].parse().ok()?;
    let first_day = NaiveDate::from_ymd_opt(year, month, 1)?;
    Some(Period::from_date(first_day))
}

/// Drop rows whose period does not parse; canonicalize the rest, keeping order.
pub fn normalize(rows: Vec<StagedRow>) -> Vec<Record> {
    let total = rows.len();
    let records: Vec<Record> = rows
        .into_iter()
        .filter_map(|row| {
            let period = match &row.period {
                Cell::Text(s) => parse_period(s)?,
                _ => return None,
            };
            Some(Record {
                period,
                tier: row.tier,
                district: row.district,
                unit: row.unit,
                new_cases: row.new_cases,
                closed_cases: row.closed_cases,
                pending_cases: row.pending_cases,
                congestion_rate: row.congestion_rate,
            })
        })
        .collect();

    let dropped = total - records.len();
    if dropped > 0 {
        warn!(dropped, kept = records.len(), "dropped rows with unparseable period");
    }
    records
}
