//! Encode exported rows for download.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use std::io::Write;
use std::str::FromStr;

use crate::dataset::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "csv" => Ok(ExportFormat::Csv),
            other => bail!("unsupported export format: {:?}", other),
        }
    }
}

/// `caseload_YYYYMMDD_HHMMSS.<ext>`
pub fn export_file_name(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "caseload_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

/// Header line plus one line per record, in the order given.
pub fn write_rows_csv<W: Write>(writer: W, rows: &[Record]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    if rows.is_empty() {
        wtr.write_record([
            "period",
            "tier",
            "district",
            "unit",
            "new_cases",
            "closed_cases",
            "pending_cases",
            "congestion_rate",
        ])
        .context("writing CSV header")?;
    }
    for r in rows {
        wtr.serialize(r).context("writing CSV row")?;
    }
    wtr.flush().context("flushing CSV output")?;
    Ok(())
}
