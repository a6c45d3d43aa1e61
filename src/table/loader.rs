use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;
use std::{fs, io::Cursor, path::Path};
use tracing::{debug, info};

use super::utils::{clean_str, decode_text};
use super::{Cell, RawTable};
use crate::config::Config;

/// Parse an uploaded CSV body into a `RawTable`.
///
/// - first record is the header row
/// - cells are trimmed and unquoted; empty cells become `Cell::Null`
/// - short rows are padded with `Cell::Null`, long rows are an error
pub fn parse_csv_bytes(bytes: &[u8], delimiter: u8) -> Result<RawTable> {
    let text = decode_text(bytes);
    let mut rdr = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(Cursor::new(text.as_bytes()));

    let headers: Vec<String> = rdr
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(clean_str)
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut table = RawTable::new(headers);
    let width = table.headers.len();
    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx + 1))?;
        if record.len() > width {
            bail!(
                "record {} has {} fields but the header has {}",
                idx + 1,
                record.len(),
                width
            );
        }
        let mut row: Vec<Cell> = record
            .iter()
            .map(|raw| {
                let c = clean_str(raw);
                if c.is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(c)
                }
            })
            .collect();
        row.resize(width, Cell::Null);
        table.rows.push(row);
    }

    debug!(rows = table.rows.len(), cols = width, "parsed CSV body");
    Ok(table)
}

/// Load an uploaded file from disk, enforcing the extension and size limits.
#[tracing::instrument(level = "info", skip(path, config), fields(path = %path.as_ref().display()))]
pub fn load_csv_file<P: AsRef<Path>>(path: P, config: &Config) -> Result<RawTable> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !config.allows_extension(&ext) {
        bail!(
            "file type not allowed: {:?} (allowed: {})",
            path.file_name().unwrap_or_default(),
            config.allowed_extensions.join(", ")
        );
    }

    let size = fs::metadata(path)
        .with_context(|| format!("reading metadata of {}", path.display()))?
        .len();
    if size > config.max_upload_bytes {
        bail!(
            "file too large: {} bytes (max {})",
            size,
            config.max_upload_bytes
        );
    }

    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let table = parse_csv_bytes(&bytes, config.delimiter)
        .with_context(|| format!("parsing {}", path.display()))?;
    info!(rows = table.len(), "loaded upload");
    Ok(table)
}
