//! Process configuration, read from the environment (and `.env` if present).

use anyhow::{anyhow, bail, Context, Result};
use std::env;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Column delimiter for uploaded files.
    pub delimiter: u8,
    pub max_upload_bytes: u64,
    /// Lower-case extensions without the dot.
    pub allowed_extensions: Vec<String>,
    /// Fallback `EnvFilter` directive when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            delimiter: b',',
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            allowed_extensions: vec!["csv".into()],
            log_filter: "info".into(),
        }
    }
}

impl Config {
    /// Load `.env` (if any) and build the config from `CASELOAD_*` variables.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Config::default();

        if let Some(raw) = lookup("CASELOAD_DELIMITER") {
            cfg.delimiter = parse_delimiter(&raw)?;
        }
        if let Some(raw) = lookup("CASELOAD_MAX_UPLOAD_BYTES") {
            cfg.max_upload_bytes = raw
                .trim()
                .parse()
                .with_context(|| format!("CASELOAD_MAX_UPLOAD_BYTES: invalid value {:?}", raw))?;
        }
        if let Some(raw) = lookup("CASELOAD_ALLOWED_EXTENSIONS") {
            let exts: Vec<String> = raw
                .split(',')
                .map(|e| e.trim().trim_start_matches('.').to_lowercase())
                .filter(|e| !e.is_empty())
                .collect();
            if exts.is_empty() {
                bail!("CASELOAD_ALLOWED_EXTENSIONS: no extensions given");
            }
            cfg.allowed_extensions = exts;
        }
        if let Some(raw) = lookup("CASELOAD_LOG") {
            cfg.log_filter = raw;
        }

        Ok(cfg)
    }

    pub fn allows_extension(&self, ext: &str) -> bool {
        let ext = ext.to_lowercase();
        self.allowed_extensions.iter().any(|e| *e == ext)
    }
}

fn parse_delimiter(raw: &str) -> Result<u8> {
    match raw {
        "\\t" | "tab" => return Ok(b'\t'),
        _ => {}
    }
    match raw.as_bytes() {
        [b] => Ok(*b),
        _ => Err(anyhow!(
            "CASELOAD_DELIMITER: expected a single ASCII character, got {:?}",
            raw
        )),
    }
}
