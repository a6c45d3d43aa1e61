use anyhow::{anyhow, Context, Result};
use clap::Parser;
use caseload::{
    export::{self, ExportFormat},
    query::group,
    table, Config, DatasetStore, Filters,
};
use std::{fs::File, io::BufWriter, path::PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Ingest a case-load CSV and print filtered views as JSON"
)]
struct Args {
    /// Uploaded CSV file
    input: PathBuf,
    #[arg(long)]
    tier: Option<String>,
    #[arg(long)]
    district: Option<String>,
    #[arg(long)]
    unit: Option<String>,
    /// Inclusive lower period bound (YYYY-MM)
    #[arg(long)]
    from: Option<String>,
    /// Inclusive upper period bound (YYYY-MM)
    #[arg(long)]
    to: Option<String>,
    /// Print filter options instead of rows
    #[arg(long)]
    facets: bool,
    /// Print per-tier congestion series instead of rows
    #[arg(long)]
    chart: bool,
    /// Also write the filtered rows as CSV
    #[arg(long)]
    export: Option<PathBuf>,
}

impl Args {
    fn filters(&self) -> Filters {
        Filters {
            tier: self.tier.clone(),
            district: self.district.clone(),
            unit: self.unit.clone(),
            date_from: self.from.clone(),
            date_to: self.to.clone(),
        }
    }
}

fn main() -> Result<()> {
    let config = Config::from_env().context("loading configuration")?;

    // ─── logging ─────────────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.as_str()));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let filters = args.filters();

    // ─── ingest + commit ─────────────────────────────────────────────
    let raw = table::load_csv_file(&args.input, &config)?;
    let store = DatasetStore::new();
    let generation = store
        .ingest_and_commit(raw)
        .map_err(|e| anyhow!("upload rejected: {}", e))?;
    info!(generation, "dataset ready");

    // ─── output ──────────────────────────────────────────────────────
    let out = if args.facets {
        serde_json::to_string_pretty(&store.list_facets()?)?
    } else if args.chart {
        let groups = store.group_by_period_and_tier()?;
        serde_json::to_string_pretty(&serde_json::json!({
            "series": group::tier_series(&groups),
            "totals": store.chart_summary()?,
        }))?
    } else {
        serde_json::to_string_pretty(&store.query(&filters)?)?
    };
    println!("{}", out);

    if let Some(path) = &args.export {
        let format: ExportFormat = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .parse()?;
        let rows = store.export_rows(&filters)?;
        let file = File::create(path)
            .with_context(|| format!("creating export file {}", path.display()))?;
        export::write_rows_csv(BufWriter::new(file), &rows)?;
        info!(
            rows = rows.len(),
            path = %path.display(),
            suggested = %export::export_file_name(format, chrono::Utc::now()),
            "exported rows"
        );
    }

    Ok(())
}
