//! Case-load ingestion and query engine for judicial units.
//!
//! Uploaded tables go through `process::ingest` (schema check, congestion
//! rate, period normalization) and are published in a `DatasetStore`, which
//! serves filtered queries, facets and grouped views.

pub mod config;
pub mod dataset;
pub mod error;
pub mod export;
pub mod process;
pub mod query;
pub mod table;

#[cfg(test)]
mod test_support;

pub use config::Config;
pub use dataset::{Dataset, DatasetStore, Period, Record};
pub use error::{IngestError, NoDatasetError, SchemaError};
pub use process::ingest;
pub use query::{Facets, Filters, QueryResult, Totals};
pub use table::{Cell, RawTable};
