//! Error kinds surfaced to callers of the ingestion and query layers.

use thiserror::Error;

/// Rejection of an upload by the schema validator. Never partially applied.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// Names are sorted.
    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("column '{0}' must contain only numbers")]
    NonNumericColumn(String),

    #[error("required data is missing in some rows")]
    MissingData,
}

/// Failure of the whole ingestion pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("processing error: {0}")]
    Processing(String),
}

impl From<anyhow::Error> for IngestError {
    fn from(e: anyhow::Error) -> Self {
        IngestError::Processing(format!("{:#}", e))
    }
}

/// A read was issued before any dataset was committed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("no data available")]
pub struct NoDatasetError;
