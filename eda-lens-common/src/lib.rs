pub mod config;
pub use config::{
    ClassifyConfig, CorrelationConfig, EdaConfig, ReportConfig, ReportFormat, ThresholdConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EdaLensError {
    #[error("invalid column: '{0}' is not in the dataset")]
    InvalidColumn(String),
    #[error("type mismatch on column '{column}': expected {expected}, found {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },
    #[error("empty dataset: {0}")]
    EmptyDataset(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EdaLensError>;
