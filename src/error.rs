use std::path::PathBuf;
use thiserror::Error;

/// Errors raised at the file boundary. The forecasting engine itself never fails.
#[derive(Debug, Error)]
pub enum BoqError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}

pub type Result<T> = std::result::Result<T, BoqError>;
