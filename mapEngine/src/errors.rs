use std::io;

use thiserror::Error;

/// Failures from configuration and record input.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to read config '{path}': {source}")]
    ConfigRead { path: String, source: io::Error },
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error(transparent)]
    Records(#[from] RecordLoadError),
}

/// Failures of the persistent key-value store behind the location cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum RecordLoadError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("missing column '{0}'")]
    MissingColumn(&'static str),
    #[error("invalid id on line {line}: '{value}'")]
    InvalidId { line: u64, value: String },
    #[error("unsupported record file extension: '{0}'")]
    UnsupportedFormat(String),
}
