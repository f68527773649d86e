use std::path::PathBuf;
use thiserror::Error;

/// Failures that make a single measurement log unusable.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("sample interval not found in {0}")]
    MissingSampleInterval(String),
    #[error("invalid sample interval {value:?} in {source_name}")]
    InvalidSampleInterval { source_name: String, value: String },
    #[error("line {line} is not a `index,voltage` reading: {text}")]
    MalformedRow { line: usize, text: String },
    #[error("reading index {index} does not follow {previous}")]
    NonMonotonicIndex { previous: u64, index: u64 },
    #[error("no readings found in {0}")]
    EmptyTable(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, HarvestError>;
