use std::path::PathBuf;

use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read dataset {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("dataset has no column {name}")]
    MissingColumn { name: String },
}

pub type Result<T> = std::result::Result<T, IngestError>;
