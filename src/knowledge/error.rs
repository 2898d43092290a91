use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
/// Errors raised while reading a knowledge-base dataset.
pub enum DatasetError {
    /// The dataset file does not exist.
    #[error("dataset not found at '{path}'")]
    NotFound { path: PathBuf },

    /// The file extension maps to no supported format.
    #[error("unsupported dataset format '{extension}' for '{path}' (expected xlsx, xls, ods, csv or json)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The file could not be opened or decoded.
    #[error("failed to read dataset '{path}': {reason}")]
    Read { path: PathBuf, reason: String },

    /// The file holds no header row.
    #[error("dataset '{path}' has no header row")]
    MissingHeader { path: PathBuf },
}

pub type DatasetResult<T> = Result<T, DatasetError>;
