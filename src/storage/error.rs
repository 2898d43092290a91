use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("write failed: {0}")]
    WriteFailed(String),

    #[error("artifact missing: {path}")]
    MissingArtifact { path: PathBuf },

    #[error("serialization failed for {path}: {reason}")]
    Serialization { path: PathBuf, reason: String },

    #[error("invalid vector index file: {reason}")]
    InvalidIndexFile { reason: String },

    #[error("artifacts are inconsistent: {reason}")]
    Inconsistent { reason: String },
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
