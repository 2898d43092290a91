use std::path::PathBuf;

use thiserror::Error;

use crate::cache::VectorIndexError;
use crate::embedding::EmbeddingError;
use crate::knowledge::DatasetError;
use crate::storage::StorageError;

/// Any failure aborts the build before artifacts are written.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("dataset not found at {path}")]
    DatasetMissing { path: PathBuf },

    #[error("dataset {path} has no usable rows")]
    EmptyKnowledgeBase { path: PathBuf },

    #[error("embed batch size must be greater than zero")]
    InvalidBatchSize,

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error(transparent)]
    Index(#[from] VectorIndexError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub type BuildResult<T> = Result<T, BuildError>;
