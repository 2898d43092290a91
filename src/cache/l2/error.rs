use thiserror::Error;

#[derive(Debug, Error)]
/// Errors raised by the flat vector index.
pub enum VectorIndexError {
    /// A vector or query does not match the index dimension.
    #[error("dimension mismatch: index has {expected}, got {actual}")]
    DimensionMismatch {
        /// Index dimension.
        expected: usize,
        /// Offending vector length.
        actual: usize,
    },

    /// Index dimension must be non-zero.
    #[error("invalid index dimension: {0}")]
    InvalidDimension(usize),

    /// Ordinal and vector buffers disagree.
    #[error("index buffers inconsistent: {ordinals} ordinals for {values} values at dimension {dimension}")]
    LengthMismatch {
        ordinals: usize,
        values: usize,
        dimension: usize,
    },
}

pub type VectorIndexResult<T> = Result<T, VectorIndexError>;

#[derive(Debug, Error)]
/// Errors returned by the Tier-2 semantic lookup.
pub enum L2CacheError {
    /// Embedding generation failed.
    #[error("embedding generation failed: {reason}")]
    EmbeddingFailed {
        /// Error message.
        reason: String,
    },

    /// Vector index search failed.
    #[error("vector index error: {0}")]
    Index(#[from] VectorIndexError),

    /// Invalid configuration.
    #[error("configuration error: {reason}")]
    ConfigError {
        /// Error message.
        reason: String,
    },

    /// No candidates were returned (empty index or every ordinal unresolved).
    #[error("no candidates found for query")]
    NoCandidates,
}

/// Convenience result type for L2 operations.
pub type L2CacheResult<T> = Result<T, L2CacheError>;
