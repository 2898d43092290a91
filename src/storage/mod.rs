//! Persisted artifacts: binary vector index, entry metadata and exact-match store.

pub mod artifacts;
pub mod error;
pub mod vectors;

pub use artifacts::{ArtifactPaths, KnowledgeBase};
pub use error::{StorageError, StorageResult};
