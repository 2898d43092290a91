//! Tiered support-hint resolver (used by the `triage` binary and integration tests).
//!
//! A free-text customer question is resolved into an answer template plus a 0–100
//! confidence by escalating through three tiers:
//!
//! 1. [`ExactMatchStore`] - normalized exact-match lookup.
//! 2. [`L2SemanticCache`] - flat inner-product search over embedded questions.
//! 3. [`RerankArbiter`] - a language model ranks the top candidates.
//!
//! [`TieredResolver`] orchestrates the tiers and always returns a [`Hint`]. The offline
//! [`IndexBuilder`] produces the artifacts the resolver serves from.
//!
//! ## Test/Mock Support
//! Mock providers are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod builder;
pub mod cache;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod hashing;
pub mod knowledge;
pub mod scoring;
pub mod storage;

pub use builder::{BuildError, BuildOutcome, BuildReport, IndexBuilder};
pub use cache::{
    ExactMatchEntry, ExactMatchStore, Hint, L2CacheError, L2Config, L2SemanticCache,
    ResolverConfig, Route, TieredResolver, VectorIndex,
};
pub use config::{Config, ConfigError};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockEmbedder;
pub use embedding::{EmbeddingConfig, EmbeddingError, EmbeddingProvider, HttpEmbedder};
pub use hashing::{fingerprint, fingerprint_hex, normalize};
pub use knowledge::{Candidate, DatasetSource, FileDataset, KnowledgeEntry};
#[cfg(any(test, feature = "mock"))]
pub use scoring::MockRerankCapability;
pub use scoring::{
    ChatCompletionCapability, ChatConfig, RankedResult, RerankArbiter, RerankCapability,
    RerankFailure,
};
pub use storage::{ArtifactPaths, KnowledgeBase, StorageError};
