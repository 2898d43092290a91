//! Embedding providers.
//!
//! - [`HttpEmbedder`] calls an OpenAI-compatible embeddings endpoint.
//! - [`MockEmbedder`] (feature `mock`) is a deterministic in-process stand-in for tests.

/// Endpoint configuration.
pub mod config;
mod error;
/// HTTP embeddings client.
pub mod http;
/// Test embedder.
#[cfg(any(test, feature = "mock"))]
pub mod mock;
/// Provider trait.
pub mod provider;
/// Vector helpers.
pub mod utils;

pub use config::EmbeddingConfig;
pub use error::{EmbeddingError, EmbeddingResult};
pub use http::HttpEmbedder;
#[cfg(any(test, feature = "mock"))]
pub use mock::MockEmbedder;
pub use provider::EmbeddingProvider;
