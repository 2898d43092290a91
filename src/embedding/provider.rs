use std::future::Future;

use super::error::EmbeddingResult;

/// Turns text into fixed-dimension, L2-normalized vectors.
///
/// The same provider (same model, same dimension) must be used to build the vector index and
/// to embed live queries.
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds one query.
    fn embed_one(&self, text: &str) -> impl Future<Output = EmbeddingResult<Vec<f32>>> + Send;

    /// Embeds a batch; the output order matches `texts`.
    fn embed_many(
        &self,
        texts: &[String],
    ) -> impl Future<Output = EmbeddingResult<Vec<Vec<f32>>>> + Send;

    /// `false` when the provider was never configured.
    fn is_ready(&self) -> bool {
        true
    }
}
