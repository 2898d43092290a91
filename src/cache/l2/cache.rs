use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::embedding::EmbeddingProvider;
use crate::embedding::utils::l2_normalize;
use crate::knowledge::{Candidate, EntryCatalog};

use super::config::L2Config;
use super::error::{L2CacheError, L2CacheResult};
use super::index::VectorIndex;
use super::types::L2LookupResult;

/// Tier-2 lookup: embed the question, search the flat index, resolve ordinals to entries.
///
/// Escalation decisions (high-confidence short-circuit, Tier-3 hand-off) belong to the
/// orchestrator; this type only reports what the index found.
pub struct L2SemanticCache<E: EmbeddingProvider> {
    embedder: E,
    index: Arc<VectorIndex>,
    catalog: EntryCatalog,
    config: L2Config,
}

impl<E: EmbeddingProvider> std::fmt::Debug for L2SemanticCache<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("L2SemanticCache")
            .field("vectors", &self.index.len())
            .field("dimension", &self.index.dimension())
            .field("entries", &self.catalog.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingProvider> L2SemanticCache<E> {
    pub fn new(
        embedder: E,
        index: Arc<VectorIndex>,
        catalog: EntryCatalog,
        config: L2Config,
    ) -> L2CacheResult<Self> {
        config.validate()?;
        Ok(Self {
            embedder,
            index,
            catalog,
            config,
        })
    }

    pub fn config(&self) -> &L2Config {
        &self.config
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn catalog(&self) -> &EntryCatalog {
        &self.catalog
    }

    #[instrument(skip(self, question), fields(question_len = question.len(), top_k = self.config.top_k))]
    pub async fn search(&self, question: &str) -> L2CacheResult<L2LookupResult> {
        debug!("Generating embedding for question");
        let mut embedding = self
            .embedder
            .embed_one(question)
            .await
            .map_err(|e| L2CacheError::EmbeddingFailed {
                reason: e.to_string(),
            })?;
        l2_normalize(&mut embedding);

        let hits = self.index.search(&embedding, self.config.top_k)?;
        let index_hits = hits.len();
        debug!(hits = index_hits, "Index search complete, resolving ordinals");

        let candidates: Vec<Candidate> = hits
            .into_iter()
            .filter_map(|hit| match self.catalog.get(hit.ordinal) {
                Some(entry) => Some(Candidate::new(entry.clone(), hit.similarity)),
                None => {
                    warn!(
                        ordinal = hit.ordinal,
                        "Index ordinal has no metadata entry, skipping candidate"
                    );
                    None
                }
            })
            .collect();

        if candidates.is_empty() {
            return Err(L2CacheError::NoCandidates);
        }

        info!(
            index_hits,
            candidates = candidates.len(),
            best_similarity = candidates.first().map(|c| c.similarity),
            "L2 search complete"
        );

        Ok(L2LookupResult::new(embedding, candidates, index_hits))
    }

    /// `false` when the embedding provider is unavailable.
    pub fn is_ready(&self) -> bool {
        self.embedder.is_ready()
    }
}
