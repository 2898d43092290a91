//! Tiered resolution: L1 exact match, L2 semantic search, L3 arbitration.
//!
//! ```text
//! START ─▶ TIER1 ──hit──▶ DONE (L1, 100)
//!            │ miss
//!            ▼
//!          TIER2 ──top ≥ threshold──▶ DONE (L2, round(sim × 100))
//!            │ below threshold
//!            ▼
//!          TIER3 ──ranked──▶ DONE (L3, arbiter confidence)
//! ```
//!
//! Every failure on the way degrades to a zero-confidence [`Hint`] with a distinguishing
//! route; [`TieredResolver::resolve`] never returns an error.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::l1::ExactMatchStore;
use super::l2::{L2CacheError, L2Config, L2LookupResult, L2SemanticCache};
use super::types::{Hint, Route};
use crate::config::ConfigError;
use crate::constants::{
    DEFAULT_ALTERNATIVE_MIN_CONFIDENCE, DEFAULT_HIGH_CONFIDENCE_SIMILARITY, DEFAULT_L2_TOP_K,
    DEFAULT_MAX_ALTERNATIVES, DEFAULT_NEAR_TIE_MAX_GAP, DEFAULT_NEAR_TIE_MIN_CONFIDENCE,
    DEFAULT_NEAR_TIE_SCAN_DEPTH, DEFAULT_RERANK_CANDIDATES, EXACT_MATCH_CONFIDENCE,
    MAX_CONFIDENCE, similarity_to_confidence,
};
use crate::embedding::EmbeddingProvider;
use crate::knowledge::Candidate;
use crate::scoring::{RerankArbiter, RerankCapability, RerankFailure};
use crate::storage::KnowledgeBase;

/// Escalation thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    /// Tier-2 candidates retrieved per query.
    pub top_k: usize,
    /// Top similarity at or above which Tier 2 answers without Tier 3.
    pub high_confidence_similarity: f32,
    /// Tier-2 candidates forwarded to the arbiter.
    pub rerank_candidates: usize,
    /// Lowest Tier-2 rank (1-based) considered for near-tie alternatives.
    pub near_tie_scan_depth: usize,
    pub near_tie_min_confidence: u8,
    pub near_tie_max_gap: u8,
    /// Floor for any alternative in a Hint.
    pub alternative_min_confidence: u8,
    pub max_alternatives: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_L2_TOP_K,
            high_confidence_similarity: DEFAULT_HIGH_CONFIDENCE_SIMILARITY,
            rerank_candidates: DEFAULT_RERANK_CANDIDATES,
            near_tie_scan_depth: DEFAULT_NEAR_TIE_SCAN_DEPTH,
            near_tie_min_confidence: DEFAULT_NEAR_TIE_MIN_CONFIDENCE,
            near_tie_max_gap: DEFAULT_NEAR_TIE_MAX_GAP,
            alternative_min_confidence: DEFAULT_ALTERNATIVE_MIN_CONFIDENCE,
            max_alternatives: DEFAULT_MAX_ALTERNATIVES,
        }
    }
}

impl ResolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |name: &'static str, reason: String| Err(ConfigError::InvalidValue { name, reason });

        if self.top_k == 0 {
            return invalid("top_k", "must be > 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.high_confidence_similarity) {
            return invalid(
                "high_confidence_similarity",
                format!("must be in [0, 1], got {}", self.high_confidence_similarity),
            );
        }
        if self.rerank_candidates == 0 || self.rerank_candidates > self.top_k {
            return invalid(
                "rerank_candidates",
                format!("must be in 1..={}, got {}", self.top_k, self.rerank_candidates),
            );
        }
        if self.near_tie_scan_depth > self.top_k {
            return invalid(
                "near_tie_scan_depth",
                format!("cannot exceed top_k ({})", self.top_k),
            );
        }
        for (name, value) in [
            ("near_tie_min_confidence", self.near_tie_min_confidence),
            ("near_tie_max_gap", self.near_tie_max_gap),
            ("alternative_min_confidence", self.alternative_min_confidence),
        ] {
            if value > MAX_CONFIDENCE {
                return invalid(name, format!("must be <= {}, got {}", MAX_CONFIDENCE, value));
            }
        }
        Ok(())
    }

    pub fn l2_config(&self) -> L2Config {
        L2Config::with_top_k(self.top_k)
    }
}

/// The resolution orchestrator.
///
/// Generic over the embedding and rerank capabilities so tests can inject mocks. All shared
/// state is read-only; concurrent `resolve` calls need no locking.
pub struct TieredResolver<E: EmbeddingProvider, R: RerankCapability> {
    exact_match: Arc<ExactMatchStore>,
    l2: L2SemanticCache<E>,
    arbiter: RerankArbiter<R>,
    config: ResolverConfig,
}

impl<E: EmbeddingProvider, R: RerankCapability> std::fmt::Debug for TieredResolver<E, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TieredResolver")
            .field("exact_matches", &self.exact_match.len())
            .field("l2", &self.l2)
            .field("arbiter", &self.arbiter)
            .field("config", &self.config)
            .finish()
    }
}

impl<E: EmbeddingProvider, R: RerankCapability> TieredResolver<E, R> {
    /// Assembles a resolver over a loaded knowledge base.
    pub fn new(
        knowledge: &KnowledgeBase,
        embedder: E,
        capability: R,
        config: ResolverConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let l2 = L2SemanticCache::new(
            embedder,
            Arc::clone(&knowledge.index),
            knowledge.catalog.clone(),
            config.l2_config(),
        )
        .map_err(|e| ConfigError::InvalidValue {
            name: "top_k",
            reason: e.to_string(),
        })?;
        let arbiter = RerankArbiter::new(capability).with_max_candidates(config.rerank_candidates);

        Ok(Self {
            exact_match: Arc::clone(&knowledge.exact_match),
            l2,
            arbiter,
            config,
        })
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn exact_match(&self) -> &ExactMatchStore {
        &self.exact_match
    }

    pub fn l2(&self) -> &L2SemanticCache<E> {
        &self.l2
    }

    pub fn arbiter(&self) -> &RerankArbiter<R> {
        &self.arbiter
    }

    /// `true` when both the embedding and rerank capabilities are available.
    pub fn is_ready(&self) -> bool {
        self.l2.is_ready() && self.arbiter.is_ready()
    }

    /// Resolves `question` into a [`Hint`]. Never fails; degraded outcomes carry confidence 0.
    #[instrument(skip(self, question), fields(request_id = %Uuid::new_v4(), question_len = question.len()))]
    pub async fn resolve(&self, question: &str) -> Hint {
        let started = Instant::now();
        let hint = self.run_tiers(question).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            route = %hint.route,
            confidence = hint.confidence,
            candidates_found = hint.candidates_found,
            elapsed_ms,
            "Resolution complete"
        );
        hint.with_processing_time_ms(elapsed_ms)
    }

    async fn run_tiers(&self, question: &str) -> Hint {
        if !self.is_ready() {
            warn!(
                embedder_ready = self.l2.is_ready(),
                arbiter_ready = self.arbiter.is_ready(),
                "Dependency unavailable, returning error hint"
            );
            return Hint::unavailable(Route::Error);
        }

        debug!("Checking exact-match store");
        if let Some(entry) = self.exact_match.lookup(question) {
            info!(ordinal = entry.ordinal, "L1 exact-match hit");
            return Hint::answer(Route::ExactMatch, &entry.to_knowledge(), EXACT_MATCH_CONFIDENCE)
                .with_candidates_found(1);
        }

        debug!("L1 miss, searching vector index");
        let lookup = match self.l2.search(question).await {
            Ok(lookup) => lookup,
            Err(L2CacheError::NoCandidates) => {
                info!("L2 returned no candidates");
                return Hint::no_answer(Route::Semantic);
            }
            Err(e) => {
                warn!(error = %e, "L2 search failed");
                return Hint::unavailable(Route::SemanticFailed);
            }
        };

        let found = lookup.candidates().len();
        let Some(top) = lookup.best_candidate() else {
            return Hint::no_answer(Route::Semantic);
        };

        if top.similarity >= self.config.high_confidence_similarity {
            let confidence = similarity_to_confidence(top.similarity);
            info!(
                similarity = top.similarity,
                confidence, "L2 high-confidence answer, skipping arbiter"
            );
            return Hint::answer(Route::Semantic, &top.entry, confidence)
                .with_alternatives(self.near_ties(&lookup, confidence))
                .with_candidates_found(found);
        }

        debug!(
            similarity = top.similarity,
            threshold = self.config.high_confidence_similarity,
            "Below high-confidence threshold, escalating to arbiter"
        );
        self.arbitrate(question, lookup.candidates())
            .await
            .with_candidates_found(found)
    }

    async fn arbitrate(&self, question: &str, candidates: &[Candidate]) -> Hint {
        let forwarded = &candidates[..candidates.len().min(self.config.rerank_candidates)];
        match self.arbiter.rerank(question, forwarded).await {
            Ok(ranked) => {
                let confidence = ranked.best_confidence;
                let alternatives = if confidence >= self.config.alternative_min_confidence {
                    ranked.alternatives_above(
                        self.config.alternative_min_confidence,
                        self.config.max_alternatives,
                    )
                } else {
                    Vec::new()
                };
                Hint::answer(Route::Arbiter, &ranked.best.entry, confidence)
                    .with_alternatives(alternatives)
            }
            Err(RerankFailure::Transport(reason)) => {
                warn!(%reason, "Arbiter unavailable");
                Hint::unavailable(Route::ArbiterFailed)
            }
            Err(failure) => {
                warn!(%failure, "Arbiter ranking rejected");
                Hint::no_answer(Route::ArbiterFailed)
            }
        }
    }

    /// Tier-2 alternatives close enough to the top answer to be worth showing.
    fn near_ties(&self, lookup: &L2LookupResult, top_confidence: u8) -> Vec<Candidate> {
        let floor = self
            .config
            .near_tie_min_confidence
            .max(self.config.alternative_min_confidence);

        lookup
            .candidates()
            .iter()
            .take(self.config.near_tie_scan_depth)
            .skip(1)
            .filter_map(|candidate| {
                let confidence = similarity_to_confidence(candidate.similarity);
                let close = top_confidence.saturating_sub(confidence) <= self.config.near_tie_max_gap;
                (confidence >= floor && close).then(|| candidate.clone().with_confidence(confidence))
            })
            .take(self.config.max_alternatives)
            .collect()
    }
}
