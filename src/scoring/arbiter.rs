use tracing::{debug, info, instrument, warn};

use crate::constants::DEFAULT_RERANK_CANDIDATES;
use crate::knowledge::Candidate;

use super::capability::RerankCapability;
use super::error::RerankFailure;
use super::parser::parse_ranking;
use super::prompt::RerankPrompt;
use super::types::RankedResult;

/// Tier 3: asks a generative model to rank Tier-2 candidates and calibrates the result.
pub struct RerankArbiter<R: RerankCapability> {
    capability: R,
    max_candidates: usize,
}

impl<R: RerankCapability> std::fmt::Debug for RerankArbiter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RerankArbiter")
            .field("max_candidates", &self.max_candidates)
            .finish_non_exhaustive()
    }
}

impl<R: RerankCapability> RerankArbiter<R> {
    pub fn new(capability: R) -> Self {
        Self {
            capability,
            max_candidates: DEFAULT_RERANK_CANDIDATES,
        }
    }

    /// Caps the number of candidates forwarded to the model.
    pub fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates.max(1);
        self
    }

    pub fn capability(&self) -> &R {
        &self.capability
    }

    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    pub fn is_ready(&self) -> bool {
        self.capability.is_ready()
    }

    /// Ranks the first `max_candidates` candidates.
    ///
    /// Model confidences are taken 1:1 as Hint confidences.
    #[instrument(skip(self, question, candidates), fields(question_len = question.len(), candidates = candidates.len()))]
    pub async fn rerank(
        &self,
        question: &str,
        candidates: &[Candidate],
    ) -> Result<RankedResult, RerankFailure> {
        let candidates = &candidates[..candidates.len().min(self.max_candidates)];
        if candidates.is_empty() {
            return Err(RerankFailure::NoCandidates);
        }

        let prompt = RerankPrompt::build(question, candidates);
        debug!(prompt_len = prompt.user.len(), "Sending candidates to arbiter");

        let raw = self.capability.evaluate(&prompt).await.map_err(|e| {
            warn!(error = %e, "Arbiter call failed");
            RerankFailure::from(e)
        })?;

        let items = parse_ranking(&raw, candidates.len()).inspect_err(|e| {
            warn!(error = %e, response_len = raw.len(), "Arbiter response rejected");
        })?;

        let ranked: Vec<Candidate> = items
            .into_iter()
            .map(|item| {
                let candidate = candidates[item.position]
                    .clone()
                    .with_confidence(item.confidence);
                match item.reason {
                    Some(reason) => candidate.with_rationale(reason),
                    None => candidate,
                }
            })
            .collect();

        let result = RankedResult::from_ranked(ranked).ok_or(RerankFailure::NoValidItems)?;
        info!(
            best_ordinal = result.best.ordinal(),
            best_confidence = result.best_confidence,
            ranked = result.alternatives.len() + 1,
            "Arbiter ranking accepted"
        );
        Ok(result)
    }
}
