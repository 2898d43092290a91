//! Cross-cutting, shared constants.
//!
//! Tier thresholds are the defaults for [`crate::cache::ResolverConfig`]; prefer reading them
//! from the config at runtime so tests can tighten or loosen them.

/// Number of Tier-2 candidates retrieved per query.
pub const DEFAULT_L2_TOP_K: usize = 5;

/// Tier-2 similarity at or above which the answer is accepted without Tier 3.
pub const DEFAULT_HIGH_CONFIDENCE_SIMILARITY: f32 = 0.95;

/// Number of top Tier-2 candidates forwarded to the arbiter.
pub const DEFAULT_RERANK_CANDIDATES: usize = 3;

/// Lowest rank (1-based) scanned for Tier-2 near-ties.
pub const DEFAULT_NEAR_TIE_SCAN_DEPTH: usize = 4;

/// Minimum derived confidence of a Tier-2 near-tie alternative.
pub const DEFAULT_NEAR_TIE_MIN_CONFIDENCE: u8 = 80;

/// Maximum confidence gap between the top Tier-2 answer and a near-tie.
pub const DEFAULT_NEAR_TIE_MAX_GAP: u8 = 5;

/// Minimum confidence for any alternative surfaced in a Hint.
pub const DEFAULT_ALTERNATIVE_MIN_CONFIDENCE: u8 = 50;

/// Maximum number of alternatives in a Hint.
pub const DEFAULT_MAX_ALTERNATIVES: usize = 2;

/// Texts per embedding request during index builds.
pub const DEFAULT_EMBED_BATCH_SIZE: usize = 32;

/// Embedding model requested when none is configured.
pub const DEFAULT_EMBEDDING_MODEL: &str = "bge-m3";

/// Chat model used by the arbiter when none is configured.
pub const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";

/// Per-request timeout for the embedding and arbiter services.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Sampling temperature for arbiter calls.
pub const DEFAULT_LLM_TEMPERATURE: f32 = 0.3;

/// Completion token cap for arbiter calls.
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 800;

/// Confidence reported for an exact Tier-1 hit.
pub const EXACT_MATCH_CONFIDENCE: u8 = 100;

/// Upper bound of the confidence scale.
pub const MAX_CONFIDENCE: u8 = 100;

/// Bytes of the BLAKE3 digest kept as the Tier-1 fingerprint (128 bits).
pub const FINGERPRINT_BYTES: usize = 16;

pub const VECTOR_INDEX_FILENAME: &str = "vector_index.bin";
pub const METADATA_FILENAME: &str = "metadata.json";
pub const EXACT_MATCH_FILENAME: &str = "l1_cache.json";

/// Converts a cosine similarity into the 0–100 confidence scale.
///
/// Negative similarities map to 0.
#[inline]
pub fn similarity_to_confidence(similarity: f32) -> u8 {
    (similarity.clamp(0.0, 1.0) * f32::from(MAX_CONFIDENCE)).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_similarity_to_confidence_rounds() {
        assert_eq!(similarity_to_confidence(0.97), 97);
        assert_eq!(similarity_to_confidence(0.951), 95);
        assert_eq!(similarity_to_confidence(0.968), 97);
        assert_eq!(similarity_to_confidence(0.944), 94);
        assert_eq!(similarity_to_confidence(1.0), 100);
    }

    #[test]
    fn test_similarity_to_confidence_clamps() {
        assert_eq!(similarity_to_confidence(-0.4), 0);
        assert_eq!(similarity_to_confidence(1.2), 100);
    }

    #[test]
    fn test_defaults_are_consistent() {
        assert!(DEFAULT_RERANK_CANDIDATES <= DEFAULT_L2_TOP_K);
        assert!(DEFAULT_NEAR_TIE_SCAN_DEPTH <= DEFAULT_L2_TOP_K);
        assert!(DEFAULT_NEAR_TIE_MIN_CONFIDENCE >= DEFAULT_ALTERNATIVE_MIN_CONFIDENCE);
    }
}
