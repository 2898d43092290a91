//! Strict validation of the arbiter's ranking.
//!
//! The model output is untrusted: it is either a well-formed ranking or a
//! [`RerankFailure`]. Individual items that reference an unknown candidate or carry an
//! out-of-scale confidence are dropped; structural problems reject the whole response.

use std::collections::HashSet;

use serde::Deserialize;
use tracing::warn;

use crate::constants::MAX_CONFIDENCE;

use super::error::RerankFailure;
use super::types::RankingItem;

const FENCE: &str = "```";

#[derive(Debug, Deserialize)]
struct RawRanking {
    ranking: Vec<RawItem>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    candidate: i64,
    confidence: i64,
    #[serde(default)]
    reason: Option<String>,
}

/// Returns the payload inside the first code fence, or the whole text when unfenced.
///
/// A language tag right after the opening fence (```` ```json ````) is dropped.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find(FENCE) else {
        return trimmed;
    };

    let body = &trimmed[start + FENCE.len()..];
    let body = body.trim_start_matches(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    let body = match body.find(FENCE) {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

/// Parses a ranking over `candidate_count` candidates.
///
/// Surviving items are stably sorted by descending confidence; duplicate references keep
/// their first occurrence.
pub fn parse_ranking(raw: &str, candidate_count: usize) -> Result<Vec<RankingItem>, RerankFailure> {
    let payload = strip_code_fences(raw);
    let parsed: RawRanking =
        serde_json::from_str(payload).map_err(|e| RerankFailure::Malformed {
            reason: e.to_string(),
        })?;

    if parsed.ranking.is_empty() {
        return Err(RerankFailure::EmptyRanking);
    }

    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(parsed.ranking.len());
    for raw_item in parsed.ranking {
        let in_range = raw_item.candidate >= 1 && raw_item.candidate as u64 <= candidate_count as u64;
        if !in_range {
            warn!(
                candidate = raw_item.candidate,
                candidate_count, "Ranking item references unknown candidate, discarding"
            );
            continue;
        }
        let Ok(confidence) = u8::try_from(raw_item.confidence) else {
            warn!(confidence = raw_item.confidence, "Ranking confidence off scale, discarding");
            continue;
        };
        if confidence > MAX_CONFIDENCE {
            warn!(confidence, "Ranking confidence off scale, discarding");
            continue;
        }

        let position = (raw_item.candidate - 1) as usize;
        if !seen.insert(position) {
            warn!(candidate = raw_item.candidate, "Duplicate ranking item, discarding");
            continue;
        }

        items.push(RankingItem {
            position,
            confidence,
            reason: raw_item.reason.filter(|r| !r.trim().is_empty()),
        });
    }

    if items.is_empty() {
        return Err(RerankFailure::NoValidItems);
    }

    items.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    Ok(items)
}
