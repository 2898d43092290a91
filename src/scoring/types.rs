use crate::knowledge::Candidate;

/// Arbiter output: candidates ordered by descending confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedResult {
    /// Top-ranked candidate; its `confidence` is always set.
    pub best: Candidate,
    pub best_confidence: u8,
    /// Remaining ranked candidates, each with `confidence` set.
    pub alternatives: Vec<Candidate>,
}

impl RankedResult {
    /// Splits an ordered ranking into best + alternatives; `None` when empty.
    pub fn from_ranked(ranked: Vec<Candidate>) -> Option<Self> {
        let mut ranked = ranked.into_iter();
        let best = ranked.next()?;
        let best_confidence = best.confidence.unwrap_or(0);
        Some(Self {
            best,
            best_confidence,
            alternatives: ranked.collect(),
        })
    }

    /// Alternatives at or above `min_confidence`, at most `max`.
    pub fn alternatives_above(&self, min_confidence: u8, max: usize) -> Vec<Candidate> {
        self.alternatives
            .iter()
            .filter(|c| c.confidence.unwrap_or(0) >= min_confidence)
            .take(max)
            .cloned()
            .collect()
    }
}

/// One validated item of the arbiter's ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingItem {
    /// Zero-based position in the candidate list sent to the arbiter.
    pub position: usize,
    pub confidence: u8,
    pub reason: Option<String>,
}
