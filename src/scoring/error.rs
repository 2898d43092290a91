use thiserror::Error;

/// Transport-level errors from a rerank capability.
#[derive(Debug, Error)]
pub enum RerankerError {
    #[error("rerank request failed: {reason}")]
    Request { reason: String },

    #[error("rerank service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid completion response: {reason}")]
    InvalidResponse { reason: String },

    #[error("rerank capability not available")]
    NotAvailable,

    #[error("invalid rerank configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<reqwest::Error> for RerankerError {
    fn from(err: reqwest::Error) -> Self {
        RerankerError::Request {
            reason: err.to_string(),
        }
    }
}

/// Why Tier 3 produced no ranking.
///
/// Every variant degrades the request to a zero-confidence Hint; none of them falls back to
/// the highest-similarity candidate.
#[derive(Debug, Error, PartialEq)]
pub enum RerankFailure {
    #[error("no candidates to rerank")]
    NoCandidates,

    #[error("rerank capability failed: {0}")]
    Transport(String),

    #[error("malformed ranking: {reason}")]
    Malformed { reason: String },

    #[error("ranking list is empty")]
    EmptyRanking,

    #[error("every ranking item was out of range")]
    NoValidItems,
}

impl From<RerankerError> for RerankFailure {
    fn from(err: RerankerError) -> Self {
        RerankFailure::Transport(err.to_string())
    }
}
