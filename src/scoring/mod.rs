//! Tier-3 arbitration by a generative model.
//!
//! [`RerankArbiter`] sends the top Tier-2 candidates to a [`RerankCapability`] as a structured
//! evaluation request and validates the ranking it returns.
//!
//! # Untrusted Output
//!
//! The model's answer is parsed as a strict schema (see [`parser`]): a JSON object with a
//! `ranking` array of `{candidate, confidence, reason}` items, optionally wrapped in a code
//! fence. Anything structurally off is a [`RerankFailure`], and the orchestrator degrades the
//! request to a zero-confidence Hint. The arbiter never substitutes the highest-similarity
//! candidate for a missing ranking.

pub mod arbiter;
pub mod capability;
pub mod error;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod parser;
pub mod prompt;
pub mod types;


pub use arbiter::RerankArbiter;
pub use capability::{ChatCompletionCapability, ChatConfig, RerankCapability};
pub use error::{RerankFailure, RerankerError};
#[cfg(any(test, feature = "mock"))]
pub use mock::MockRerankCapability;
pub use prompt::RerankPrompt;
pub use types::{RankedResult, RankingItem};
