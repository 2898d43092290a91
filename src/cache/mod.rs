//! Resolution tiers: L1 exact match, L2 semantic search, and the orchestrator that escalates
//! to L3 arbitration.

pub mod l1;
pub mod l2;
pub mod tiered;
pub mod types;

#[cfg(test)]
mod l1_tests;

pub use l1::{ExactMatchEntry, ExactMatchStore};
pub use l2::{
    IndexHit, L2CacheError, L2CacheResult, L2Config, L2LookupResult, L2SemanticCache,
    VectorIndex, VectorIndexError, VectorIndexResult,
};
pub use tiered::{ResolverConfig, TieredResolver};
pub use types::{Hint, Route};
