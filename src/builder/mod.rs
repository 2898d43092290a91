//! Offline index builder.
//!
//! Reads the knowledge-base dataset, embeds every question and persists the vector index,
//! entry metadata and exact-match store. Runs once before serving, or again with
//! `recreate` after the dataset changes.

pub mod error;
pub mod index_builder;
pub mod types;


pub use error::{BuildError, BuildResult};
pub use index_builder::IndexBuilder;
pub use types::{BuildOutcome, BuildReport};
