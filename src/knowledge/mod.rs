//! Knowledge-base model and dataset ingestion.

pub mod catalog;
pub mod dataset;
pub mod entry;
pub mod error;

pub use catalog::EntryCatalog;
pub use dataset::{DatasetRow, DatasetSource, FileDataset};
pub use entry::{Candidate, KnowledgeEntry};
pub use error::{DatasetError, DatasetResult};
