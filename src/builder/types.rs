use std::fmt;

use crate::storage::KnowledgeBase;

/// Totals for one build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildReport {
    pub rows_read: usize,
    /// Rows dropped for lacking a question or a template.
    pub rows_skipped: usize,
    pub vectors: usize,
    pub dimension: usize,
    pub exact_matches: usize,
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rows read: {}, skipped: {}, vectors: {} (dim {}), exact-match keys: {}",
            self.rows_read, self.rows_skipped, self.vectors, self.dimension, self.exact_matches
        )
    }
}

#[derive(Debug, Clone)]
pub enum BuildOutcome {
    /// Artifacts were written; the knowledge base is ready to serve.
    Built {
        report: BuildReport,
        knowledge: KnowledgeBase,
    },
    /// Artifacts already existed and no rebuild was requested.
    Skipped { reason: String },
}

impl BuildOutcome {
    pub fn report(&self) -> Option<&BuildReport> {
        match self {
            BuildOutcome::Built { report, .. } => Some(report),
            BuildOutcome::Skipped { .. } => None,
        }
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, BuildOutcome::Skipped { .. })
    }
}
