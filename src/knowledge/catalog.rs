use std::sync::Arc;

use super::entry::KnowledgeEntry;

/// Read-only metadata table resolving vector-index ordinals to entries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntryCatalog {
    entries: Arc<[KnowledgeEntry]>,
}

impl EntryCatalog {
    /// Builds the catalog; entries are ordered by ordinal and later duplicates are dropped.
    pub fn new(mut entries: Vec<KnowledgeEntry>) -> Self {
        entries.sort_by_key(|e| e.ordinal);
        entries.dedup_by_key(|e| e.ordinal);
        Self {
            entries: entries.into(),
        }
    }

    #[inline]
    pub fn get(&self, ordinal: u32) -> Option<&KnowledgeEntry> {
        self.entries
            .binary_search_by_key(&ordinal, |e| e.ordinal)
            .ok()
            .map(|i| &self.entries[i])
    }

    #[inline]
    pub fn contains(&self, ordinal: u32) -> bool {
        self.get(ordinal).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ordinal order.
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }
}
