//! Tier-1 exact-match store.
//!
//! Keys are the 128-bit BLAKE3 fingerprint of the normalized question (see
//! [`crate::hashing`]). The store is built offline from the knowledge base and is read-only
//! while serving, so it is shared across requests through an `Arc` without locking.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::hashing::{fingerprint_hex, hash_normalized, normalize};
use crate::knowledge::KnowledgeEntry;

/// A precomputed Tier-1 answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExactMatchEntry {
    pub normalized_key_hash: String,
    pub question: String,
    pub normalized_question: String,
    pub template: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub keywords: String,
    /// Dataset row the entry came from.
    #[serde(default)]
    pub ordinal: u32,
}

impl ExactMatchEntry {
    /// Derives the store entry for `entry`; `None` when the question normalizes to nothing.
    pub fn from_knowledge(entry: &KnowledgeEntry) -> Option<Self> {
        let normalized_question = normalize(&entry.question);
        if normalized_question.is_empty() {
            return None;
        }
        Some(Self {
            normalized_key_hash: fingerprint_hex(&hash_normalized(&normalized_question)),
            question: entry.question.clone(),
            normalized_question,
            template: entry.template.clone(),
            category: entry.category.clone(),
            subcategory: entry.subcategory.clone(),
            keywords: entry.keywords.clone(),
            ordinal: entry.ordinal,
        })
    }

    pub fn to_knowledge(&self) -> KnowledgeEntry {
        KnowledgeEntry::new(self.ordinal, self.question.clone(), self.template.clone())
            .with_category(self.category.clone(), self.subcategory.clone())
            .with_keywords(self.keywords.clone())
    }
}

/// Fingerprint → entry map. Serializes as a JSON object with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExactMatchStore {
    entries: BTreeMap<String, ExactMatchEntry>,
}

impl ExactMatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the store from knowledge entries in order.
    ///
    /// Entries sharing a fingerprint overwrite earlier ones (last write wins).
    pub fn build<'a>(entries: impl IntoIterator<Item = &'a KnowledgeEntry>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            if !entry.is_indexable() {
                continue;
            }
            match ExactMatchEntry::from_knowledge(entry) {
                Some(exact) => store.insert(exact),
                None => warn!(
                    ordinal = entry.ordinal,
                    "Question normalizes to empty key; not added to exact-match store"
                ),
            }
        }
        debug!(entries = store.len(), "Exact-match store built");
        store
    }

    /// Inserts under the entry's own fingerprint, replacing any previous entry.
    pub fn insert(&mut self, entry: ExactMatchEntry) {
        if let Some(previous) = self.entries.insert(entry.normalized_key_hash.clone(), entry) {
            debug!(
                replaced_ordinal = previous.ordinal,
                "Duplicate normalized question replaced"
            );
        }
    }

    /// Looks up `question` by normalizing and fingerprinting it. No fuzzy matching.
    #[inline]
    pub fn lookup(&self, question: &str) -> Option<&ExactMatchEntry> {
        let normalized = normalize(question);
        if normalized.is_empty() {
            return None;
        }
        self.lookup_by_fingerprint(&fingerprint_hex(&hash_normalized(&normalized)))
    }

    #[inline]
    pub fn lookup_by_fingerprint(&self, fingerprint: &str) -> Option<&ExactMatchEntry> {
        self.entries.get(fingerprint)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in fingerprint order.
    pub fn iter(&self) -> impl Iterator<Item = &ExactMatchEntry> {
        self.entries.values()
    }
}
