use serde::{Deserialize, Serialize};

/// One row of the support knowledge base.
///
/// `ordinal` is the row position in the source dataset and the key linking a vector in the
/// index back to this entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    pub ordinal: u32,
    pub question: String,
    pub template: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub subcategory: String,
    #[serde(default)]
    pub keywords: String,
}

impl KnowledgeEntry {
    /// Creates an entry with empty classification fields.
    pub fn new(ordinal: u32, question: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            ordinal,
            question: question.into(),
            template: template.into(),
            category: String::new(),
            subcategory: String::new(),
            keywords: String::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>, subcategory: impl Into<String>) -> Self {
        self.category = category.into();
        self.subcategory = subcategory.into();
        self
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// Entries without a question or a template never enter the index or the store.
    pub fn is_indexable(&self) -> bool {
        !self.question.trim().is_empty() && !self.template.trim().is_empty()
    }
}

/// A knowledge entry surfaced by Tier 2 and, optionally, judged by Tier 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(flatten)]
    pub entry: KnowledgeEntry,
    /// Cosine similarity to the query, in `[-1, 1]`.
    pub similarity: f32,
    /// Calibrated 0–100 confidence, once assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
    /// Arbiter rationale, when Tier 3 produced one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl Candidate {
    pub fn new(entry: KnowledgeEntry, similarity: f32) -> Self {
        Self {
            entry,
            similarity,
            confidence: None,
            rationale: None,
        }
    }

    pub fn with_confidence(mut self, confidence: u8) -> Self {
        self.confidence = Some(confidence);
        self
    }

    pub fn with_rationale(mut self, rationale: impl Into<String>) -> Self {
        let rationale = rationale.into();
        self.rationale = (!rationale.trim().is_empty()).then_some(rationale);
        self
    }

    #[inline]
    pub fn ordinal(&self) -> u32 {
        self.entry.ordinal
    }
}
