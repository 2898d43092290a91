use serde::{Deserialize, Serialize};

use crate::constants::MAX_CONFIDENCE;
use crate::knowledge::{Candidate, KnowledgeEntry};

/// Operator-facing text when a dependency is down or a tier failed outright.
pub const MESSAGE_UNAVAILABLE: &str = "Система временно недоступна. Пожалуйста, попробуйте позже.";
/// Operator-facing text when no usable answer was found.
pub const MESSAGE_NO_ANSWER: &str =
    "К сожалению, не удалось найти подходящий ответ. Пожалуйста, уточните ваш вопрос.";

pub const CATEGORY_ERROR: &str = "Ошибка";
pub const SUBCATEGORY_ERROR: &str = "Системная ошибка";
pub const CATEGORY_UNKNOWN: &str = "Неизвестно";

/// Which tier produced a [`Hint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Route {
    #[serde(rename = "L1")]
    ExactMatch,
    #[serde(rename = "L2")]
    Semantic,
    #[serde(rename = "L2 (failed)")]
    SemanticFailed,
    #[serde(rename = "L3")]
    Arbiter,
    #[serde(rename = "L3 (failed)")]
    ArbiterFailed,
    #[serde(rename = "ERROR")]
    Error,
}

impl Route {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::ExactMatch => "L1",
            Route::Semantic => "L2",
            Route::SemanticFailed => "L2 (failed)",
            Route::Arbiter => "L3",
            Route::ArbiterFailed => "L3 (failed)",
            Route::Error => "ERROR",
        }
    }

    /// `true` for routes that carry a knowledge-base answer.
    #[inline]
    pub fn is_answer(&self) -> bool {
        matches!(self, Route::ExactMatch | Route::Semantic | Route::Arbiter)
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolver's answer to one question.
///
/// Degraded outcomes still produce a Hint: confidence 0 and a localized explanatory
/// `response`, so callers never handle resolver errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hint {
    pub response: String,
    pub confidence: u8,
    pub category: String,
    pub subcategory: String,
    pub template: String,
    pub route: Route,
    pub processing_time_ms: u64,
    pub candidates_found: usize,
    #[serde(default)]
    pub alternatives: Vec<Candidate>,
}

impl Hint {
    /// A Hint answering with `entry`'s template.
    pub fn answer(route: Route, entry: &KnowledgeEntry, confidence: u8) -> Self {
        Self {
            response: entry.template.clone(),
            confidence: confidence.min(MAX_CONFIDENCE),
            category: entry.category.clone(),
            subcategory: entry.subcategory.clone(),
            template: entry.template.clone(),
            route,
            processing_time_ms: 0,
            candidates_found: 0,
            alternatives: Vec::new(),
        }
    }

    /// Zero-confidence Hint for a dependency that is down or a failed tier.
    pub fn unavailable(route: Route) -> Self {
        Self::degraded(route, MESSAGE_UNAVAILABLE, CATEGORY_ERROR, SUBCATEGORY_ERROR)
    }

    /// Zero-confidence Hint when nothing in the knowledge base fits.
    pub fn no_answer(route: Route) -> Self {
        Self::degraded(route, MESSAGE_NO_ANSWER, CATEGORY_UNKNOWN, CATEGORY_UNKNOWN)
    }

    fn degraded(route: Route, message: &str, category: &str, subcategory: &str) -> Self {
        Self {
            response: message.to_string(),
            confidence: 0,
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            template: String::new(),
            route,
            processing_time_ms: 0,
            candidates_found: 0,
            alternatives: Vec::new(),
        }
    }

    pub fn with_alternatives(mut self, alternatives: Vec<Candidate>) -> Self {
        self.alternatives = alternatives;
        self
    }

    pub fn with_candidates_found(mut self, count: usize) -> Self {
        self.candidates_found = count;
        self
    }

    pub fn with_processing_time_ms(mut self, ms: u64) -> Self {
        self.processing_time_ms = ms;
        self
    }
}
