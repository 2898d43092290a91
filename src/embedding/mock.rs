//! Scriptable embedding provider for tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::error::{EmbeddingError, EmbeddingResult};
use super::provider::EmbeddingProvider;
use super::utils::l2_normalize;

/// Deterministic in-process embedder.
///
/// Texts registered with [`MockEmbedder::with_vector`] return that vector (normalized);
/// everything else gets a seeded pseudo-random unit vector of the configured dimension.
#[derive(Debug)]
pub struct MockEmbedder {
    dimension: usize,
    scripted: Mutex<HashMap<String, Vec<f32>>>,
    fail: AtomicBool,
    ready: AtomicBool,
    calls: AtomicUsize,
    texts_embedded: AtomicUsize,
}

impl MockEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            scripted: Mutex::new(HashMap::new()),
            fail: AtomicBool::new(false),
            ready: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
            texts_embedded: AtomicUsize::new(0),
        }
    }

    /// Pins the vector returned for `text`.
    pub fn with_vector(self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.set_vector(text, vector);
        self
    }

    pub fn set_vector(&self, text: impl Into<String>, vector: Vec<f32>) {
        if let Ok(mut scripted) = self.scripted.lock() {
            scripted.insert(text.into(), vector);
        }
    }

    /// Makes every subsequent call fail with a request error.
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Number of `embed_one`/`embed_many` invocations.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Total texts embedded across all calls.
    pub fn texts_embedded(&self) -> usize {
        self.texts_embedded.load(Ordering::SeqCst)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    fn vector_for(&self, text: &str) -> Vec<f32> {
        let scripted = self
            .scripted
            .lock()
            .ok()
            .and_then(|map| map.get(text).cloned());

        let mut vector = scripted.unwrap_or_else(|| self.stub_vector(text));
        l2_normalize(&mut vector);
        vector
    }

    fn stub_vector(&self, text: &str) -> Vec<f32> {
        use std::hash::{DefaultHasher, Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut state = hasher.finish();

        (0..self.dimension)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0
            })
            .collect()
    }

    fn begin_call(&self, texts: usize) -> EmbeddingResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.ready.load(Ordering::SeqCst) {
            return Err(EmbeddingError::NotAvailable);
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(EmbeddingError::Request {
                reason: "mock embedder configured to fail".to_string(),
            });
        }
        self.texts_embedded.fetch_add(texts, Ordering::SeqCst);
        Ok(())
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new(8)
    }
}

impl EmbeddingProvider for MockEmbedder {
    async fn embed_one(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        self.begin_call(1)?;
        Ok(self.vector_for(text))
    }

    async fn embed_many(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        self.begin_call(texts.len())?;
        Ok(texts.iter().map(|t| self.vector_for(t)).collect())
    }

    fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}
