//! Scripted rerank capability for tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::capability::RerankCapability;
use super::error::RerankerError;
use super::prompt::RerankPrompt;

/// Replays queued responses; once the queue is drained the last response repeats.
#[derive(Debug, Default)]
pub struct MockRerankCapability {
    responses: Mutex<VecDeque<Result<String, String>>>,
    last: Mutex<Option<Result<String, String>>>,
    prompts: Mutex<Vec<RerankPrompt>>,
    not_ready: AtomicBool,
    calls: AtomicUsize,
}

impl MockRerankCapability {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answers with `raw`.
    pub fn responding(raw: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.push_response(raw);
        mock
    }

    /// Always fails at the transport level.
    pub fn failing(reason: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.push_failure(reason);
        mock
    }

    pub fn push_response(&self, raw: impl Into<String>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Ok(raw.into()));
        }
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Err(reason.into()));
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.not_ready.store(!ready, Ordering::SeqCst);
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<RerankPrompt> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn next_response(&self) -> Option<Result<String, String>> {
        let queued = self.responses.lock().ok()?.pop_front();
        let mut last = self.last.lock().ok()?;
        if let Some(response) = queued {
            *last = Some(response);
        }
        last.clone()
    }
}

impl RerankCapability for MockRerankCapability {
    async fn evaluate(&self, prompt: &RerankPrompt) -> Result<String, RerankerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        if !self.is_ready() {
            return Err(RerankerError::NotAvailable);
        }

        match self.next_response() {
            Some(Ok(raw)) => Ok(raw),
            Some(Err(reason)) => Err(RerankerError::Request { reason }),
            None => Err(RerankerError::InvalidResponse {
                reason: "no scripted response".to_string(),
            }),
        }
    }

    fn is_ready(&self) -> bool {
        !self.not_ready.load(Ordering::SeqCst)
    }
}
