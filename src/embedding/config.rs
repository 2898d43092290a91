use std::time::Duration;

use crate::constants::{DEFAULT_EMBEDDING_MODEL, DEFAULT_REQUEST_TIMEOUT_MS};
use crate::embedding::error::EmbeddingError;

#[derive(Debug, Clone)]
/// Configuration for [`HttpEmbedder`](super::HttpEmbedder).
pub struct EmbeddingConfig {
    /// Base URL of an OpenAI-compatible API (e.g. `https://host/v1`).
    pub api_base: String,
    /// Bearer token, if the service requires one.
    pub api_key: Option<String>,
    /// Model name sent with every request.
    pub model: String,
    pub timeout: Duration,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: None,
            model: DEFAULT_EMBEDDING_MODEL.to_string(),
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl EmbeddingConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into(),
            ..Default::default()
        }
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key.filter(|k| !k.trim().is_empty());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the embeddings endpoint.
    pub fn endpoint(&self) -> String {
        format!("{}/embeddings", self.api_base.trim_end_matches('/'))
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        let base = self.api_base.trim();
        if base.is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "api_base must not be empty".to_string(),
            });
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!("api_base must be an http(s) URL, got '{}'", base),
            });
        }
        if self.model.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model must not be empty".to_string(),
            });
        }
        if self.timeout.is_zero() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = EmbeddingConfig::new("http://localhost:8080/v1/");
        assert_eq!(config.endpoint(), "http://localhost:8080/v1/embeddings");
    }

    #[test]
    fn test_validate() {
        assert!(EmbeddingConfig::new("http://localhost/v1").validate().is_ok());
        assert!(EmbeddingConfig::new("").validate().is_err());
        assert!(EmbeddingConfig::new("localhost/v1").validate().is_err());
        assert!(
            EmbeddingConfig::new("http://localhost/v1")
                .with_model(" ")
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_blank_api_key_dropped() {
        let config = EmbeddingConfig::new("http://x").with_api_key(Some("  ".into()));
        assert!(config.api_key.is_none());
    }
}
