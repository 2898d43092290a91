//! Chat-completion capability used by the arbiter.

use std::future::Future;
use std::time::Duration;

use async_openai::types::chat::CreateChatCompletionRequest;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::constants::{
    DEFAULT_LLM_MAX_TOKENS, DEFAULT_LLM_MODEL, DEFAULT_LLM_TEMPERATURE, DEFAULT_REQUEST_TIMEOUT_MS,
};

use super::error::RerankerError;
use super::prompt::RerankPrompt;

/// Generative model that answers a [`RerankPrompt`] with raw text.
pub trait RerankCapability: Send + Sync {
    fn evaluate(
        &self,
        prompt: &RerankPrompt,
    ) -> impl Future<Output = Result<String, RerankerError>> + Send;

    /// `false` when the capability was never configured.
    fn is_ready(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            api_key: None,
            model: DEFAULT_LLM_MODEL.to_string(),
            temperature: DEFAULT_LLM_TEMPERATURE,
            max_tokens: DEFAULT_LLM_MAX_TOKENS,
            timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

impl ChatConfig {
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

    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }

    pub fn validate(&self) -> Result<(), RerankerError> {
        let base = self.api_base.trim();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(RerankerError::InvalidConfig {
                reason: format!("api_base must be an http(s) URL, got '{}'", base),
            });
        }
        if self.model.trim().is_empty() {
            return Err(RerankerError::InvalidConfig {
                reason: "model must not be empty".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(RerankerError::InvalidConfig {
                reason: format!("temperature must be in [0, 2], got {}", self.temperature),
            });
        }
        if self.max_tokens == 0 || self.timeout.is_zero() {
            return Err(RerankerError::InvalidConfig {
                reason: "max_tokens and timeout must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

/// [`RerankCapability`] backed by an OpenAI-compatible `/chat/completions` endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionCapability {
    client: Client,
    config: ChatConfig,
}

impl ChatCompletionCapability {
    pub fn new(config: ChatConfig) -> Result<Self, RerankerError> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Builds the typed request body for `prompt`.
    pub fn request_for(&self, prompt: &RerankPrompt) -> Result<CreateChatCompletionRequest, RerankerError> {
        let body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                { "role": "system", "content": prompt.system },
                { "role": "user", "content": prompt.user },
            ],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });
        serde_json::from_value(body).map_err(|e| RerankerError::InvalidConfig {
            reason: format!("cannot build completion request: {}", e),
        })
    }
}

impl RerankCapability for ChatCompletionCapability {
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.user.len()))]
    async fn evaluate(&self, prompt: &RerankPrompt) -> Result<String, RerankerError> {
        let request = self.request_for(prompt)?;

        let mut call = self.client.post(self.config.endpoint()).json(&request);
        if let Some(key) = &self.config.api_key {
            call = call.bearer_auth(key);
        }

        let response = call.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RerankerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json().await?;
        let content = extract_message_content(&json)?;
        debug!(content_len = content.len(), "Completion received");
        Ok(content)
    }
}

/// `choices[0].message.content`, tolerating extra fields from non-OpenAI servers.
pub(crate) fn extract_message_content(json: &Value) -> Result<String, RerankerError> {
    json.get("choices")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .map(|s| s.trim().to_string())
        .ok_or_else(|| RerankerError::InvalidResponse {
            reason: "missing choices[0].message.content".to_string(),
        })
}
