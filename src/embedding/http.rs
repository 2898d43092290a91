//! OpenAI-compatible `/embeddings` client.

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, instrument};

use super::config::EmbeddingConfig;
use super::error::{EmbeddingError, EmbeddingResult};
use super::provider::EmbeddingProvider;
use super::utils::l2_normalize;

/// Embedding provider backed by a remote embeddings endpoint.
///
/// Vectors are L2-normalized on receipt so inner product equals cosine similarity.
#[derive(Debug, Clone)]
pub struct HttpEmbedder {
    client: Client,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(config: EmbeddingConfig) -> EmbeddingResult<Self> {
        config.validate()?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &EmbeddingConfig {
        &self.config
    }

    #[instrument(skip(self, texts), fields(batch = texts.len(), model = %self.config.model))]
    async fn request(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.config.model,
            "input": texts,
        });

        let mut request = self.client.post(self.config.endpoint()).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value = response.json().await?;
        let mut vectors = parse_embedding_response(json)?;

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }
        if let Some(first) = vectors.first() {
            let dim = first.len();
            if let Some(bad) = vectors.iter().find(|v| v.len() != dim) {
                return Err(EmbeddingError::DimensionMismatch {
                    expected: dim,
                    actual: bad.len(),
                });
            }
        }

        vectors.iter_mut().for_each(|v| l2_normalize(v));
        debug!(count = vectors.len(), "Embeddings received");
        Ok(vectors)
    }
}

impl EmbeddingProvider for HttpEmbedder {
    async fn embed_one(&self, text: &str) -> EmbeddingResult<Vec<f32>> {
        let mut vectors = self.request(&[text.to_string()]).await?;
        vectors.pop().ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            actual: 0,
        })
    }

    async fn embed_many(&self, texts: &[String]) -> EmbeddingResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }
}

/// Extracts `data[*].embedding`, ordered by each item's `index`.
pub(crate) fn parse_embedding_response(json: Value) -> EmbeddingResult<Vec<Vec<f32>>> {
    let invalid = |reason: &str| EmbeddingError::InvalidResponse {
        reason: reason.to_string(),
    };

    let data = json
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| invalid("missing data array"))?;

    let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for (fallback_index, item) in data.iter().enumerate() {
        let index = item
            .get("index")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(fallback_index);
        let embedding = item
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| invalid("item missing embedding array"))?;
        let vector = embedding
            .iter()
            .map(|value| value.as_f64().map(|n| n as f32))
            .collect::<Option<Vec<f32>>>()
            .ok_or_else(|| invalid("embedding value must be numeric"))?;
        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);
    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}
