//! Ollama embedding client.
//!
//! Wraps the embedding endpoint of a local Ollama server. Both response
//! shapes are accepted: the current `POST /api/embed` returns
//! `{"embeddings": [[f32, ...]]}` while the legacy `/api/embeddings`
//! endpoint returns `{"embedding": [f32, ...]}`.
//!
//! A missing or empty vector is a hard [`ScourError::Embedding`]: it must
//! abort the enclosing chunk's indexing (or the whole query), never be
//! substituted with a zero vector, since a zero vector would corrupt
//! similarity rankings.

use std::time::Duration;

use async_trait::async_trait;

use crate::config::ModelsConfig;
use crate::error::{Result, ScourError};

/// Anything that can turn a text into an embedding vector.
///
/// The pipelines depend on this rather than on [`EmbeddingClient`]
/// directly so the tests can substitute a deterministic embedder.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text and return its vector.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

pub struct EmbeddingClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl EmbeddingClient {
    pub fn new(config: &ModelsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScourError::Embedding(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.embedding.clone(),
        })
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embed", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": [text],
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScourError::Embedding(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ScourError::Embedding(format!(
                "embedding API error {status}: {body_text}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScourError::Embedding(format!("failed to parse response: {e}")))?;

        parse_embed_response(&json)
    }
}

/// Extract the first vector from either embedding response shape.
fn parse_embed_response(json: &serde_json::Value) -> Result<Vec<f32>> {
    let array = json
        .get("embeddings")
        .and_then(|e| e.as_array())
        .and_then(|rows| rows.first())
        .and_then(|row| row.as_array())
        .or_else(|| json.get("embedding").and_then(|e| e.as_array()))
        .ok_or_else(|| ScourError::Embedding("response contains no vector".into()))?;

    let vector: Vec<f32> = array
        .iter()
        .map(|v| {
            v.as_f64()
                .map(|f| f as f32)
                .ok_or_else(|| ScourError::Embedding("non-numeric value in vector".into()))
        })
        .collect::<Result<_>>()?;

    if vector.is_empty() {
        return Err(ScourError::Embedding("response vector is empty".into()));
    }

    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_batch_shape() {
        let json = serde_json::json!({ "embeddings": [[0.1, 0.2, 0.3]] });
        let vector = parse_embed_response(&json).unwrap();
        assert_eq!(vector.len(), 3);
        assert!((vector[0] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn parses_legacy_single_shape() {
        let json = serde_json::json!({ "embedding": [1.0, -2.0] });
        let vector = parse_embed_response(&json).unwrap();
        assert_eq!(vector, vec![1.0, -2.0]);
    }

    #[test]
    fn batch_shape_selects_first_vector() {
        let json = serde_json::json!({ "embeddings": [[1.0], [2.0]] });
        let vector = parse_embed_response(&json).unwrap();
        assert_eq!(vector, vec![1.0]);
    }

    #[test]
    fn missing_vector_is_error() {
        let json = serde_json::json!({ "model": "nomic-embed-text" });
        assert!(parse_embed_response(&json).is_err());
    }

    #[test]
    fn empty_vector_is_error() {
        let json = serde_json::json!({ "embeddings": [[]] });
        assert!(parse_embed_response(&json).is_err());
    }

    #[test]
    fn empty_batch_is_error() {
        let json = serde_json::json!({ "embeddings": [] });
        assert!(parse_embed_response(&json).is_err());
    }

    #[test]
    fn non_numeric_value_is_error() {
        let json = serde_json::json!({ "embedding": [0.5, "oops"] });
        assert!(parse_embed_response(&json).is_err());
    }
}
