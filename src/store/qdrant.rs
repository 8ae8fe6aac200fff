//! Qdrant REST client.
//!
//! Thin wrapper mapping each [`Store`] operation onto one Qdrant REST
//! call. Every call carries the configured request timeout; any failure
//! maps to [`ScourError::VectorStore`].

use std::time::Duration;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::error::{Result, ScourError};
use crate::models::{Chunk, SearchHit};
use crate::store::Store;

pub struct QdrantStore {
    client: reqwest::Client,
    base_url: String,
    collection: String,
}

impl QdrantStore {
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScourError::VectorStore(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

#[async_trait]
impl Store for QdrantStore {
    async fn ensure_collection(&self, dims: usize) -> Result<()> {
        let url = format!("{}/collections/{}", self.base_url, self.collection);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ScourError::VectorStore(format!("request failed: {e}")))?;

        if response.status().is_success() {
            return Ok(());
        }
        if response.status() != reqwest::StatusCode::NOT_FOUND {
            let status = response.status();
            let body_text = response.text().await.unwrap_or_default();
            return Err(ScourError::VectorStore(format!(
                "collection lookup failed {status}: {body_text}"
            )));
        }

        let body = serde_json::json!({
            "vectors": { "size": dims, "distance": "Cosine" },
        });
        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScourError::VectorStore(format!("request failed: {e}")))?;

        check_status(response, "create collection").await?;
        Ok(())
    }

    async fn delete_by_source(&self, source_file: &str) -> Result<()> {
        let url = format!(
            "{}/collections/{}/points/delete?wait=true",
            self.base_url, self.collection
        );
        let body = serde_json::json!({
            "filter": {
                "must": [
                    { "key": "source_file", "match": { "value": source_file } },
                ],
            },
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScourError::VectorStore(format!("request failed: {e}")))?;

        check_status(response, "delete points").await?;
        Ok(())
    }

    async fn upsert(&self, id: &str, vector: &[f32], chunk: &Chunk) -> Result<()> {
        let url = format!(
            "{}/collections/{}/points?wait=true",
            self.base_url, self.collection
        );
        let body = upsert_body(id, vector, chunk);

        let response = self
            .client
            .put(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScourError::VectorStore(format!("request failed: {e}")))?;

        check_status(response, "upsert point").await?;
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let url = format!(
            "{}/collections/{}/points/search",
            self.base_url, self.collection
        );
        let body = serde_json::json!({
            "vector": vector,
            "limit": limit,
            "with_payload": true,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScourError::VectorStore(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ScourError::VectorStore(format!(
                "search failed {status}: {body_text}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScourError::VectorStore(format!("failed to parse response: {e}")))?;

        parse_search_response(&json)
    }
}

async fn check_status(response: reqwest::Response, operation: &str) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let body_text = response.text().await.unwrap_or_default();
    Err(ScourError::VectorStore(format!(
        "{operation} failed {status}: {body_text}"
    )))
}

fn upsert_body(id: &str, vector: &[f32], chunk: &Chunk) -> serde_json::Value {
    serde_json::json!({
        "points": [{
            "id": id,
            "vector": vector,
            "payload": {
                "source_file": chunk.source_file,
                "text": chunk.text,
                "chunk_index": chunk.chunk_index,
            },
        }],
    })
}

fn parse_search_response(json: &serde_json::Value) -> Result<Vec<SearchHit>> {
    let results = json
        .get("result")
        .and_then(|r| r.as_array())
        .ok_or_else(|| ScourError::VectorStore("search response missing result array".into()))?;

    let mut hits = Vec::with_capacity(results.len());
    for item in results {
        let payload = item.get("payload");
        hits.push(SearchHit {
            score: item.get("score").and_then(|s| s.as_f64()).unwrap_or(0.0) as f32,
            source_file: payload
                .and_then(|p| p.get("source_file"))
                .and_then(|s| s.as_str())
                .unwrap_or_default()
                .to_string(),
            text: payload
                .and_then(|p| p.get("text"))
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string(),
            chunk_index: payload
                .and_then(|p| p.get("chunk_index"))
                .and_then(|i| i.as_u64())
                .map(|i| i as usize),
        });
    }

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_body_carries_id_vector_and_payload() {
        let chunk = Chunk {
            source_file: "src/a.rs".into(),
            chunk_index: 2,
            text: "fn main() {}".into(),
        };
        let body = upsert_body("abc-123", &[0.5, 0.25], &chunk);
        let point = &body["points"][0];
        assert_eq!(point["id"], "abc-123");
        assert_eq!(point["vector"][1], 0.25);
        assert_eq!(point["payload"]["source_file"], "src/a.rs");
        assert_eq!(point["payload"]["chunk_index"], 2);
        assert_eq!(point["payload"]["text"], "fn main() {}");
    }

    #[test]
    fn parses_search_results_in_order() {
        let json = serde_json::json!({
            "result": [
                { "id": "a", "score": 0.9,
                  "payload": { "source_file": "src/a.rs", "text": "alpha", "chunk_index": 0 } },
                { "id": "b", "score": 0.4,
                  "payload": { "source_file": "src/b.rs", "text": "beta", "chunk_index": 3 } },
            ],
        });
        let hits = parse_search_response(&json).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source_file, "src/a.rs");
        assert!((hits[0].score - 0.9).abs() < 1e-6);
        assert_eq!(hits[1].chunk_index, Some(3));
    }

    #[test]
    fn empty_result_array_yields_no_hits() {
        let json = serde_json::json!({ "result": [] });
        assert!(parse_search_response(&json).unwrap().is_empty());
    }

    #[test]
    fn missing_result_array_is_error() {
        let json = serde_json::json!({ "status": "ok" });
        assert!(parse_search_response(&json).is_err());
    }

    #[test]
    fn hit_without_payload_defaults_fields() {
        let json = serde_json::json!({ "result": [{ "id": "a", "score": 0.1 }] });
        let hits = parse_search_response(&json).unwrap();
        assert_eq!(hits[0].source_file, "");
        assert_eq!(hits[0].chunk_index, None);
    }
}
