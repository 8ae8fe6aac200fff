//! In-memory [`Store`] implementation.
//!
//! Holds points in a map keyed by id and answers searches with a
//! brute-force cosine scan. The pipeline tests run against this instead
//! of a live Qdrant server.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Result, ScourError};
use crate::models::{Chunk, SearchHit};
use crate::store::Store;

#[derive(Debug, Clone)]
struct StoredPoint {
    vector: Vec<f32>,
    source_file: String,
    text: String,
    chunk_index: usize,
}

#[derive(Default)]
pub struct InMemoryStore {
    dims: RwLock<Option<usize>>,
    points: RwLock<HashMap<String, StoredPoint>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of stored points.
    pub async fn len(&self) -> usize {
        self.points.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.points.read().await.is_empty()
    }

    /// `(id, chunk_index)` pairs stored for `source_file`, ordered by
    /// chunk index.
    pub async fn records_for(&self, source_file: &str) -> Vec<(String, usize)> {
        let points = self.points.read().await;
        let mut records: Vec<(String, usize)> = points
            .iter()
            .filter(|(_, point)| point.source_file == source_file)
            .map(|(id, point)| (id.clone(), point.chunk_index))
            .collect();
        records.sort_by_key(|(_, chunk_index)| *chunk_index);
        records
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ensure_collection(&self, dims: usize) -> Result<()> {
        let mut slot = self.dims.write().await;
        if let Some(existing) = *slot {
            if existing != dims {
                return Err(ScourError::VectorStore(format!(
                    "collection has {existing} dims, requested {dims}"
                )));
            }
            return Ok(());
        }
        *slot = Some(dims);
        Ok(())
    }

    async fn delete_by_source(&self, source_file: &str) -> Result<()> {
        self.points
            .write()
            .await
            .retain(|_, point| point.source_file != source_file);
        Ok(())
    }

    async fn upsert(&self, id: &str, vector: &[f32], chunk: &Chunk) -> Result<()> {
        self.points.write().await.insert(
            id.to_string(),
            StoredPoint {
                vector: vector.to_vec(),
                source_file: chunk.source_file.clone(),
                text: chunk.text.clone(),
                chunk_index: chunk.chunk_index,
            },
        );
        Ok(())
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        let points = self.points.read().await;
        let mut hits: Vec<SearchHit> = points
            .values()
            .map(|point| SearchHit {
                score: cosine(vector, &point.vector),
                source_file: point.source_file.clone(),
                text: point.text.clone(),
                chunk_index: Some(point.chunk_index),
            })
            .collect();
        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        hits.truncate(limit);
        Ok(hits)
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(source_file: &str, chunk_index: usize, text: &str) -> Chunk {
        Chunk {
            source_file: source_file.to_string(),
            chunk_index,
            text: text.to_string(),
        }
    }

    #[tokio::test]
    async fn delete_is_scoped_to_one_file() {
        let store = InMemoryStore::new();
        store.upsert("a0", &[1.0, 0.0], &chunk("a.rs", 0, "a")).await.unwrap();
        store.upsert("a1", &[0.0, 1.0], &chunk("a.rs", 1, "aa")).await.unwrap();
        store.upsert("b0", &[1.0, 1.0], &chunk("b.rs", 0, "b")).await.unwrap();

        store.delete_by_source("a.rs").await.unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(store.records_for("b.rs").await, vec![("b0".to_string(), 0)]);
    }

    #[tokio::test]
    async fn upsert_overwrites_existing_id() {
        let store = InMemoryStore::new();
        store.upsert("a0", &[1.0, 0.0], &chunk("a.rs", 0, "old")).await.unwrap();
        store.upsert("a0", &[0.0, 1.0], &chunk("a.rs", 0, "new")).await.unwrap();
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn search_orders_by_cosine_similarity() {
        let store = InMemoryStore::new();
        store.upsert("a0", &[1.0, 0.0], &chunk("a.rs", 0, "aligned")).await.unwrap();
        store.upsert("b0", &[0.0, 1.0], &chunk("b.rs", 0, "orthogonal")).await.unwrap();
        store.upsert("c0", &[1.0, 1.0], &chunk("c.rs", 0, "diagonal")).await.unwrap();

        let hits = store.search(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source_file, "a.rs");
        assert_eq!(hits[1].source_file, "c.rs");
    }

    #[tokio::test]
    async fn ensure_collection_rejects_dims_change() {
        let store = InMemoryStore::new();
        store.ensure_collection(3).await.unwrap();
        store.ensure_collection(3).await.unwrap();
        assert!(store.ensure_collection(4).await.is_err());
    }
}
