//! Vector storage.
//!
//! [`Store`] covers the four operations the pipelines need: collection
//! bootstrap, filtered delete by `source_file`, upsert-by-id, and
//! nearest-neighbor search. [`QdrantStore`] talks to a Qdrant server over
//! its REST API; [`InMemoryStore`] is a brute-force implementation the
//! test suite runs the pipelines against.

pub mod memory;
pub mod qdrant;

pub use memory::InMemoryStore;
pub use qdrant::QdrantStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Chunk, SearchHit};

#[async_trait]
pub trait Store: Send + Sync {
    /// Create the collection if it does not exist yet.
    ///
    /// Idempotent; safe to call on every run. An existing collection is
    /// never recreated — schema changes require manual migration.
    async fn ensure_collection(&self, dims: usize) -> Result<()>;

    /// Delete every point whose `source_file` payload equals `source_file`.
    ///
    /// Scoped: points belonging to other files are untouched.
    async fn delete_by_source(&self, source_file: &str) -> Result<()>;

    /// Insert or overwrite a single chunk's point.
    async fn upsert(&self, id: &str, vector: &[f32], chunk: &Chunk) -> Result<()>;

    /// Nearest-neighbor search, payloads included, ordered by descending
    /// similarity score.
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<SearchHit>>;
}
