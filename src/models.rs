//! Core data types used throughout scour.
//!
//! These types represent the chunks, search candidates, and final context
//! documents that flow through the indexing and query pipelines.

/// A contiguous slice of a file's text, the unit of embedding.
///
/// Created fresh on every (re-)indexing pass of a file and discarded once
/// its embedding and payload have been written to the vector store.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Normalized source path (forward-slash separators).
    pub source_file: String,
    /// 0-based position among this file's chunks; dense `0..n`.
    pub chunk_index: usize,
    /// Raw content of the slice.
    pub text: String,
}

/// A candidate returned by nearest-neighbor search, payload included.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub score: f32,
    pub source_file: String,
    pub text: String,
    pub chunk_index: Option<usize>,
}

/// A final result document handed to the caller after reranking.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextDocument {
    pub source_file: String,
    pub text: String,
}

impl From<&SearchHit> for ContextDocument {
    fn from(hit: &SearchHit) -> Self {
        Self {
            source_file: hit.source_file.clone(),
            text: hit.text.clone(),
        }
    }
}
