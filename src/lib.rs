//! # scour
//!
//! Local semantic code search over a source tree.
//!
//! scour scans a directory, splits matching files into overlapping text
//! chunks, embeds each chunk with a local Ollama model, and stores the
//! vectors in a Qdrant collection keyed by file path and chunk position.
//! Queries run the two-stage retrieval pipeline: embedding similarity
//! search for a candidate set, then a generative reranking pass that
//! picks the most relevant chunks to print as context.
//!
//! ## Architecture
//!
//! ```text
//! indexing:  walk → chunk → identity → embed ─▶ Qdrant (delete → upsert)
//! query:     embed → Qdrant kNN → rerank (LLM) → context
//! ```
//!
//! ## Quick start
//!
//! ```bash
//! scour index                   # embed the configured file set
//! scour query how are chunks stored
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Error taxonomy |
//! | [`chunk`] | Offset-based text chunking |
//! | [`identity`] | Chunk identifier schemes |
//! | [`embedding`] | Ollama embedding client |
//! | [`rerank`] | Generative reranking |
//! | [`store`] | Vector storage (Qdrant REST, in-memory) |
//! | [`walk`] | File traversal and glob filtering |
//! | [`index`] | Indexing pipeline |
//! | [`retrieve`] | Query pipeline |

pub mod chunk;
pub mod config;
pub mod embedding;
pub mod error;
pub mod identity;
pub mod index;
pub mod models;
pub mod rerank;
pub mod retrieve;
pub mod store;
pub mod walk;
