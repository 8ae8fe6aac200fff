//! Indexing pipeline orchestration.
//!
//! Coordinates the full index flow for each file: scoped delete of the
//! file's stale points, read, chunk, then embed + upsert one chunk at a
//! time in increasing index order. The delete-before-insert ordering is
//! what keeps the collection free of stale and duplicate records, so
//! chunks of one file are never processed concurrently.

use anyhow::Result;

use crate::chunk::chunk_text;
use crate::config::Config;
use crate::embedding::{Embedder, EmbeddingClient};
use crate::error::ScourError;
use crate::identity::IdentityScheme;
use crate::store::{QdrantStore, Store};
use crate::walk;

#[derive(Debug, Default)]
pub struct IndexStats {
    pub files_indexed: u64,
    pub files_skipped: u64,
    pub files_failed: u64,
    pub chunks_written: u64,
    pub chunk_failures: u64,
}

pub async fn run_index(config: &Config, dry_run: bool) -> Result<()> {
    let files = walk::scan_files(&config.files)?;

    if dry_run {
        let mut total_chunks = 0usize;
        let mut files_failed = 0u64;
        for file in &files {
            let content = match std::fs::read_to_string(&file.path) {
                Ok(content) => content,
                Err(e) => {
                    // Same warning and counting as a real run, so the
                    // dry-run totals predict what the run would do.
                    let err = ScourError::Traversal {
                        path: file.path.clone(),
                        source: e,
                    };
                    eprintln!("warning: {err}");
                    files_failed += 1;
                    continue;
                }
            };
            if content.trim().is_empty() {
                continue;
            }
            total_chunks +=
                chunk_text(&file.source_file, &content, config.chunking.size, config.chunking.overlap)?
                    .len();
        }
        eprintln!("index (dry-run)");
        eprintln!("  files found: {}", files.len());
        eprintln!("  files failed: {files_failed}");
        eprintln!("  estimated chunks: {total_chunks}");
        return Ok(());
    }

    let store = QdrantStore::new(&config.store)?;
    let embedder = EmbeddingClient::new(&config.models)?;
    let identity = IdentityScheme::from_name(&config.index.identity)?;

    store.ensure_collection(config.store.dims).await?;

    let mut stats = IndexStats::default();

    for file in &files {
        let content = match std::fs::read_to_string(&file.path) {
            Ok(content) => content,
            Err(e) => {
                // Traversal failure: skip this file, keep going.
                let err = ScourError::Traversal {
                    path: file.path.clone(),
                    source: e,
                };
                eprintln!("warning: {err}");
                stats.files_failed += 1;
                continue;
            }
        };

        if content.trim().is_empty() {
            stats.files_skipped += 1;
            continue;
        }

        match index_file(config, &store, &embedder, identity, &file.source_file, &content).await {
            Ok((written, failed)) => {
                stats.files_indexed += 1;
                stats.chunks_written += written;
                stats.chunk_failures += failed;
            }
            Err(e) => {
                // The precedent delete failed; re-inserting on top of
                // un-deleted points would duplicate, so this file is
                // abandoned until the next run.
                eprintln!("warning: skipping {}: {e}", file.source_file);
                stats.files_failed += 1;
            }
        }
    }

    eprintln!("index {}", store.collection());
    eprintln!("  files indexed: {}", stats.files_indexed);
    eprintln!("  files skipped (empty): {}", stats.files_skipped);
    eprintln!("  files failed: {}", stats.files_failed);
    eprintln!("  chunks written: {}", stats.chunks_written);
    eprintln!("  chunk failures: {}", stats.chunk_failures);

    Ok(())
}

/// Re-index one file's content.
///
/// Deletes the file's existing points first; a delete failure aborts the
/// file (hard precondition). Per-chunk embedding or upsert failures are
/// logged and counted but do not stop the remaining chunks — the file is
/// simply left short until a later successful re-index.
///
/// Returns `(chunks_written, chunk_failures)`.
pub async fn index_file(
    config: &Config,
    store: &dyn Store,
    embedder: &dyn Embedder,
    identity: IdentityScheme,
    source_file: &str,
    content: &str,
) -> std::result::Result<(u64, u64), ScourError> {
    store.delete_by_source(source_file).await?;

    let chunks = chunk_text(source_file, content, config.chunking.size, config.chunking.overlap)?;

    let mut written = 0u64;
    let mut failed = 0u64;

    for chunk in &chunks {
        let vector = match embedder.embed(&chunk.text).await {
            Ok(vector) => vector,
            Err(e) => {
                eprintln!(
                    "warning: embedding failed for {}#{}: {e}",
                    source_file, chunk.chunk_index
                );
                failed += 1;
                continue;
            }
        };

        let id = identity.chunk_id(source_file, chunk.chunk_index);
        match store.upsert(&id, &vector, chunk).await {
            Ok(()) => written += 1,
            Err(e) => {
                eprintln!(
                    "warning: upsert failed for {}#{}: {e}",
                    source_file, chunk.chunk_index
                );
                failed += 1;
            }
        }
    }

    Ok((written, failed))
}
