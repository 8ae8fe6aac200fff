//! Query pipeline: embed the query, nearest-neighbor search, generative
//! rerank, and final truncation.
//!
//! The pipeline is linear with no branching back-edges:
//! embed → search → (no results | rerank) → done. Zero candidates is a
//! terminal empty result and never reaches the reranker; an unparsable
//! rerank answer degrades to the similarity order rather than erroring.

use anyhow::Result;

use crate::config::Config;
use crate::embedding::{Embedder, EmbeddingClient};
use crate::error::ScourError;
use crate::models::{ContextDocument, SearchHit};
use crate::rerank::{Ranking, RerankClient};
use crate::store::{QdrantStore, Store};

/// Run the query pipeline and return at most `final_limit` documents in
/// relevance order.
///
/// Embedding, search, and rerank transport failures propagate as errors;
/// they abort the whole query.
pub async fn retrieve(
    config: &Config,
    store: &dyn Store,
    embedder: &dyn Embedder,
    reranker: &RerankClient,
    query: &str,
) -> std::result::Result<Vec<ContextDocument>, ScourError> {
    let query_vector = embedder.embed(query).await?;

    let candidates = store
        .search(&query_vector, config.retrieval.candidate_k)
        .await?;

    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let ranking = reranker
        .rank(query, &candidates, config.retrieval.final_limit)
        .await?;

    Ok(apply_ranking(
        &candidates,
        &ranking,
        config.retrieval.final_limit,
    ))
}

/// Map a [`Ranking`] back onto the candidate set and truncate to `limit`.
///
/// [`Ranking::Fallback`] keeps the original similarity order. Parsed
/// indices arrive already bounds-checked and deduplicated.
pub fn apply_ranking(
    candidates: &[SearchHit],
    ranking: &Ranking,
    limit: usize,
) -> Vec<ContextDocument> {
    let ordered: Vec<&SearchHit> = match ranking {
        Ranking::Parsed(indices) => indices.iter().filter_map(|&i| candidates.get(i)).collect(),
        Ranking::Fallback => candidates.iter().collect(),
    };

    ordered
        .into_iter()
        .take(limit)
        .map(ContextDocument::from)
        .collect()
}

/// CLI entry point: retrieve context for `query` and print it to stdout.
pub async fn run_query(config: &Config, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        eprintln!("empty query");
        return Ok(());
    }

    let store = QdrantStore::new(&config.store)?;
    let embedder = EmbeddingClient::new(&config.models)?;
    let reranker = RerankClient::new(&config.models)?;

    let documents = retrieve(config, &store, &embedder, &reranker, query).await?;

    if documents.is_empty() {
        eprintln!("no matches");
        return Ok(());
    }

    eprintln!("{} context documents", documents.len());
    for document in &documents {
        println!("// {}", document.source_file);
        println!("{}", document.text);
        println!();
    }

    Ok(())
}
