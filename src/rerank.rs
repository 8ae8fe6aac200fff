//! Generative reranking: prompt construction, the Ollama generate client,
//! and defensive parsing of the model's free-text answer.
//!
//! The reranker is untrusted input. Its output is modeled as a tagged
//! [`Ranking`] — either a parsed index permutation or an explicit
//! fallback — rather than an error, so an unparsable response degrades to
//! the original similarity order instead of failing the query.

use std::time::Duration;

use crate::config::ModelsConfig;
use crate::error::{Result, ScourError};
use crate::models::SearchHit;

/// Per-candidate excerpt length in the prompt, in characters.
const SNIPPET_CHARS: usize = 600;

/// Outcome of interpreting the rerank model's raw output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ranking {
    /// Candidate indices in relevance order, all within bounds, deduplicated.
    Parsed(Vec<usize>),
    /// The output was unusable; callers keep the similarity order.
    Fallback,
}

pub struct RerankClient {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl RerankClient {
    pub fn new(config: &ModelsConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ScourError::Rerank(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            model: config.generation.clone(),
        })
    }

    /// Ask the generative model to rank `candidates` against `query`.
    ///
    /// Transport failures are hard errors per the query pipeline contract;
    /// only unparsable *content* degrades to [`Ranking::Fallback`].
    pub async fn rank(&self, query: &str, candidates: &[SearchHit], top_n: usize) -> Result<Ranking> {
        let prompt = build_rerank_prompt(query, candidates, top_n);
        let url = format!("{}/api/generate", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScourError::Rerank(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ScourError::Rerank(format!(
                "generate API error {status}: {body_text}"
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ScourError::Rerank(format!("failed to parse response: {e}")))?;

        let raw = json
            .get("response")
            .and_then(|r| r.as_str())
            .ok_or_else(|| ScourError::Rerank("response field missing".into()))?;

        Ok(parse_ranking(raw, candidates.len()))
    }
}

/// Build the rerank prompt: the query plus index-labeled candidate
/// excerpts, with instructions to answer with a bare JSON index array.
pub fn build_rerank_prompt(query: &str, candidates: &[SearchHit], top_n: usize) -> String {
    let mut prompt = format!(
        "You are ranking code search results by relevance.\n\n\
         Query: {query}\n\nCandidates:\n"
    );

    for (i, hit) in candidates.iter().enumerate() {
        let excerpt: String = hit.text.chars().take(SNIPPET_CHARS).collect();
        prompt.push_str(&format!("[{i}] ({})\n{excerpt}\n\n", hit.source_file));
    }

    prompt.push_str(&format!(
        "Respond with a JSON array of the {top_n} most relevant candidate \
         indices, most relevant first, e.g. [2, 0, 5]. \
         Respond with the array only, no other text."
    ));

    prompt
}

/// Interpret raw model output as a ranking over `candidate_count` items.
///
/// The model may wrap the array in prose or a code fence, so the first
/// bracketed substring is located and parsed. Indices outside
/// `[0, candidate_count)` and duplicates are dropped rather than treated
/// as errors. Anything unparsable yields [`Ranking::Fallback`].
pub fn parse_ranking(raw: &str, candidate_count: usize) -> Ranking {
    let Some(open) = raw.find('[') else {
        return Ranking::Fallback;
    };
    let Some(close) = raw[open..].find(']') else {
        return Ranking::Fallback;
    };
    let slice = &raw[open..open + close + 1];

    let Ok(values) = serde_json::from_str::<Vec<serde_json::Value>>(slice) else {
        return Ranking::Fallback;
    };

    let mut indices = Vec::new();
    for value in values {
        let Some(index) = value.as_u64() else {
            // A non-integer entry means the model answered with something
            // other than an index array.
            return Ranking::Fallback;
        };
        let index = index as usize;
        if index >= candidate_count || indices.contains(&index) {
            continue;
        }
        indices.push(index);
    }

    Ranking::Parsed(indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(source_file: &str, text: &str) -> SearchHit {
        SearchHit {
            score: 0.5,
            source_file: source_file.to_string(),
            text: text.to_string(),
            chunk_index: Some(0),
        }
    }

    #[test]
    fn parses_bare_array() {
        assert_eq!(parse_ranking("[2, 0, 1]", 3), Ranking::Parsed(vec![2, 0, 1]));
    }

    #[test]
    fn parses_array_embedded_in_prose() {
        let raw = "Sure! The most relevant candidates are: [1, 3] — hope that helps.";
        assert_eq!(parse_ranking(raw, 5), Ranking::Parsed(vec![1, 3]));
    }

    #[test]
    fn parses_fenced_array() {
        let raw = "```json\n[0, 2]\n```";
        assert_eq!(parse_ranking(raw, 3), Ranking::Parsed(vec![0, 2]));
    }

    #[test]
    fn out_of_range_indices_dropped() {
        assert_eq!(parse_ranking("[0, 9, 1]", 3), Ranking::Parsed(vec![0, 1]));
    }

    #[test]
    fn duplicate_indices_dropped() {
        assert_eq!(parse_ranking("[1, 1, 0]", 3), Ranking::Parsed(vec![1, 0]));
    }

    #[test]
    fn prose_without_array_falls_back() {
        assert_eq!(parse_ranking("I cannot rank these.", 3), Ranking::Fallback);
    }

    #[test]
    fn malformed_array_falls_back() {
        assert_eq!(parse_ranking("[1, 2", 3), Ranking::Fallback);
        assert_eq!(parse_ranking("[1, oops]", 3), Ranking::Fallback);
    }

    #[test]
    fn non_integer_entries_fall_back() {
        assert_eq!(parse_ranking("[\"a\", \"b\"]", 3), Ranking::Fallback);
        assert_eq!(parse_ranking("[-1, 0]", 3), Ranking::Fallback);
    }

    #[test]
    fn prompt_labels_candidates_by_index() {
        let candidates = vec![hit("src/a.rs", "fn alpha() {}"), hit("src/b.rs", "fn beta() {}")];
        let prompt = build_rerank_prompt("alpha function", &candidates, 2);
        assert!(prompt.contains("[0] (src/a.rs)"));
        assert!(prompt.contains("[1] (src/b.rs)"));
        assert!(prompt.contains("alpha function"));
        assert!(prompt.contains("JSON array"));
    }

    #[test]
    fn prompt_truncates_long_candidates() {
        let long = "z".repeat(SNIPPET_CHARS * 3);
        let candidates = vec![hit("src/a.rs", &long)];
        let prompt = build_rerank_prompt("query", &candidates, 1);
        assert!(prompt.len() < long.len());
    }
}
