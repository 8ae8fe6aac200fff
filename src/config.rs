use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub store: StoreConfig,
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    pub models: ModelsConfig,
    pub files: FilesConfig,
    #[serde(default)]
    pub index: IndexConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StoreConfig {
    /// Qdrant base URL, e.g. `http://localhost:6333`.
    pub url: String,
    pub collection: String,
    #[serde(default = "default_dims")]
    pub dims: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    pub size: usize,
    #[serde(default)]
    pub overlap: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Candidates fetched from nearest-neighbor search before reranking.
    #[serde(default = "default_candidate_k")]
    pub candidate_k: usize,
    /// Documents returned to the caller after reranking.
    #[serde(default = "default_final_limit")]
    pub final_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            candidate_k: default_candidate_k(),
            final_limit: default_final_limit(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelsConfig {
    /// Ollama base URL, e.g. `http://localhost:11434`.
    pub url: String,
    /// Embedding model, used by both indexing and query embedding.
    /// A mismatch between the two silently degrades relevance, so there
    /// is exactly one key.
    pub embedding: String,
    /// Generative model used for reranking.
    pub generation: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FilesConfig {
    pub root: PathBuf,
    #[serde(default = "default_include_globs")]
    pub include_globs: Vec<String>,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    /// Chunk identifier policy: `deterministic` or `ephemeral`.
    #[serde(default = "default_identity")]
    pub identity: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            identity: default_identity(),
        }
    }
}

fn default_dims() -> usize {
    768
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_candidate_k() -> usize {
    15
}
fn default_final_limit() -> usize {
    5
}
fn default_identity() -> String {
    "deterministic".to_string()
}
fn default_include_globs() -> Vec<String> {
    vec!["**/*.rs".to_string(), "**/*.md".to_string()]
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate chunking. overlap >= size would make the chunk scan
    // non-progressing, so it is rejected here as well as in the chunker.
    if config.chunking.size == 0 {
        anyhow::bail!("chunking.size must be > 0");
    }
    if config.chunking.overlap >= config.chunking.size {
        anyhow::bail!(
            "chunking.overlap ({}) must be smaller than chunking.size ({})",
            config.chunking.overlap,
            config.chunking.size
        );
    }

    // Validate retrieval
    if config.retrieval.final_limit < 1 {
        anyhow::bail!("retrieval.final_limit must be >= 1");
    }
    if config.retrieval.candidate_k < config.retrieval.final_limit {
        anyhow::bail!("retrieval.candidate_k must be >= retrieval.final_limit");
    }

    // Validate store
    if config.store.dims == 0 {
        anyhow::bail!("store.dims must be > 0");
    }

    match config.index.identity.as_str() {
        "deterministic" | "ephemeral" => {}
        other => anyhow::bail!(
            "Unknown identity scheme: '{}'. Must be deterministic or ephemeral.",
            other
        ),
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    const VALID: &str = r#"
[store]
url = "http://localhost:6333"
collection = "code"

[chunking]
size = 2000
overlap = 200

[models]
url = "http://localhost:11434"
embedding = "nomic-embed-text"
generation = "llama3.1"

[files]
root = "."
"#;

    #[test]
    fn valid_config_loads_with_defaults() {
        let file = write_config(VALID);
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.store.dims, 768);
        assert_eq!(config.retrieval.candidate_k, 15);
        assert_eq!(config.retrieval.final_limit, 5);
        assert_eq!(config.index.identity, "deterministic");
    }

    #[test]
    fn overlap_ge_size_rejected() {
        let body = VALID.replace("overlap = 200", "overlap = 2000");
        let file = write_config(&body);
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("overlap"));
    }

    #[test]
    fn zero_size_rejected() {
        let body = VALID
            .replace("size = 2000", "size = 0")
            .replace("overlap = 200", "overlap = 0");
        let file = write_config(&body);
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn unknown_identity_rejected() {
        let body = format!("{VALID}\n[index]\nidentity = \"random\"\n");
        let file = write_config(&body);
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("identity"));
    }

    #[test]
    fn candidate_k_below_final_limit_rejected() {
        let body = format!("{VALID}\n[retrieval]\ncandidate_k = 3\nfinal_limit = 5\n");
        let file = write_config(&body);
        assert!(load_config(file.path()).is_err());
    }
}
