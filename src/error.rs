use std::path::PathBuf;

/// Errors surfaced by the scour library.
///
/// Library modules return this type directly; the binary converts to
/// `anyhow::Error` at the CLI boundary.
///
/// Rerank *parse* failures are deliberately absent here: an unparsable
/// rerank response degrades to a fallback ranking (see [`crate::rerank`])
/// instead of erroring.
#[derive(Debug, thiserror::Error)]
pub enum ScourError {
    /// The embedding service returned no usable vector.
    #[error("embedding error: {0}")]
    Embedding(String),

    /// A vector-store request (create/delete/upsert/search) failed.
    #[error("vector store error: {0}")]
    VectorStore(String),

    /// The generative rerank service could not be reached or answered
    /// with a transport-level failure.
    #[error("rerank service error: {0}")]
    Rerank(String),

    /// Filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// A file scheduled for indexing could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    Traversal {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScourError>;
