//! Chunk identifier schemes.
//!
//! A vector record's id decides whether re-indexing overwrites or
//! duplicates prior vectors. Two policies are supported, chosen in config:
//!
//! - **Deterministic** (default): the id is a UUID formatted from a
//!   SHA-256 hash of `(source_file, chunk_index)`. Upsert-by-id overwrites
//!   a chunk's prior vector in place, so an unchanged file re-indexes
//!   idempotently. A file that shrinks would still leave orphaned
//!   trailing-chunk records, which is why the index writer filter-deletes
//!   the file's records before re-insertion regardless of scheme.
//! - **Ephemeral**: a fresh random UUID per chunk per pass. Simpler, but
//!   correct only because of that same precedent delete; without it every
//!   pass would accumulate duplicates.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::{Result, ScourError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityScheme {
    Deterministic,
    Ephemeral,
}

impl IdentityScheme {
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "deterministic" => Ok(Self::Deterministic),
            "ephemeral" => Ok(Self::Ephemeral),
            other => Err(ScourError::Config(format!(
                "unknown identity scheme: '{other}'"
            ))),
        }
    }

    /// Derive the vector-store id for `(source_file, chunk_index)`.
    ///
    /// Qdrant only accepts UUIDs or unsigned integers as point ids, so the
    /// deterministic hash is folded into UUID shape.
    pub fn chunk_id(&self, source_file: &str, chunk_index: usize) -> String {
        match self {
            Self::Deterministic => {
                let mut hasher = Sha256::new();
                hasher.update(source_file.as_bytes());
                hasher.update(b":");
                hasher.update(chunk_index.to_string().as_bytes());
                let digest = hasher.finalize();
                let mut bytes = [0u8; 16];
                bytes.copy_from_slice(&digest[..16]);
                Uuid::from_bytes(bytes).to_string()
            }
            Self::Ephemeral => Uuid::new_v4().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_ids_are_stable() {
        let scheme = IdentityScheme::Deterministic;
        let a = scheme.chunk_id("src/a.rs", 0);
        let b = scheme.chunk_id("src/a.rs", 0);
        assert_eq!(a, b);
    }

    #[test]
    fn deterministic_ids_differ_per_chunk_and_file() {
        let scheme = IdentityScheme::Deterministic;
        let a0 = scheme.chunk_id("src/a.rs", 0);
        let a1 = scheme.chunk_id("src/a.rs", 1);
        let b0 = scheme.chunk_id("src/b.rs", 0);
        assert_ne!(a0, a1);
        assert_ne!(a0, b0);
    }

    #[test]
    fn ids_are_valid_uuids() {
        let det = IdentityScheme::Deterministic.chunk_id("src/a.rs", 7);
        let eph = IdentityScheme::Ephemeral.chunk_id("src/a.rs", 7);
        assert!(Uuid::parse_str(&det).is_ok());
        assert!(Uuid::parse_str(&eph).is_ok());
    }

    #[test]
    fn ephemeral_ids_are_unique_per_pass() {
        let scheme = IdentityScheme::Ephemeral;
        let a = scheme.chunk_id("src/a.rs", 0);
        let b = scheme.chunk_id("src/a.rs", 0);
        assert_ne!(a, b);
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert!(IdentityScheme::from_name("deterministic").is_ok());
        assert!(IdentityScheme::from_name("ephemeral").is_ok());
        assert!(IdentityScheme::from_name("random").is_err());
    }
}
