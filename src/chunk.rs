//! Fixed-window text chunker.
//!
//! Splits file content into [`Chunk`]s of at most `size` characters,
//! advancing `size - overlap` characters per step so consecutive chunks
//! share an `overlap`-character prefix/suffix. Splitting is purely
//! offset-based, not line- or token-aware: reproducibility matters more
//! here than chunk quality.
//!
//! Offsets are character offsets, so multi-byte content never splits
//! inside a code point.

use crate::error::{Result, ScourError};
use crate::models::Chunk;

/// Split `text` into overlapping chunks for `source_file`.
///
/// Produces slices `[i, i + size)` for `i = 0, size - overlap,
/// 2 * (size - overlap), ...` until the text is exhausted. The last chunk
/// may be shorter than `size`. Empty text yields zero chunks.
///
/// # Errors
///
/// Rejects `size == 0` and `overlap >= size`: either configuration would
/// keep the scan from advancing, so it fails fast instead of looping.
pub fn chunk_text(source_file: &str, text: &str, size: usize, overlap: usize) -> Result<Vec<Chunk>> {
    if size == 0 {
        return Err(ScourError::Config("chunk size must be > 0".into()));
    }
    if overlap >= size {
        return Err(ScourError::Config(format!(
            "chunk overlap ({overlap}) must be smaller than chunk size ({size})"
        )));
    }

    if text.is_empty() {
        return Ok(Vec::new());
    }

    let chars: Vec<char> = text.chars().collect();
    let step = size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    while start < chars.len() {
        let end = (start + size).min(chars.len());
        chunks.push(Chunk {
            source_file: source_file.to_string(),
            chunk_index: chunks.len(),
            text: chars[start..end].iter().collect(),
        });
        // This chunk reached the end of the text; a further step would
        // only re-emit a tail that lies inside its overlap.
        if end == chars.len() {
            break;
        }
        start += step;
    }

    Ok(chunks)
}
