//! Overlapping character-window chunker.
//!
//! Splits normalized text into windows of `chunk_size` characters. Each
//! window after the first starts `overlap` characters before the previous
//! window's end, so adjacent chunks share context across the cut.
//!
//! # Algorithm
//!
//! 1. Reject `overlap >= chunk_size` (the window would never advance).
//! 2. Take `[start, min(start + chunk_size, len))`.
//! 3. Stop once a window reaches the end of the text.
//! 4. Otherwise continue from `end - overlap`.
//!
//! Offsets are counted in characters, not bytes. Windows are trimmed and
//! empty ones dropped by [`chunk_text`]; [`chunk_spans`] exposes the raw
//! untrimmed windows.
//!
//! # Example
//!
//! ```rust
//! use onepager::chunk::chunk_text;
//!
//! let chunks = chunk_text("abcdefghij", 4, 1).unwrap();
//! assert_eq!(chunks, vec!["abcd", "defg", "ghij"]);
//! ```

use crate::error::{Error, Result};

/// Character spans `(start, end)` of every window, in order.
pub fn chunk_spans(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<(usize, usize)>> {
    if overlap >= chunk_size {
        return Err(Error::InvalidChunkConfig {
            chunk_size,
            overlap,
        });
    }

    let n = text.chars().count();
    let mut spans = Vec::new();
    let mut start = 0usize;

    while start < n {
        let end = (start + chunk_size).min(n);
        spans.push((start, end));
        if end == n {
            break;
        }
        start = end.saturating_sub(overlap);
    }

    Ok(spans)
}

/// Split text into trimmed, non-empty overlapping chunks.
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    let spans = chunk_spans(text, chunk_size, overlap)?;

    // Byte offset of every char boundary, including the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();

    Ok(spans
        .into_iter()
        .map(|(s, e)| text[bounds[s]..bounds[e]].trim())
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect())
}
