//! Citation strings rendered from chunk provenance.
//!
//! Two forms exist: the console form shown next to retrieved evidence and
//! the draft form appended to extractive findings. Both are pure functions
//! of `(doc_id, page, chunk_id)`.

use crate::models::Chunk;

/// Marker every draft-form citation starts with.
pub const DRAFT_CITATION_MARKER: &str = "(Source:";

/// Where a citation is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationStyle {
    /// Next to evidence printed on the console or in logs.
    Console,
    /// Inline in draft text.
    Draft,
}

pub fn format_citation(chunk: &Chunk, style: CitationStyle) -> String {
    match style {
        CitationStyle::Console => console_citation(chunk),
        CitationStyle::Draft => draft_citation(chunk),
    }
}

/// `[doc p.3 chunk#7]`, or `[doc chunk#7]` for page-less sources.
pub fn console_citation(chunk: &Chunk) -> String {
    match chunk.page {
        Some(page) => format!("[{} p.{} chunk#{}]", chunk.doc_id, page, chunk.chunk_id),
        None => format!("[{} chunk#{}]", chunk.doc_id, chunk.chunk_id),
    }
}

/// `(Source: doc p.3)`, or `(Source: doc)` for page-less sources.
pub fn draft_citation(chunk: &Chunk) -> String {
    match chunk.page {
        Some(page) => format!("{} {} p.{})", DRAFT_CITATION_MARKER, chunk.doc_id, page),
        None => format!("{} {})", DRAFT_CITATION_MARKER, chunk.doc_id),
    }
}
