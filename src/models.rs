//! Core data models used throughout onepager.
//!
//! These types represent the files, chunks, and scored hits that flow
//! through the ingestion and retrieval pipeline.

use std::path::PathBuf;

/// How a discovered file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Paginated document; text is extracted per page.
    Pdf,
    /// Flat text (`.txt`, `.md`); read as one page-less body.
    Text,
}

/// A supported file found under the source directory.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub path: PathBuf,
    pub kind: SourceKind,
}

/// The atomic retrievable unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// File stem of the originating file.
    pub doc_id: String,
    /// Absolute path of the originating file.
    pub source_path: String,
    /// 1-indexed page for paginated sources.
    pub page: Option<u32>,
    /// Zero-based, contiguous per document (not reset per page).
    pub chunk_id: usize,
    /// Whitespace-normalized, never empty.
    pub text: String,
}

/// A chunk paired with its relevance score for one query.
#[derive(Debug, Clone)]
pub struct ScoredHit {
    pub score: usize,
    pub chunk: Chunk,
}
