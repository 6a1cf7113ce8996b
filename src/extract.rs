//! Per-format text extraction.
//!
//! PDFs are read page by page so chunks can carry a page number; text and
//! markdown files are read whole. All returned text is whitespace-normalized
//! and empty pages are dropped.

use std::path::Path;

use crate::models::{SourceFile, SourceKind};

/// Extraction error for a single file.
#[derive(Debug)]
pub enum ExtractError {
    Pdf(String),
    Io(std::io::Error),
}

impl std::fmt::Display for ExtractError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractError::Pdf(e) => write!(f, "PDF extraction failed: {}", e),
            ExtractError::Io(e) => write!(f, "read failed: {}", e),
        }
    }
}

impl std::error::Error for ExtractError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExtractError::Io(e) => Some(e),
            ExtractError::Pdf(_) => None,
        }
    }
}

/// Normalized text of one page (or of a whole page-less file).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    pub page: Option<u32>,
    pub text: String,
}

/// Collapse every whitespace run (newlines included) to a single space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract the normalized, non-empty pages of a source file in source order.
pub fn extract_source(file: &SourceFile) -> Result<Vec<PageText>, ExtractError> {
    match file.kind {
        SourceKind::Pdf => {
            let bytes = std::fs::read(&file.path).map_err(ExtractError::Io)?;
            extract_pdf_pages(&bytes)
        }
        SourceKind::Text => {
            let text = read_text(&file.path)?;
            if text.is_empty() {
                return Ok(Vec::new());
            }
            Ok(vec![PageText { page: None, text }])
        }
    }
}

/// Extract PDF text per page. Page numbers are 1-indexed and keep their
/// original position even when earlier pages are empty.
pub fn extract_pdf_pages(bytes: &[u8]) -> Result<Vec<PageText>, ExtractError> {
    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| ExtractError::Pdf(e.to_string()))?;

    Ok(pages
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let text = normalize_whitespace(raw);
            if text.is_empty() {
                None
            } else {
                Some(PageText {
                    page: Some(i as u32 + 1),
                    text,
                })
            }
        })
        .collect())
}

/// Read a flat text file. Invalid UTF-8 sequences are dropped rather than
/// failing the whole file.
fn read_text(path: &Path) -> Result<String, ExtractError> {
    let bytes = std::fs::read(path).map_err(ExtractError::Io)?;
    let decoded: String = bytes.utf8_chunks().map(|c| c.valid()).collect();
    Ok(normalize_whitespace(&decoded))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn normalize_collapses_runs_and_trims() {
        assert_eq!(
            normalize_whitespace("  Climb\n\n gradient\t\trequirements \r\n"),
            "Climb gradient requirements"
        );
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn invalid_pdf_returns_error() {
        let err = extract_pdf_pages(b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractError::Pdf(_)));
    }

    #[test]
    fn text_file_is_single_pageless_text() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "# Notes\n\nEngine-out   climb.\n").unwrap();
        let pages = extract_source(&SourceFile {
            path,
            kind: SourceKind::Text,
        })
        .unwrap();
        assert_eq!(
            pages,
            vec![PageText {
                page: None,
                text: "# Notes Engine-out climb.".to_string()
            }]
        );
    }

    #[test]
    fn invalid_utf8_bytes_are_dropped() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("legacy.txt");
        std::fs::write(&path, b"Caf\xe9 climb \xff\xfegradient \xc3\xa9t\xc3\xa9").unwrap();
        let pages = extract_source(&SourceFile {
            path,
            kind: SourceKind::Text,
        })
        .unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].text, "Caf climb gradient \u{e9}t\u{e9}");
        assert!(!pages[0].text.contains('\u{fffd}'));
    }

    #[test]
    fn whitespace_only_text_file_yields_no_pages() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "\n\n   \n").unwrap();
        let pages = extract_source(&SourceFile {
            path,
            kind: SourceKind::Text,
        })
        .unwrap();
        assert!(pages.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = extract_source(&SourceFile {
            path: PathBuf::from("/nonexistent/onepager/file.txt"),
            kind: SourceKind::Text,
        })
        .unwrap_err();
        assert!(matches!(err, ExtractError::Io(_)));
    }
}
