//! Chunk store construction.
//!
//! Coordinates the ingestion flow: discovery → extraction → chunking.
//! A full pass reprocesses the whole source directory; there is no
//! incremental update. Any extraction failure aborts the run so callers
//! never see a partial store.

use std::path::Path;
use tracing::{debug, info};

use crate::chunk::chunk_text;
use crate::config::ChunkingConfig;
use crate::connector_fs::scan_sources;
use crate::error::{Error, Result};
use crate::extract::{extract_source, PageText};
use crate::models::Chunk;

/// Build the ordered chunk store for every supported file under `source_dir`.
pub fn build_chunks(source_dir: &Path, chunking: &ChunkingConfig) -> Result<Vec<Chunk>> {
    let files = scan_sources(source_dir)?;
    let mut chunks = Vec::new();

    for file in &files {
        let pages = extract_source(file).map_err(|source| Error::Extract {
            path: file.path.clone(),
            source,
        })?;

        let doc_id = file
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        let source_path = file.path.to_string_lossy().to_string();

        let doc_chunks = chunk_document(&doc_id, &source_path, &pages, chunking)?;
        debug!(
            doc_id = %doc_id,
            pages = pages.len(),
            chunks = doc_chunks.len(),
            "chunked document"
        );
        chunks.extend(doc_chunks);
    }

    info!(
        files = files.len(),
        chunks = chunks.len(),
        root = %source_dir.display(),
        "built chunk store"
    );

    Ok(chunks)
}

/// Chunk the pages of one document. `chunk_id` runs contiguously across
/// pages and is never reset by an empty page.
pub fn chunk_document(
    doc_id: &str,
    source_path: &str,
    pages: &[PageText],
    chunking: &ChunkingConfig,
) -> Result<Vec<Chunk>> {
    let mut chunks = Vec::new();
    let mut chunk_id = 0usize;

    for page in pages {
        for piece in chunk_text(&page.text, chunking.chunk_size, chunking.overlap)? {
            chunks.push(Chunk {
                doc_id: doc_id.to_string(),
                source_path: source_path.to_string(),
                page: page.page,
                chunk_id,
                text: piece,
            });
            chunk_id += 1;
        }
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn page(n: u32, text: &str) -> PageText {
        PageText {
            page: Some(n),
            text: text.to_string(),
        }
    }

    #[test]
    fn chunk_ids_continue_across_pages() {
        let cfg = ChunkingConfig {
            chunk_size: 10,
            overlap: 2,
        };
        // Page 2 was empty and dropped during extraction.
        let pages = vec![page(1, "aaaaaaaaaaaaaaa"), page(3, "bbbbbbbbbbbbbbb")];
        let chunks = chunk_document("manual", "/x/manual.pdf", &pages, &cfg).unwrap();

        let ids: Vec<usize> = chunks.iter().map(|c| c.chunk_id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(chunks[1].page, Some(1));
        assert_eq!(chunks[2].page, Some(3));
    }

    #[test]
    fn build_chunks_tags_provenance() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("handbook.txt"),
            "Climb gradient\n\nrequirements   apply.",
        )
        .unwrap();

        let chunks = build_chunks(tmp.path(), &ChunkingConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        let c = &chunks[0];
        assert_eq!(c.doc_id, "handbook");
        assert_eq!(c.page, None);
        assert_eq!(c.chunk_id, 0);
        assert_eq!(c.text, "Climb gradient requirements apply.");
        assert!(Path::new(&c.source_path).is_absolute());
    }

    #[test]
    fn chunk_ids_contiguous_per_document() {
        let tmp = TempDir::new().unwrap();
        let long = (0..200)
            .map(|i| format!("sentence {} about takeoff performance.", i))
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(tmp.path().join("a.md"), &long).unwrap();
        fs::write(tmp.path().join("b.txt"), &long[..1_500]).unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub/c.txt"), "short").unwrap();

        let chunks = build_chunks(tmp.path(), &ChunkingConfig::default()).unwrap();

        let mut per_doc: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for c in &chunks {
            assert!(!c.text.is_empty());
            per_doc.entry(c.doc_id.as_str()).or_default().push(c.chunk_id);
        }
        assert_eq!(per_doc.len(), 3);
        for (doc, ids) in per_doc {
            let expected: Vec<usize> = (0..ids.len()).collect();
            assert_eq!(ids, expected, "non-contiguous ids for {}", doc);
        }
    }

    #[test]
    fn empty_text_file_contributes_nothing() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("empty.txt"), "  \n ").unwrap();
        fs::write(tmp.path().join("full.txt"), "content here").unwrap();
        let chunks = build_chunks(tmp.path(), &ChunkingConfig::default()).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].doc_id, "full");
    }

    #[test]
    fn corrupt_pdf_aborts_the_run() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("good.txt"), "fine").unwrap();
        fs::write(tmp.path().join("broken.pdf"), "not really a pdf").unwrap();
        let err = build_chunks(tmp.path(), &ChunkingConfig::default()).unwrap_err();
        match err {
            Error::Extract { path, .. } => assert!(path.ends_with("broken.pdf")),
            other => panic!("expected Extract error, got {:?}", other),
        }
    }

    #[test]
    fn invalid_chunking_is_rejected() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "text").unwrap();
        let cfg = ChunkingConfig {
            chunk_size: 100,
            overlap: 100,
        };
        let err = build_chunks(tmp.path(), &cfg).unwrap_err();
        assert!(matches!(err, Error::InvalidChunkConfig { .. }));
    }
}
