//! Filesystem discovery of supported source files.
//!
//! Walks the source directory recursively and keeps files whose extension
//! is `.pdf`, `.txt`, or `.md` (case-insensitive). Everything else is
//! silently ignored. Results are sorted by path so chunk identifiers are
//! reproducible across runs on an unchanged tree.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::path::Path;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::models::{SourceFile, SourceKind};

const PDF_GLOBS: &[&str] = &["**/*.pdf"];
const TEXT_GLOBS: &[&str] = &["**/*.txt", "**/*.md"];

pub fn scan_sources(root: &Path) -> Result<Vec<SourceFile>> {
    if !root.is_dir() {
        return Err(Error::NoSourcesFound {
            root: root.to_path_buf(),
        });
    }
    let root = root.canonicalize()?;

    let pdf_set = build_globset(PDF_GLOBS)?;
    let text_set = build_globset(TEXT_GLOBS)?;

    let mut files = Vec::new();

    for entry in WalkDir::new(&root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(&root).unwrap_or(path);

        let kind = if pdf_set.is_match(relative) {
            SourceKind::Pdf
        } else if text_set.is_match(relative) {
            SourceKind::Text
        } else {
            continue;
        };

        files.push(SourceFile {
            path: path.to_path_buf(),
            kind,
        });
    }

    if files.is_empty() {
        return Err(Error::NoSourcesFound { root });
    }

    // Sort for deterministic ordering
    files.sort_by(|a, b| a.path.cmp(&b.path));

    Ok(files)
}

fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(GlobBuilder::new(pattern).case_insensitive(true).build()?);
    }
    Ok(builder.build()?)
}
