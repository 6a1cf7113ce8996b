//! Save drafts as timestamped markdown files.
//!
//! File names are `{YYYYMMDD_HHMMSS}_{query}.md`, where the query part is
//! sanitized to alphanumerics, `-`, `_`, and spaces, cut to 50 characters,
//! and has spaces replaced by underscores.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

const MAX_QUERY_CHARS: usize = 50;

/// Filesystem-safe rendering of a query.
pub fn safe_file_stem(query: &str) -> String {
    let sanitized: String = query
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | ' ') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_QUERY_CHARS)
        .collect();
    sanitized.trim().replace(' ', "_")
}

/// Write the draft under `out_dir` and return the file path.
pub fn save_markdown(query: &str, draft: &str, out_dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create export dir: {}", out_dir.display()))?;

    let filename = format!("{}_{}.md", now.format("%Y%m%d_%H%M%S"), safe_file_stem(query));
    let path = out_dir.join(filename);

    let content = format!(
        "# One-Pager Draft\n\n**Query:** {}\n\n---\n\n{}\n",
        query, draft
    );
    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write draft: {}", path.display()))?;

    Ok(path)
}
