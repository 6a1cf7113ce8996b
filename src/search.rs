//! Lexical retrieval by token overlap.
//!
//! # Scoring
//!
//! Query and chunk text are tokenized the same way: lowercase, every
//! character outside `[a-z0-9]` becomes a space, split on whitespace, and
//! tokens of a single character are dropped. A chunk's score is the number
//! of query tokens, counted with multiplicity, that occur anywhere in the
//! chunk's token set.
//!
//! Chunks scoring 0 are never returned. Results are sorted by descending
//! score with a stable sort, so ties keep chunk-store order.

use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;
use tracing::debug;

use crate::citation::console_citation;
use crate::config::Config;
use crate::ingest::build_chunks;
use crate::models::{Chunk, ScoredHit};

/// Split text into lowercase alphanumeric tokens longer than one character.
pub fn tokenize(text: &str) -> Vec<String> {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(|c| {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                c
            } else {
                ' '
            }
        })
        .collect();

    cleaned
        .split_whitespace()
        .filter(|t| t.len() > 1)
        .map(str::to_string)
        .collect()
}

/// Overlap score of pre-tokenized query tokens against a chunk's text.
fn score_tokens(query_tokens: &[String], chunk_text: &str) -> usize {
    if query_tokens.is_empty() {
        return 0;
    }
    let chunk_tokens: HashSet<String> = tokenize(chunk_text).into_iter().collect();
    query_tokens
        .iter()
        .filter(|t| chunk_tokens.contains(t.as_str()))
        .count()
}

/// Score one chunk text against a query.
pub fn score_chunk(query: &str, chunk_text: &str) -> usize {
    score_tokens(&tokenize(query), chunk_text)
}

/// Return at most `top_k` chunks with a positive score, best first.
pub fn retrieve(query: &str, chunks: &[Chunk], top_k: usize) -> Vec<ScoredHit> {
    let query_tokens = tokenize(query);
    if query_tokens.is_empty() {
        debug!("query has no usable tokens");
        return Vec::new();
    }

    let mut scored: Vec<ScoredHit> = chunks
        .iter()
        .filter_map(|chunk| {
            let score = score_tokens(&query_tokens, &chunk.text);
            (score > 0).then(|| ScoredHit {
                score,
                chunk: chunk.clone(),
            })
        })
        .collect();

    // Stable: equal scores keep their store order.
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(top_k);

    debug!(
        tokens = query_tokens.len(),
        hits = scored.len(),
        "retrieval complete"
    );
    scored
}

/// `onepager search`: print the ranked evidence for a query without drafting.
pub fn run_search(config: &Config, source_dir: &Path, query: &str, top_k: usize) -> Result<()> {
    let chunks = build_chunks(source_dir, &config.chunking)?;
    let hits = retrieve(query, &chunks, top_k);

    if hits.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for hit in &hits {
        println!("Score {} {}", hit.score, console_citation(&hit.chunk));
        println!("{}", hit.chunk.text);
        println!("{}", "-".repeat(80));
    }

    Ok(())
}
