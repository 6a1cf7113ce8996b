//! Evaluation harness over labelled query cases.
//!
//! Cases are JSONL, one object per line with at least a `query` field.
//! Every case runs retrieval plus composition against the same chunk store;
//! the report records latency, whether the output carries a citation
//! marker, and output length.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;

use crate::citation::DRAFT_CITATION_MARKER;
use crate::compose::{Composer, RetryPolicy, ThreadSleeper};
use crate::config::Config;
use crate::generation::create_generator;
use crate::ingest::build_chunks;
use crate::models::Chunk;
use crate::search::retrieve;

#[derive(Debug, Clone, Deserialize)]
pub struct EvalCase {
    pub query: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvalResult {
    pub query: String,
    pub latency_sec: f64,
    pub has_citation: bool,
    pub output_length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvalSummary {
    pub cases: usize,
    pub avg_latency_sec: f64,
    /// Fraction of cases in `[0.0, 1.0]`.
    pub citation_rate: f64,
}

pub fn load_cases(path: &Path) -> Result<Vec<EvalCase>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read eval cases: {}", path.display()))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid case", path.display(), i + 1))
        })
        .collect()
}

/// True when the text carries a draft citation (`(Source: doc p.3)`) or a
/// numbered evidence marker (`(Source 2)`) as produced by generative drafts.
pub fn has_citation(text: &str) -> bool {
    text.contains(DRAFT_CITATION_MARKER) || has_numbered_source(text)
}

fn has_numbered_source(text: &str) -> bool {
    text.match_indices("(Source ").any(|(i, m)| {
        let rest = &text.as_bytes()[i + m.len()..];
        let digits = rest.iter().take_while(|b| b.is_ascii_digit()).count();
        digits > 0 && matches!(rest.get(digits), Some(b')') | Some(b','))
    })
}

/// Run every case. A failed composition is recorded on its result and does
/// not stop the remaining cases.
pub fn evaluate(
    cases: &[EvalCase],
    chunks: &[Chunk],
    composer: &Composer<'_>,
    top_k: usize,
) -> Vec<EvalResult> {
    cases
        .iter()
        .map(|case| {
            let started = Instant::now();
            let hits = retrieve(&case.query, chunks, top_k);
            let outcome = composer.compose(&case.query, &hits);
            let latency_sec = round_to(started.elapsed().as_secs_f64(), 2);

            match outcome {
                Ok(draft) => EvalResult {
                    query: case.query.clone(),
                    latency_sec,
                    has_citation: has_citation(&draft.text),
                    output_length: draft.text.chars().count(),
                    error: None,
                },
                Err(e) => EvalResult {
                    query: case.query.clone(),
                    latency_sec,
                    has_citation: false,
                    output_length: 0,
                    error: Some(e.to_string()),
                },
            }
        })
        .collect()
}

pub fn summarize(results: &[EvalResult]) -> EvalSummary {
    if results.is_empty() {
        return EvalSummary {
            cases: 0,
            avg_latency_sec: 0.0,
            citation_rate: 0.0,
        };
    }
    let n = results.len() as f64;
    let total_latency: f64 = results.iter().map(|r| r.latency_sec).sum();
    let cited = results.iter().filter(|r| r.has_citation).count() as f64;

    EvalSummary {
        cases: results.len(),
        avg_latency_sec: total_latency / n,
        citation_rate: cited / n,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `onepager eval`: print one JSON line per case, then a summary.
pub fn run_eval(config: &Config, source_dir: &Path, cases_path: &Path, offline: bool) -> Result<()> {
    let chunks = build_chunks(source_dir, &config.chunking)?;
    let cases = load_cases(cases_path)?;

    let generator = if offline {
        None
    } else {
        create_generator(&config.generation)?
    };
    let composer = Composer::new(
        generator.as_deref(),
        RetryPolicy::from_config(&config.generation),
        &ThreadSleeper,
    );

    let results = evaluate(&cases, &chunks, &composer, config.retrieval.top_k);
    for result in &results {
        println!("{}", serde_json::to_string(result)?);
    }

    let summary = summarize(&results);
    println!("\n=== SUMMARY ===");
    println!("Mode: {}", composer.mode().as_str());
    println!("Cases: {}", summary.cases);
    println!("Avg latency: {:.2}", summary.avg_latency_sec);
    println!("Citation rate: {:.1} %", summary.citation_rate * 100.0);

    Ok(())
}
