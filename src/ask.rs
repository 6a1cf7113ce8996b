//! Per-query orchestration: retrieve → compose → export, with events.
//!
//! A [`Session`] holds one chunk store and answers any number of queries
//! against it. A failing query returns an error for that query only; the
//! session stays usable.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};

use crate::citation::{format_citation, CitationStyle};
use crate::compose::{Composer, Draft, RetryPolicy, ThreadSleeper};
use crate::config::Config;
use crate::generation::create_generator;
use crate::ingest::build_chunks;
use crate::models::{Chunk, ScoredHit};
use crate::search::retrieve;
use crate::telemetry::{Event, EventLog};

/// Result of one query.
#[derive(Debug)]
pub enum AskOutcome {
    /// No chunk scored above zero; nothing was drafted.
    NoEvidence,
    Drafted {
        hits: Vec<ScoredHit>,
        draft: Draft,
        export_path: Option<PathBuf>,
    },
}

pub struct Session<'a> {
    pub chunks: &'a [Chunk],
    pub composer: &'a Composer<'a>,
    pub events: &'a EventLog,
    pub top_k: usize,
    /// Directory for markdown exports; `None` disables export.
    pub export_dir: Option<PathBuf>,
}

impl Session<'_> {
    pub fn ask(&self, query: &str) -> Result<AskOutcome> {
        let started = Instant::now();
        self.events.record(Event::QueryReceived {
            query: query.to_string(),
        });

        let hits = retrieve(query, self.chunks, self.top_k);
        let Some(top) = hits.first() else {
            self.events.record(Event::RetrievalEmpty {
                query: query.to_string(),
            });
            return Ok(AskOutcome::NoEvidence);
        };
        self.events.record(Event::RetrievalDone {
            hits: hits.len(),
            top_score: top.score,
        });

        let draft = match self.composer.compose(query, &hits) {
            Ok(draft) => draft,
            Err(e) => {
                self.events.record(Event::GenerationFailed {
                    kind: e.kind().to_string(),
                    error: e.to_string(),
                });
                return Err(e).context("Draft generation failed");
            }
        };

        let export_path = self
            .export_dir
            .as_deref()
            .and_then(|dir| self.export(query, &draft, dir));

        let latency_ms = started.elapsed().as_millis() as u64;
        self.events.record(Event::ResponseReady {
            mode: draft.mode.as_str().to_string(),
            output_chars: draft.text.chars().count(),
            latency_ms,
        });
        info!(
            run_id = %self.events.run().run_id,
            hits = hits.len(),
            mode = draft.mode.as_str(),
            latency_ms,
            "query answered"
        );

        Ok(AskOutcome::Drafted {
            hits,
            draft,
            export_path,
        })
    }

    /// Save the draft as markdown. A failed save is recorded and the draft
    /// is still returned to the caller.
    fn export(&self, query: &str, draft: &Draft, dir: &Path) -> Option<PathBuf> {
        let now = chrono::Local::now().naive_local();
        match crate::export::save_markdown(query, &draft.text, dir, now) {
            Ok(path) => {
                self.events.record(Event::ExportSaved {
                    path: path.display().to_string(),
                });
                Some(path)
            }
            Err(e) => {
                warn!(dir = %dir.display(), "failed to export draft: {:#}", e);
                self.events.record(Event::ExportFailed {
                    error: format!("{:#}", e),
                });
                None
            }
        }
    }
}

/// Options the `ask` command layers over the config file.
#[derive(Debug, Clone, Default)]
pub struct AskOptions {
    pub query: Option<String>,
    pub offline: bool,
    pub top_k: Option<usize>,
    pub no_export: bool,
}

/// `onepager ask`: answer one query, or loop over stdin when none is given.
pub fn run_ask(config: &Config, source_dir: &Path, opts: &AskOptions, events: &EventLog) -> Result<()> {
    let chunks = build_chunks(source_dir, &config.chunking)?;
    events.record(Event::SourcesLoaded {
        source_dir: source_dir.display().to_string(),
        chunks: chunks.len(),
    });
    println!("Loaded {} chunks from {}", chunks.len(), source_dir.display());

    let generator = if opts.offline {
        None
    } else {
        create_generator(&config.generation)?
    };
    let composer = Composer::new(
        generator.as_deref(),
        RetryPolicy::from_config(&config.generation),
        &ThreadSleeper,
    );

    let session = Session {
        chunks: &chunks,
        composer: &composer,
        events,
        top_k: opts.top_k.unwrap_or(config.retrieval.top_k),
        export_dir: (config.export.enabled && !opts.no_export)
            .then(|| config.export.out_dir.clone()),
    };

    if let Some(query) = &opts.query {
        let query = query.trim();
        if query.is_empty() {
            println!("No question entered.");
            return Ok(());
        }
        let outcome = session.ask(query)?;
        print_outcome(&outcome);
        return Ok(());
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nAsk a question: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let query = line?;
        let query = query.trim();
        if query.is_empty() {
            break;
        }

        match session.ask(query) {
            Ok(outcome) => print_outcome(&outcome),
            Err(e) => eprintln!("Error: {:#}", e),
        }
    }

    Ok(())
}

fn print_outcome(outcome: &AskOutcome) {
    match outcome {
        AskOutcome::NoEvidence => {
            println!("No relevant passages found in your local sources.");
            println!("Tip: add more docs to the sources directory or ask using keywords from your docs.");
        }
        AskOutcome::Drafted {
            hits,
            draft,
            export_path,
        } => {
            println!("\nTop retrieved snippets (grounding evidence):\n");
            for hit in hits {
                println!(
                    "Score {} {}",
                    hit.score,
                    format_citation(&hit.chunk, CitationStyle::Console)
                );
                println!("{}", hit.chunk.text);
                println!("{}", "-".repeat(80));
            }
            println!("\n=== ONE-PAGER DRAFT ({}) ===\n", draft.mode.as_str());
            println!("{}", draft.text);
            if let Some(path) = export_path {
                println!("\nSaved draft to {}", path.display());
            }
        }
    }
}
