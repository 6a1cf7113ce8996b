//! # onepager CLI
//!
//! ## Usage
//!
//! ```bash
//! onepager --config ./config/onepager.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `onepager ask [QUERY]` | Retrieve evidence and draft a one-pager (interactive without QUERY) |
//! | `onepager search QUERY` | Print ranked evidence only |
//! | `onepager eval CASES` | Run the evaluation harness over a JSONL case file |

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use onepager::ask::{run_ask, AskOptions};
use onepager::config;
use onepager::eval::run_eval;
use onepager::search::run_search;
use onepager::telemetry::{EventLog, RunContext};

/// onepager: draft citation-grounded one-pagers from local documents.
#[derive(Parser)]
#[command(
    name = "onepager",
    about = "Draft citation-grounded one-pagers from a local folder of PDF, text, and markdown files",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/onepager.toml`. If the file does not exist,
    /// built-in defaults are used.
    #[arg(long, global = true, default_value = "./config/onepager.toml")]
    config: PathBuf,

    /// Override `[sources].root`.
    #[arg(long, global = true)]
    sources: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question with a grounded one-pager draft.
    ///
    /// Without QUERY, reads questions from stdin until an empty line.
    Ask {
        query: Option<String>,

        /// Draft extractively even if a generation provider is configured.
        #[arg(long)]
        offline: bool,

        /// Number of evidence chunks to retrieve.
        #[arg(long, value_parser = parse_top_k)]
        top_k: Option<usize>,

        /// Do not save the draft as markdown.
        #[arg(long)]
        no_export: bool,
    },

    /// Print the ranked evidence for a query.
    Search {
        query: String,

        /// Maximum number of results to return.
        #[arg(long, value_parser = parse_top_k)]
        top_k: Option<usize>,
    },

    /// Run the evaluation harness.
    Eval {
        /// JSONL file with one `{"query": ...}` object per line.
        cases: PathBuf,

        /// Draft extractively even if a generation provider is configured.
        #[arg(long)]
        offline: bool,
    },
}

/// Parse `--top-k`, which must be at least 1.
fn parse_top_k(s: &str) -> Result<usize, String> {
    let k: usize = s.parse().map_err(|e| format!("invalid number '{}': {}", s, e))?;
    if k == 0 {
        return Err("must be at least 1".to_string());
    }
    Ok(k)
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(&cli.config)?;
    let source_dir = cli.sources.unwrap_or_else(|| cfg.sources.root.clone());

    match cli.command {
        Commands::Ask {
            query,
            offline,
            top_k,
            no_export,
        } => {
            let events = EventLog::new(&cfg.telemetry, RunContext::new());
            let opts = AskOptions {
                query,
                offline,
                top_k,
                no_export,
            };
            run_ask(&cfg, &source_dir, &opts, &events)?;
        }
        Commands::Search { query, top_k } => {
            run_search(&cfg, &source_dir, &query, top_k.unwrap_or(cfg.retrieval.top_k))?;
        }
        Commands::Eval { cases, offline } => {
            run_eval(&cfg, &source_dir, &cases, offline)?;
        }
    }

    Ok(())
}
