//! # onepager
//!
//! A local document question-answering tool that drafts citation-grounded
//! one-pagers.
//!
//! onepager ingests a folder of PDF, text, and markdown files, splits them
//! into overlapping character chunks, ranks chunks against a question by
//! lexical token overlap, and turns the best evidence into a three-section
//! draft (Summary / Key Findings / Limitations). With a generative model
//! configured the draft is written by the model under an evidence-only
//! prompt; without one it is assembled extractively from the evidence.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌─────────────┐   ┌──────────────┐
//! │ Sources dir │──▶│   Ingest    │──▶│ Chunk store  │
//! │ pdf/txt/md  │   │ extract+cut │   │  (in memory) │
//! └─────────────┘   └─────────────┘   └──────┬───────┘
//!                                            │ query
//!                                            ▼
//!                   ┌─────────────┐   ┌──────────────┐
//!                   │  Composer   │◀──│   Retriever  │
//!                   │ LLM / extr. │   │ token overlap│
//!                   └─────────────┘   └──────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! onepager ask "climb gradient category A"   # one question
//! onepager ask                               # interactive
//! onepager search "engine-out performance"   # evidence only
//! onepager eval eval/cases.jsonl --offline   # harness
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`error`] | Error taxonomy |
//! | [`connector_fs`] | Source file discovery |
//! | [`extract`] | PDF and text extraction |
//! | [`chunk`] | Overlapping character chunking |
//! | [`ingest`] | Chunk store construction |
//! | [`search`] | Lexical retrieval |
//! | [`citation`] | Citation formatting |
//! | [`generation`] | Generative model abstraction |
//! | [`compose`] | Grounded draft composition |
//! | [`telemetry`] | JSONL event log |
//! | [`export`] | Markdown draft export |
//! | [`ask`] | Per-query orchestration |
//! | [`eval`] | Evaluation harness |

pub mod ask;
pub mod chunk;
pub mod citation;
pub mod compose;
pub mod config;
pub mod connector_fs;
pub mod error;
pub mod eval;
pub mod export;
pub mod extract;
pub mod generation;
pub mod ingest;
pub mod models;
pub mod search;
pub mod telemetry;
