//! Append-only JSONL event log of pipeline milestones.
//!
//! Each line is one JSON object:
//!
//! ```json
//! {"event":"retrieval_done","ts_utc":"2026-01-01T00:00:00+00:00","run_id":"…","data":{"hits":3,"top_score":4}}
//! ```
//!
//! The run id comes from an explicit [`RunContext`] created once per
//! process invocation and handed to whoever records events.

use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;
use uuid::Uuid;

use crate::config::TelemetryConfig;

/// Identity of one invocation of the tool.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Known pipeline milestones and their payloads.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Event {
    SourcesLoaded { source_dir: String, chunks: usize },
    QueryReceived { query: String },
    RetrievalDone { hits: usize, top_score: usize },
    RetrievalEmpty { query: String },
    GenerationFailed { kind: String, error: String },
    ExportSaved { path: String },
    ExportFailed { error: String },
    ResponseReady {
        mode: String,
        output_chars: usize,
        latency_ms: u64,
    },
}

/// Writes [`Event`]s for one run. A disabled log drops every event.
pub struct EventLog {
    path: Option<PathBuf>,
    run: RunContext,
}

impl EventLog {
    pub fn new(config: &TelemetryConfig, run: RunContext) -> Self {
        Self {
            path: config.enabled.then(|| config.events_path.clone()),
            run,
        }
    }

    pub fn run(&self) -> &RunContext {
        &self.run
    }

    /// Append an event. Failures are logged and otherwise ignored so a
    /// broken log never aborts a query.
    pub fn record(&self, event: Event) {
        let Some(path) = &self.path else {
            return;
        };
        if let Err(e) = self.append(path, &event) {
            warn!(path = %path.display(), "failed to record event: {}", e);
        }
    }

    fn append(&self, path: &Path, event: &Event) -> anyhow::Result<()> {
        let line = self.render(event)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    fn render(&self, event: &Event) -> serde_json::Result<String> {
        let mut value = serde_json::to_value(event)?;
        if let Some(obj) = value.as_object_mut() {
            obj.insert(
                "ts_utc".to_string(),
                serde_json::Value::String(Utc::now().to_rfc3339()),
            );
            obj.insert(
                "run_id".to_string(),
                serde_json::Value::String(self.run.run_id.clone()),
            );
        }
        serde_json::to_string(&value)
    }
}
