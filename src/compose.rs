//! Grounded one-pager drafting.
//!
//! A draft always has three sections, `Summary:`, `Key Findings:`, and
//! `Limitations:`, whichever strategy produced it:
//!
//! - **Generative**: the query and evidence (labelled `Source 1..N` in
//!   retrieval order) are embedded in an evidence-only prompt and sent to a
//!   [`TextGenerator`]. The response is returned verbatim; the composer
//!   does not check that the model followed the instructions.
//! - **Extractive**: no model call. The top three evidence chunks become
//!   the findings, each truncated to 300 characters and followed by its
//!   draft citation.
//!
//! Rate-limited generation is retried with exponential backoff through a
//! [`Sleeper`], so tests can observe the delays without waiting.

use std::time::Duration;
use tracing::{debug, warn};

use crate::citation::draft_citation;
use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::generation::TextGenerator;
use crate::models::ScoredHit;

pub const SUMMARY_HEADING: &str = "Summary:";
pub const KEY_FINDINGS_HEADING: &str = "Key Findings:";
pub const LIMITATIONS_HEADING: &str = "Limitations:";

/// Number of evidence chunks an extractive draft lists.
pub const EXTRACTIVE_FINDINGS: usize = 3;
/// Character limit for each extractive finding before the ellipsis.
pub const SNIPPET_MAX_CHARS: usize = 300;

pub const EXTRACTIVE_LIMITATIONS: &str = "- This draft is extractive (no generation). It only surfaces evidence from your local sources.\n- If retrieval misses relevant passages, the draft will be incomplete.";

/// Which strategy produced a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Generative,
    Extractive,
}

impl DraftMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DraftMode::Generative => "generative",
            DraftMode::Extractive => "extractive",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Draft {
    pub mode: DraftMode,
    pub text: String,
}

// ============ Retry ============

/// Blocking wait between generation attempts.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeps the calling thread.
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Bounded exponential backoff for rate-limited generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay after the first failure; doubled after each further failure.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_secs(config.base_delay_secs),
        }
    }

    /// Delay before attempt `attempt + 1`, where `attempt` is 1-based.
    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay
            .checked_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
            .unwrap_or(Duration::MAX)
    }
}

/// Call the generator, retrying only rate-limit failures.
///
/// Other failures are returned immediately. After the last attempt the
/// final rate-limit failure is returned.
pub fn generate_with_retry(
    generator: &dyn TextGenerator,
    prompt: &str,
    policy: &RetryPolicy,
    sleeper: &dyn Sleeper,
) -> Result<String, GenerationError> {
    let mut attempt = 1;
    loop {
        match generator.generate(prompt) {
            Ok(text) => return Ok(text),
            Err(GenerationError::RateLimited(msg)) if attempt < policy.max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_secs = delay.as_secs_f64(),
                    "generation rate limited, backing off: {}",
                    msg
                );
                sleeper.sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

// ============ Prompt ============

/// Build the evidence-only drafting prompt.
pub fn build_prompt(query: &str, evidence: &[&str]) -> String {
    let evidence_text = evidence
        .iter()
        .enumerate()
        .map(|(i, text)| format!("Source {}:\n{}", i + 1, text))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        r#"You are an academic research assistant.

STRICT RULES:
- Use ONLY the evidence provided.
- If a claim is not in evidence, do not say it.
- If evidence is insufficient, say "Insufficient evidence".
- Do NOT use outside knowledge.

TASK:
Write a one-pager style section answering:

"{query}"

EVIDENCE:
{evidence_text}

OUTPUT FORMAT:

{SUMMARY_HEADING}
(3-5 sentences grounded in evidence)

{KEY_FINDINGS_HEADING}
- bullet points
- each bullet must end with (Source #)

{LIMITATIONS_HEADING}
- what evidence does NOT cover
"#
    )
}

// ============ Extractive ============

/// Truncate to [`SNIPPET_MAX_CHARS`] characters, marking the cut with `...`.
fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= SNIPPET_MAX_CHARS {
        return trimmed.to_string();
    }
    let head: String = trimmed.chars().take(SNIPPET_MAX_CHARS).collect();
    format!("{}...", head.trim_end())
}

/// Assemble a draft from the evidence alone.
pub fn extractive_draft(query: &str, hits: &[ScoredHit]) -> String {
    let mut lines = vec![
        SUMMARY_HEADING.to_string(),
        format!("- This section addresses: {}", query),
        "- Evidence indicates the following key points:".to_string(),
        String::new(),
        KEY_FINDINGS_HEADING.to_string(),
    ];

    for hit in hits.iter().take(EXTRACTIVE_FINDINGS) {
        lines.push(format!(
            "- {} {}",
            snippet(&hit.chunk.text),
            draft_citation(&hit.chunk)
        ));
    }

    lines.push(String::new());
    lines.push(LIMITATIONS_HEADING.to_string());
    lines.push(EXTRACTIVE_LIMITATIONS.to_string());

    lines.join("\n")
}

// ============ Composer ============

/// Chooses the drafting strategy: generative when a generator is present,
/// extractive otherwise.
pub struct Composer<'a> {
    generator: Option<&'a dyn TextGenerator>,
    policy: RetryPolicy,
    sleeper: &'a dyn Sleeper,
}

impl<'a> Composer<'a> {
    pub fn new(
        generator: Option<&'a dyn TextGenerator>,
        policy: RetryPolicy,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            generator,
            policy,
            sleeper,
        }
    }

    /// Extractive-only composer.
    pub fn extractive() -> Composer<'static> {
        Composer {
            generator: None,
            policy: RetryPolicy::default(),
            sleeper: &ThreadSleeper,
        }
    }

    pub fn mode(&self) -> DraftMode {
        if self.generator.is_some() {
            DraftMode::Generative
        } else {
            DraftMode::Extractive
        }
    }

    pub fn compose(&self, query: &str, hits: &[ScoredHit]) -> Result<Draft, GenerationError> {
        match self.generator {
            Some(generator) => {
                let evidence: Vec<&str> = hits.iter().map(|h| h.chunk.text.as_str()).collect();
                let prompt = build_prompt(query, &evidence);
                debug!(
                    model = generator.model_name(),
                    sources = evidence.len(),
                    prompt_chars = prompt.len(),
                    "requesting generative draft"
                );
                let text = generate_with_retry(generator, &prompt, &self.policy, self.sleeper)?;
                Ok(Draft {
                    mode: DraftMode::Generative,
                    text,
                })
            }
            None => Ok(Draft {
                mode: DraftMode::Extractive,
                text: extractive_draft(query, hits),
            }),
        }
    }
}
