//! Generative text capability and its Gemini implementation.
//!
//! Defines the [`TextGenerator`] trait the composer drafts through, plus
//! [`GeminiGenerator`], a blocking client for the Gemini
//! `generateContent` REST endpoint.
//!
//! # Provider Selection
//!
//! Use [`create_generator`] to instantiate the configured provider. A
//! `"disabled"` provider yields `None`, which selects the extractive draft.
//!
//! ```rust
//! # use onepager::config::GenerationConfig;
//! # use onepager::generation::create_generator;
//! let config = GenerationConfig::default(); // provider = "disabled"
//! assert!(create_generator(&config).unwrap().is_none());
//! ```
//!
//! # Failure Classification
//!
//! - HTTP 429, or a body reporting `RESOURCE_EXHAUSTED` → [`GenerationError::RateLimited`]
//! - Any other non-success status, network error, or malformed body → [`GenerationError::Other`]
//!
//! Retrying is the composer's job; generators make exactly one call.

use anyhow::{bail, Result};
use std::time::Duration;

use crate::config::GenerationConfig;
use crate::error::GenerationError;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// A fallible text generation backend.
///
/// Implementations must be safe to call from several queries at once if
/// the caller shares one instance across threads.
pub trait TextGenerator: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-2.0-flash"`).
    fn model_name(&self) -> &str;

    /// Generate a completion for `prompt`, returning the raw response text.
    fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError>;
}

/// Create the configured generator, or `None` when generation is disabled.
///
/// # Errors
///
/// Returns an error for an unknown provider or when the API key variable
/// named by `api_key_env` is unset.
pub fn create_generator(config: &GenerationConfig) -> Result<Option<Box<dyn TextGenerator>>> {
    if !config.is_enabled() {
        return Ok(None);
    }
    match config.provider.as_str() {
        "gemini" => Ok(Some(Box::new(GeminiGenerator::new(config)?))),
        other => bail!("Unknown generation provider: {}", other),
    }
}

// ============ Gemini ============

/// Blocking client for `POST {model}:generateContent`.
pub struct GeminiGenerator {
    model: String,
    api_key: String,
    client: reqwest::blocking::Client,
}

impl GeminiGenerator {
    pub fn new(config: &GenerationConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            anyhow::anyhow!("{} environment variable not set", config.api_key_env)
        })?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            model: config.model.clone(),
            api_key,
            client,
        })
    }
}

impl TextGenerator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn generate(&self, prompt: &str) -> std::result::Result<String, GenerationError> {
        let url = format!("{}/{}:generateContent", GEMINI_API_BASE, self.model);
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
        });

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .map_err(|e| GenerationError::Other(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &body_text));
        }

        let json: serde_json::Value = response
            .json()
            .map_err(|e| GenerationError::Other(format!("invalid response body: {}", e)))?;
        parse_gemini_response(&json)
    }
}

/// Map a non-success HTTP response to a failure kind.
pub fn classify_failure(status: u16, body: &str) -> GenerationError {
    let message = format!("Gemini API error {}: {}", status, body);
    if status == 429 || body.contains("RESOURCE_EXHAUSTED") {
        GenerationError::RateLimited(message)
    } else {
        GenerationError::Other(message)
    }
}

/// Concatenate the text parts of the first candidate.
pub fn parse_gemini_response(
    json: &serde_json::Value,
) -> std::result::Result<String, GenerationError> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| GenerationError::Other("response has no candidate content".to_string()))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();

    Ok(text)
}
