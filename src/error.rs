//! Error taxonomy for ingestion, chunking, and generation.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no supported files found in {} (pdf/txt/md)", .root.display())]
    NoSourcesFound { root: PathBuf },

    #[error("invalid chunk config: overlap ({overlap}) must be smaller than chunk_size ({chunk_size})")]
    InvalidChunkConfig { chunk_size: usize, overlap: usize },

    #[error("failed to extract {}: {source}", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: crate::extract::ExtractError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("invalid glob: {0}")]
    Glob(#[from] globset::Error),

    #[error(transparent)]
    Generation(#[from] GenerationError),
}

/// Failure reported by a [`TextGenerator`](crate::generation::TextGenerator).
///
/// Only [`GenerationError::RateLimited`] is retried by the composer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation rate limited: {0}")]
    RateLimited(String),

    #[error("generation failed: {0}")]
    Other(String),
}

impl GenerationError {
    /// Short label used in event payloads.
    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::RateLimited(_) => "rate_limited",
            GenerationError::Other(_) => "other",
        }
    }
}
