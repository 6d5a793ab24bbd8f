//! Error types for the review analysis core.

use std::time::Duration;

use thiserror::Error;

/// Minimum length (in characters) of sanitized review text accepted by `analyze`.
pub const MIN_REVIEW_CHARS: usize = 10;
/// Longest submitted review accepted by the service, in characters.
pub const MAX_REVIEW_CHARS: usize = 9000;

/// Errors surfaced to the caller of the analysis pipeline.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("review text too short after cleaning ({length} chars, need at least {min})", min = MIN_REVIEW_CHARS)]
    InputTooShort { length: usize },
}

/// Failures of the optional external analysis collaborator.
///
/// These never reach the end caller: the orchestrator logs them and falls back
/// to the heuristic path.
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("external analysis service is not configured")]
    NotConfigured,

    #[error("external analysis timed out after {0:?}")]
    Timeout(Duration),

    #[error("external analysis request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("external analysis returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("external analysis returned no content")]
    EmptyResponse,

    #[error("malformed external analysis payload: {0}")]
    Malformed(String),

    #[error("unparseable external analysis payload: {0}")]
    Parse(#[from] serde_json::Error),
}
