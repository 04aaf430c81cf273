//! Error taxonomy for one chat turn.
//!
//! Upstream failures are typed so the loop can decide what to absorb:
//! search failures never leave the loop, a single completion failure is retried
//! without tools, and only [`ChatError`] ever reaches the caller.

use thiserror::Error;

/// User-facing text for any failure that is not a validation problem.
pub const SERVICE_UNAVAILABLE_TEXT: &str = "Something went wrong. Please try again.";

/// Completion capability failure (kind `CompletionUnavailable`).
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion transport error: {0}")]
    Transport(String),
    #[error("completion API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("completion response could not be parsed: {0}")]
    MalformedResponse(String),
    #[error("completion response has no choices")]
    EmptyChoices,
}

/// Search capability failure (kind `SearchUnavailable`).
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search is not configured: {0}")]
    NotConfigured(String),
    #[error("search transport error: {0}")]
    Transport(String),
    #[error("search API returned {status}")]
    Status { status: u16 },
    #[error("search response could not be parsed: {0}")]
    MalformedResponse(String),
}

/// Tool argument payload rejected by the declared schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ToolArgumentError {
    #[error("arguments are not a valid JSON object: {0}")]
    InvalidJson(String),
    #[error("`query` must be a non-empty string")]
    EmptyQuery,
}

/// Failure surfaced to the caller of a chat turn.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Rejected before the loop runs (missing or blank message).
    #[error("invalid request: {0}")]
    Validation(String),
    /// Repeated completion failure or request budget exceeded.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl ChatError {
    /// Polite, non-technical text suitable for the response body.
    pub fn user_message(&self) -> &str {
        match self {
            Self::Validation(message) => message,
            Self::ServiceUnavailable(_) => SERVICE_UNAVAILABLE_TEXT,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
