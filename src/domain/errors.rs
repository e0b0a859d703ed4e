//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Forum gateway error: {0}")]
    Forum(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("AI request failed: {0}")]
    Ai(String),

    /// Model answered, but the payload is unusable (bad JSON, wrong length, echo mismatch).
    /// Retried by the classifier like a transport failure.
    #[error("Invalid AI response: {0}")]
    InvalidResponse(String),

    /// Model answered with no content at all.
    #[error("AI response had no content")]
    EmptyResponse,

    #[error("Export error: {0}")]
    Export(String),

    #[error("Configuration error: {0}")]
    Config(String),
}
