//! Error types for scribe.

use thiserror::Error;

/// Result type alias using scribe's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for scribe operations.
///
/// Variants fall into three groups that callers treat differently:
///
/// | Group | Variants | Surfaced as |
/// |-------|----------|-------------|
/// | ingestion | `TranscriptUnavailable`, `InvalidInput`, `Conflict` | synchronous error to the `ingest` caller |
/// | transformation | `Inference`, `Serialization`, `Timeout`, `NotFound`, `Job` | recorded on the failed job |
/// | infrastructure | `Database`, `Request`, `Io`, `Config`, `Internal` | recorded on the failed job, logged as an outage |
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Content source not found
    #[error("Content not found: {0}")]
    ContentNotFound(uuid::Uuid),

    /// No transcript could be acquired for a link
    #[error("No transcript available: {0}")]
    TranscriptUnavailable(String),

    /// Inference/generation failed or returned unusable output
    #[error("Inference error: {0}")]
    Inference(String),

    /// An external call exceeded its time budget
    #[error("Timed out: {0}")]
    Timeout(String),

    /// Job ledger error
    #[error("Job error: {0}")]
    Job(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A uniqueness rule rejected the write
    #[error("Conflict: {0}")]
    Conflict(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error indicates an outage of a backing service rather
    /// than bad input or unusable model output.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Error::Database(_)
                | Error::Request(_)
                | Error::Io(_)
                | Error::Config(_)
                | Error::Internal(_)
        )
    }

    /// Short classification label used in structured logs.
    pub fn kind(&self) -> &'static str {
        if self.is_infrastructure() {
            "infrastructure"
        } else {
            match self {
                Error::TranscriptUnavailable(_) | Error::InvalidInput(_) | Error::Conflict(_) => {
                    "ingestion"
                }
                _ => "transformation",
            }
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::Request(e.to_string())
        }
    }
}
