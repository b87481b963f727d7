// src/error.rs

//! Unified error handling for the scraper application.
//!
//! Two layers live here:
//! - [`AppError`]: run-level errors. These abort the whole run.
//! - [`FetchError`]: per-question failures. These travel through the
//!   pipeline as data and are only ever logged.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for scraper operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client setup or request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Pipeline shutdown was sequenced out of order
    #[error("Shutdown error: {0}")]
    Shutdown(String),

    /// A pipeline task panicked or was cancelled
    #[error("Task error in {task}: {message}")]
    Task { task: String, message: String },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a shutdown sequencing error.
    pub fn shutdown(message: impl Into<String>) -> Self {
        Self::Shutdown(message.into())
    }

    /// Create a task error with context.
    pub fn task(task: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Task {
            task: task.into(),
            message: message.to_string(),
        }
    }
}

/// Why fetching a single question did not produce a record.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, request or body transfer failed
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    /// Server answered with something other than 200 OK
    #[error("received status {0}")]
    BadStatus(StatusCode),

    /// Body was not a valid question payload
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// Body decoded, but describes a different question
    #[error("response carries question {found}, expected {expected}")]
    IdMismatch { expected: u32, found: i64 },
}

impl FetchError {
    /// The coarse failure category.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Transport(_) => FailureKind::Transport,
            Self::BadStatus(_) => FailureKind::BadStatus,
            Self::Decode(_) | Self::IdMismatch { .. } => FailureKind::Decode,
        }
    }

    /// HTTP status for `BadStatus` failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::BadStatus(status) => Some(*status),
            _ => None,
        }
    }
}

/// Failure categories tallied by the error sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Transport,
    BadStatus,
    Decode,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Transport => "transport",
            Self::BadStatus => "bad-status",
            Self::Decode => "decode",
        };
        f.write_str(name)
    }
}

/// A failed fetch, tagged with the question it belongs to.
#[derive(Error, Debug)]
#[error("failed to retrieve question {id}: {error}")]
pub struct FetchFailure {
    pub id: u32,
    #[source]
    pub error: FetchError,
}

impl FetchFailure {
    pub fn new(id: u32, error: FetchError) -> Self {
        Self { id, error }
    }

    pub fn kind(&self) -> FailureKind {
        self.error.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> serde_json::Error {
        serde_json::from_str::<serde_json::Value>("{not json").unwrap_err()
    }

    #[test]
    fn test_kind_mapping() {
        assert_eq!(
            FetchError::BadStatus(StatusCode::INTERNAL_SERVER_ERROR).kind(),
            FailureKind::BadStatus
        );
        assert_eq!(FetchError::Decode(decode_error()).kind(), FailureKind::Decode);
        assert_eq!(
            FetchError::IdMismatch {
                expected: 1000,
                found: 7
            }
            .kind(),
            FailureKind::Decode
        );
    }

    #[test]
    fn test_failure_message_names_question() {
        let failure = FetchFailure::new(1002, FetchError::BadStatus(StatusCode::INTERNAL_SERVER_ERROR));
        let message = failure.to_string();
        assert!(message.contains("1002"));
        assert!(message.contains("500"));
        assert_eq!(failure.error.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(FailureKind::Transport.to_string(), "transport");
        assert_eq!(FailureKind::BadStatus.to_string(), "bad-status");
        assert_eq!(FailureKind::Decode.to_string(), "decode");
    }
}
