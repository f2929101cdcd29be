//! Error types for medrag.
//!
//! This module defines a unified error enum that covers every failure category
//! of the question answering pipeline: configuration, I/O, ingestion,
//! embedding, indexing, prompt rendering and language-model calls.

use thiserror::Error;

/// Unified error type for medrag.
///
/// All fallible functions return `Result<T, AppError>`.
/// We never panic, errors must be represented and propagated.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Language-model provider errors (network, credentials, bad responses, timeouts)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding provider errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index errors
    #[error("Index error: {0}")]
    Index(String),

    /// Source document ingestion errors
    #[error("Ingest error: {0}")]
    Ingest(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_prefixes() {
        assert_eq!(
            AppError::Llm("timed out".to_string()).to_string(),
            "LLM error: timed out"
        );
        assert_eq!(
            AppError::Index("dimension mismatch".to_string()).to_string(),
            "Index error: dimension mismatch"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_err = serde_yaml::from_str::<Vec<u32>>("not: [a list").unwrap_err();
        let err: AppError = yaml_err.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
