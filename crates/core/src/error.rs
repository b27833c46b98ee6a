//! Error types for Support Bot.
//!
//! One enum covers the whole failure taxonomy of the service: startup
//! configuration, missing index artifacts, embedding failures, index
//! corruption, generation failures and the optional shared-secret gate.

use thiserror::Error;

/// Unified error type for Support Bot.
///
/// All fallible functions return `Result<T, AppError>`. Nothing in the
/// retrieval core retries; every variant propagates to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    /// Missing or invalid configuration / credentials (fatal at startup)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Index artifacts (or the corpus) are absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// The embedding collaborator failed or returned malformed output
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector/chunk arrays disagree, dimensions differ, or a torn artifact pair
    #[error("Index corruption: {0}")]
    Corruption(String),

    /// Language model (generation) errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Shared-secret check failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Caller supplied an unusable request (e.g. an empty question)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

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
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
        assert!(err.to_string().contains("denied"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AppError = parse.into();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            AppError::NotFound("index".to_string()).to_string(),
            "Not found: index"
        );
        assert_eq!(
            AppError::Corruption("3 vectors, 2 chunks".to_string()).to_string(),
            "Index corruption: 3 vectors, 2 chunks"
        );
    }
}
