//! Error types for assessment-core

use thiserror::Error;

/// Errors that can occur in the recommendation pipeline
#[derive(Debug, Error)]
pub enum RecommendError {
    /// Missing or corrupt artifacts, or artifacts that disagree with each other
    #[error("Initialization error: {0}")]
    Initialization(String),

    /// Search was attempted against an index holding no vectors
    #[error("Vector store is not initialized")]
    NotInitialized,

    /// Query vector and stored vectors have different lengths
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Encoder input was empty after trimming
    #[error("Input text is empty")]
    EmptyInput,

    /// Query rejected before reaching the pipeline
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// The embedding model failed
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary artifact decoding error
    #[error("Serialization error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl RecommendError {
    /// Create an initialization error
    pub fn initialization(msg: impl Into<String>) -> Self {
        Self::Initialization(msg.into())
    }

    /// Create an invalid query error
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Create an encoding error
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// True when the caller sent something unusable, as opposed to a pipeline failure
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::EmptyInput | Self::InvalidQuery(_))
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, RecommendError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_dimension_mismatch() {
        let err = RecommendError::DimensionMismatch {
            expected: 384,
            actual: 256,
        };
        assert_eq!(err.to_string(), "Dimension mismatch: expected 384, got 256");
    }

    #[test]
    fn test_display_invalid_query() {
        let err = RecommendError::invalid_query("too short");
        assert_eq!(err.to_string(), "Invalid query: too short");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(RecommendError::EmptyInput.is_client_error());
        assert!(RecommendError::invalid_query("x").is_client_error());
        assert!(!RecommendError::encoding("model crashed").is_client_error());
        assert!(!RecommendError::NotInitialized.is_client_error());
        assert!(!RecommendError::initialization("missing file").is_client_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RecommendError = io_err.into();
        assert!(matches!(err, RecommendError::Io(_)));
    }
}
