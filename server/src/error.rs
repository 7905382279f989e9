//! Error types for the recommendation server.

use crate::rpc::protocol::JsonRpcError;
use assessment_core::RecommendError;
use thiserror::Error;

/// Errors that can occur while serving a request.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("{0}")]
    Recommend(#[from] RecommendError),

    #[error("Invalid params: {0}")]
    InvalidParams(String),

    #[error("Worker task failed: {0}")]
    Task(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServerError {
    pub fn invalid_params(msg: impl Into<String>) -> Self {
        Self::InvalidParams(msg.into())
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        Self::Task(err.to_string())
    }
}

impl From<ServerError> for JsonRpcError {
    fn from(err: ServerError) -> Self {
        match &err {
            ServerError::InvalidParams(_) => JsonRpcError::invalid_params(err.to_string()),
            ServerError::Recommend(inner) if inner.is_client_error() => {
                JsonRpcError::invalid_params(err.to_string())
            }
            ServerError::Recommend(RecommendError::NotInitialized) => {
                JsonRpcError::not_initialized(err.to_string())
            }
            _ => JsonRpcError::internal_error(err.to_string()),
        }
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
