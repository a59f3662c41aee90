//! Custom error types for the assistant.

use thiserror::Error;

/// Assistant errors.
#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("API error: {0}")]
    Api(#[from] gigachat_client::GigaChatError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Delivery error: {0}")]
    Delivery(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<String> for AssistantError {
    fn from(err: String) -> Self {
        AssistantError::Internal(err)
    }
}

impl From<AssistantError> for String {
    fn from(err: AssistantError) -> Self {
        err.to_string()
    }
}

/// Result type alias for assistant operations.
pub type AssistantResult<T> = Result<T, AssistantError>;
