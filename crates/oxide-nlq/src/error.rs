//! Error types for the assistant.

use std::path::PathBuf;

use oxide_nlq_core::ExtractError;

/// Errors that can occur while answering a question.
#[derive(Debug, thiserror::Error)]
pub enum AssistantError {
    /// Database error while connecting, introspecting or bootstrapping.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The model service could not be reached or answered with an error.
    #[error("Model service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Transport error talking to the model service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error (reading rule files or model output).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The model response contained no usable SQL.
    #[error("No SQL could be generated for this question")]
    NoSqlGenerated,

    /// The question was blank.
    #[error("Please enter a question")]
    EmptyQuestion,

    /// Another question is still being answered.
    #[error("A question is already being answered; wait for it to finish")]
    Busy,

    /// An ambiguity rule file could not be loaded.
    #[error("Invalid rule file '{path}': {message}")]
    InvalidRules {
        /// Path to the rule file.
        path: PathBuf,
        /// Error message.
        message: String,
    },

    /// The background task answering a question panicked or was aborted.
    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<ExtractError> for AssistantError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::Empty => Self::NoSqlGenerated,
        }
    }
}

/// Result type for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;
