//! Error types for the extraction pipeline.

use thiserror::Error;

/// Errors produced while isolating SQL from a model response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// Every strategy ran and nothing usable was left.
    #[error("no SQL could be generated from the model response")]
    Empty,
}

/// Result type alias for extraction.
pub type Result<T> = std::result::Result<T, ExtractError>;
