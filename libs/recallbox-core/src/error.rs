//! Error types for recallbox-core.

use thiserror::Error;

/// Result type alias using NormalizeError.
pub type Result<T> = std::result::Result<T, NormalizeError>;

/// Errors that can occur while normalizing raw card JSON.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("expected a JSON array of cards")]
    NotAnArray,

    #[error("card {index} is not a JSON object")]
    NotAnObject { index: usize },

    #[error("duplicate card id {id} at index {index}")]
    DuplicateId { id: String, index: usize },
}
