//! Error types for descriptor generation

use thiserror::Error;

/// Errors that can occur while generating descriptors from a sample
#[derive(Error, Debug, Clone)]
pub enum GeneratorError {
    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonParse(String),

    /// Root is not a non-empty object
    #[error("Expected a non-empty object as root, found {0}")]
    InvalidRoot(String),

    /// Maximum depth exceeded
    #[error("Maximum nesting depth exceeded: {depth} > {max}")]
    MaxDepthExceeded { depth: usize, max: usize },
}

impl From<serde_json::Error> for GeneratorError {
    fn from(e: serde_json::Error) -> Self {
        GeneratorError::JsonParse(e.to_string())
    }
}

/// Result type for generator operations
pub type GeneratorResult<T> = Result<T, GeneratorError>;
