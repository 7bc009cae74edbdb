//! Error types for the CLI

use std::path::PathBuf;

use objmap_core::{GeneratorError, SchemaError};
use thiserror::Error;

/// Errors reported by CLI commands
#[derive(Error, Debug)]
pub enum CliError {
    /// Failed to read an input file
    #[error("Failed to read {0}: {1}")]
    FileReadError(PathBuf, String),

    /// Failed to write an output file
    #[error("Failed to write {0}: {1}")]
    FileWriteError(PathBuf, String),

    /// Bad command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Input document could not be parsed
    #[error("Failed to parse input: {0}")]
    ParseError(String),

    /// Schema file could not be loaded or installed
    #[error("Schema error: {0}")]
    SchemaError(#[from] SchemaError),

    /// Sample document could not be described
    #[error("Generator error: {0}")]
    GeneratorError(#[from] GeneratorError),

    /// Requested type is not declared by the schema
    #[error("Type '{0}' is not declared in the schema")]
    UnknownType(String),

    /// One or more documents failed validation
    #[error("{failed} of {total} document(s) failed validation")]
    ValidationFailed { failed: usize, total: usize },

    /// A document could not be applied
    #[error("Failed to apply {document}: {reason}")]
    ApplyFailed { document: String, reason: String },
}
