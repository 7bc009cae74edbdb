//! Error types for mapping schema files

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or installing a mapping schema
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Failed to read schema file
    #[error("Failed to read schema file: {path}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A field or parent names a type the schema does not declare
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    /// Two types share a name
    #[error("Type '{0}' is declared more than once")]
    DuplicateType(String),

    /// Parent links form a loop
    #[error("Inheritance cycle involving type '{0}'")]
    InheritanceCycle(String),

    /// Field declaration is inconsistent
    #[error("Invalid field '{type_name}.{field}': {reason}")]
    InvalidField {
        type_name: String,
        field: String,
        reason: String,
    },

    /// Requirement declaration is empty or malformed
    #[error("Invalid requirement: {0}")]
    InvalidRequirement(String),
}

/// Result type for schema operations
pub type SchemaResult<T> = Result<T, SchemaError>;
