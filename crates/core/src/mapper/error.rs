//! Error types for mapping operations

use std::collections::BTreeMap;
use std::fmt::{self, Write};

use thiserror::Error;

use crate::value::FieldValue;

/// Errors that can occur while validating or applying values
#[derive(Error, Debug, Clone)]
pub enum MappingError {
    /// One or more fields failed; keyed by internal key
    #[error("Invalid values: {0}")]
    InvalidValues(ValidationErrors),

    /// A transform or assignment could not be performed
    #[error("Transformation failed: {0}")]
    TransformationFailed(String),

    /// Value is not of the declared type
    #[error("Unexpected type: expected {expected}, found {found}")]
    UnexpectedType { expected: String, found: String },

    /// A requirement or the instance's self-validation rejected the value
    #[error("Requirement failed: {0}")]
    RequirementFailed(String),

    /// Factory or default construction failed
    #[error("Failed to initialize {type_name}: {reason}")]
    InitializationFailed { type_name: String, reason: String },
}

impl MappingError {
    /// Field errors, if this is an aggregated validation failure
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            MappingError::InvalidValues(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type for mapping operations
pub type MappingResult<T> = Result<T, MappingError>;

/// Aggregated per-field failures of one validation pass
///
/// Also carries the values that did pass, so callers can report partial
/// results (for collections: the accepted elements).
#[derive(Debug, Clone, Default)]
pub struct ValidationErrors {
    errors: BTreeMap<String, MappingError>,
    accepted: BTreeMap<String, FieldValue>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, error: MappingError) {
        self.errors.insert(key.into(), error);
    }

    pub(crate) fn accept(&mut self, key: impl Into<String>, value: FieldValue) {
        self.accepted.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&MappingError> {
        self.errors.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.errors.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingError)> {
        self.errors.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Values that passed validation, keyed like the errors
    pub fn accepted(&self) -> &BTreeMap<String, FieldValue> {
        &self.accepted
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (key, error) in &self.errors {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            write!(f, "{}: {}", key, error)?;
        }
        Ok(())
    }
}

/// Render an error as an indented tree, one line per failing field
pub fn pretty_error(error: &MappingError) -> String {
    let mut out = String::new();
    write_pretty(&mut out, error, 0);
    out
}

fn write_pretty(out: &mut String, error: &MappingError, depth: usize) {
    match error {
        MappingError::InvalidValues(errors) => {
            if depth == 0 {
                let _ = writeln!(out, "Invalid values ({} field(s)):", errors.len());
            }
            for (key, nested) in errors.iter() {
                let indent = "  ".repeat(depth + 1);
                match nested {
                    MappingError::InvalidValues(inner) => {
                        let _ = writeln!(out, "{}{}: {} invalid element(s)", indent, key, inner.len());
                        write_pretty(out, nested, depth + 1);
                    }
                    other => {
                        let _ = writeln!(out, "{}{}: {}", indent, key, other);
                    }
                }
            }
        }
        other => {
            let _ = writeln!(out, "{}", other);
        }
    }
}
