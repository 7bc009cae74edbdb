//! CLI command implementations

pub mod apply;
pub mod generate;
pub mod validate;

use std::io::Read;
use std::path::{Path, PathBuf};

use objmap_core::{Mapper, MappingSchema, TypeRef};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::CliError;

/// Read input from a file, or from stdin when `input` is `-`
pub(crate) fn read_input(input: &str) -> Result<String, CliError> {
    if input == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| CliError::InvalidArgument(format!("Failed to read stdin: {}", e)))?;
        Ok(content)
    } else {
        let path = PathBuf::from(input);
        std::fs::read_to_string(&path).map_err(|e| CliError::FileReadError(path, e.to_string()))
    }
}

/// Parse a document; `.yaml`/`.yml` files as YAML, everything else (and stdin) as JSON
pub(crate) fn parse_document(input: &str, content: &str) -> Result<Value, CliError> {
    let is_yaml = Path::new(input)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "yaml" | "yml"));

    if is_yaml {
        serde_yaml::from_str(content).map_err(|e| CliError::ParseError(e.to_string()))
    } else {
        serde_json::from_str(content).map_err(|e| CliError::ParseError(e.to_string()))
    }
}

/// Split a document into labelled objects: a single object, or an array of objects
pub(crate) fn documents(value: Value) -> Result<Vec<(String, Map<String, Value>)>, CliError> {
    match value {
        Value::Object(map) => Ok(vec![("document".to_string(), map)]),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::Object(map) => Ok((format!("document[{}]", index), map)),
                other => Err(CliError::ParseError(format!(
                    "document[{}] is not an object: {}",
                    index, other
                ))),
            })
            .collect(),
        other => Err(CliError::ParseError(format!(
            "expected an object or an array of objects, found {}",
            other
        ))),
    }
}

/// Install `schema` into a fresh mapper and resolve `type_name`
pub(crate) fn load_schema_type(schema: &Path, type_name: &str) -> Result<(Mapper, TypeRef), CliError> {
    let schema = MappingSchema::from_file(schema)?;
    let mapper = Mapper::new();
    let types = schema.install(&mapper)?;
    debug!(types = types.len(), "Loaded mapping schema");

    let ty = types
        .get(type_name)
        .cloned()
        .ok_or_else(|| CliError::UnknownType(type_name.to_string()))?;
    Ok((mapper, ty))
}
