//! Apply command implementation
//!
//! Builds an instance of the requested type from each input document and
//! prints either its projection (external keys) or its encoded state
//! (internal keys).

use std::path::PathBuf;

use objmap_core::{Mapper, StateMap, TypeRef, pretty_error};
use serde_json::{Map, Value};
use tracing::info;

use super::{documents, load_schema_type, parse_document, read_input};
use crate::error::CliError;
use crate::output::{OutputFormat, render_value, write_output};

/// Arguments for the `apply` command
pub struct ApplyArgs {
    /// Mapping schema file
    pub schema: PathBuf,
    /// Type to construct
    pub type_name: String,
    /// Input document, or `-` for stdin
    pub input: String,
    /// Projection keys; empty means the type's defaults
    pub keys: Vec<String>,
    /// Emit encoded state instead of the projection
    pub state: bool,
    pub format: OutputFormat,
    /// Output file; stdout when not given
    pub output: Option<PathBuf>,
}

/// Map one document through the type and back out
pub fn apply_document(
    mapper: &Mapper,
    ty: &TypeRef,
    values: &Map<String, Value>,
    keys: &[String],
    state: bool,
) -> Result<Value, objmap_core::MappingError> {
    let instance = mapper.object_of_type(values, ty)?;

    if state {
        let mut encoded = StateMap::new();
        mapper.encode(instance.as_ref(), &mut encoded);
        return Ok(Value::Object(encoded.into_inner()));
    }

    Ok(if keys.is_empty() {
        mapper.projection(instance.as_ref())
    } else {
        mapper.projection_for_keys(instance.as_ref(), keys)
    })
}

/// Handle the `apply` command
pub fn handle_apply(args: &ApplyArgs) -> Result<(), CliError> {
    let (mapper, ty) = load_schema_type(&args.schema, &args.type_name)?;
    let content = read_input(&args.input)?;
    let parsed = parse_document(&args.input, &content)?;
    let single = parsed.is_object();
    let docs = documents(parsed)?;

    info!(documents = docs.len(), type_name = %ty.name(), "Applying input");

    let mut results = Vec::with_capacity(docs.len());
    for (label, values) in &docs {
        let result = apply_document(&mapper, &ty, values, &args.keys, args.state).map_err(|error| {
            CliError::ApplyFailed {
                document: label.clone(),
                reason: pretty_error(&error).trim_end().to_string(),
            }
        })?;
        results.push(result);
    }

    let value = if single {
        results.pop().unwrap_or(Value::Null)
    } else {
        Value::Array(results)
    };
    write_output(&render_value(&value, args.format)?, args.output.as_deref())
}
