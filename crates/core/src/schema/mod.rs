//! Declarative mapping schema files
//!
//! A schema file (YAML or JSON) declares types, their parents and their
//! field descriptors, so a [`Mapper`](crate::Mapper) can be configured
//! without writing Rust. Installed types are backed by [`Record`](crate::Record).
//!
//! # Example
//!
//! ```rust,ignore
//! use objmap_core::{Mapper, MappingSchema};
//!
//! let schema = MappingSchema::from_file("person.schema.yaml")?;
//! let mapper = Mapper::new();
//! let types = schema.install(&mapper)?;
//!
//! let person = types.get("Person").unwrap();
//! let record = mapper.object_of_type(&values, person)?;
//! ```

mod error;
mod install;
mod types;

use std::path::Path;

pub use error::{SchemaError, SchemaResult};
pub use install::SchemaTypes;
pub use types::{FieldSchema, MappingSchema, RequirementSchema, TypeSchema};

impl MappingSchema {
    pub fn from_yaml_str(input: &str) -> SchemaResult<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> SchemaResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a schema file; `.json` files are parsed as JSON, anything else as YAML
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SchemaError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    pub fn to_yaml_string(&self) -> SchemaResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json_string(&self) -> SchemaResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Declared type by name
    pub fn get_type(&self, name: &str) -> Option<&TypeSchema> {
        self.types.iter().find(|t| t.name == name)
    }
}
