//! Type descriptions inferred from a sample document

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use super::config::GeneratorConfig;
use super::error::{GeneratorError, GeneratorResult};
use super::naming::{singularize, snake_case, type_name};
use crate::mapping::{FieldKind, json_kind};

static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})$").unwrap()
});

/// Inferred type of a field (or of each element of a list field)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FieldType {
    Any,
    Bool,
    Integer,
    Number,
    String,
    Date,
    DateTime,
    /// Generated type, by name
    Object(String),
}

impl FieldType {
    /// Type name as written in mapping schema files
    pub fn schema_name(&self) -> &str {
        match self {
            FieldType::Any => "any",
            FieldType::Bool => "bool",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
            FieldType::Object(name) => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescription {
    /// Key in the sample document
    pub external_key: String,
    /// Generated field name
    pub internal_key: String,
    pub field_type: FieldType,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDescription {
    pub name: String,
    pub fields: Vec<FieldDescription>,
}

impl TypeDescription {
    pub fn field(&self, external_key: &str) -> Option<&FieldDescription> {
        self.fields.iter().find(|f| f.external_key == external_key)
    }

    /// Generated types this type refers to
    pub fn nested_types(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter_map(|f| match &f.field_type {
                FieldType::Object(name) => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Parse `input` as JSON and describe it
pub fn describe_str(input: &str, config: &GeneratorConfig) -> GeneratorResult<Vec<TypeDescription>> {
    let document: Value = serde_json::from_str(input)?;
    describe_document(&document, config)
}

/// Describe the types needed to map `document`
///
/// Nested objects become their own types, named after their key; arrays of
/// objects become list fields of a type named after the singular key. Types
/// are returned children first, root last.
pub fn describe_document(
    document: &Value,
    config: &GeneratorConfig,
) -> GeneratorResult<Vec<TypeDescription>> {
    let root = match document {
        Value::Object(map) if !map.is_empty() => map,
        Value::Object(_) => return Err(GeneratorError::InvalidRoot("an empty object".to_string())),
        other => return Err(GeneratorError::InvalidRoot(json_kind(other).to_string())),
    };

    let mut describer = Describer {
        config,
        types: Vec::new(),
        seen: HashSet::new(),
    };
    describer.describe_object(type_name(&config.prefix, &config.root_name), root, 0)?;

    debug!(types = describer.types.len(), "Described sample document");
    Ok(describer.types)
}

struct Describer<'a> {
    config: &'a GeneratorConfig,
    types: Vec<TypeDescription>,
    seen: HashSet<String>,
}

impl Describer<'_> {
    fn describe_object(&mut self, name: String, map: &Map<String, Value>, depth: usize) -> GeneratorResult<()> {
        if depth > self.config.max_depth {
            return Err(GeneratorError::MaxDepthExceeded {
                depth,
                max: self.config.max_depth,
            });
        }
        // first occurrence of a type name wins
        if !self.seen.insert(name.clone()) {
            return Ok(());
        }

        let mut fields = Vec::with_capacity(map.len());
        for (key, value) in map {
            let (field_type, kind) = match value {
                Value::Array(items) => {
                    let objects: Vec<&Map<String, Value>> =
                        items.iter().filter_map(Value::as_object).collect();
                    if objects.is_empty() {
                        let element = items
                            .iter()
                            .find(|item| !item.is_null())
                            .map_or(FieldType::Any, |item| self.scalar_type(item));
                        (element, FieldKind::List)
                    } else {
                        let nested = type_name(&self.config.prefix, &singularize(key));
                        self.describe_object(nested.clone(), &merge(&objects), depth + 1)?;
                        (FieldType::Object(nested), FieldKind::List)
                    }
                }
                Value::Object(inner) if !inner.is_empty() => {
                    let nested = type_name(&self.config.prefix, key);
                    self.describe_object(nested.clone(), inner, depth + 1)?;
                    (FieldType::Object(nested), FieldKind::Scalar)
                }
                other => (self.scalar_type(other), FieldKind::Scalar),
            };

            fields.push(FieldDescription {
                external_key: key.clone(),
                internal_key: snake_case(key),
                field_type,
                kind,
            });
        }

        self.types.push(TypeDescription { name, fields });
        Ok(())
    }

    fn scalar_type(&self, value: &Value) -> FieldType {
        match value {
            Value::Bool(_) => FieldType::Bool,
            Value::Number(n) if n.is_i64() || n.is_u64() => FieldType::Integer,
            Value::Number(_) => FieldType::Number,
            Value::String(s) if self.config.detect_dates && DATETIME_REGEX.is_match(s) => {
                FieldType::DateTime
            }
            Value::String(s) if self.config.detect_dates && DATE_REGEX.is_match(s) => FieldType::Date,
            Value::String(_) => FieldType::String,
            _ => FieldType::Any,
        }
    }
}

/// Union of keys across sample objects; first non-null value per key wins
fn merge(objects: &[&Map<String, Value>]) -> Map<String, Value> {
    let mut merged = Map::new();
    for object in objects {
        for (key, value) in object.iter() {
            let replace = match merged.get(key) {
                None => true,
                Some(existing) => existing.is_null() && !value.is_null(),
            };
            if replace {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
    merged
}
