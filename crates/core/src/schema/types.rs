//! Serialized form of mapping schema files

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapping::FieldKind;

/// A set of mapped types
///
/// ```yaml
/// types:
///   - name: Person
///     projection_keys: [name, age]
///     fields:
///       - key: name
///         type: string
///         requires: [{exists: true}]
///       - key: age
///         external_key: person_age
///         type: integer
///         requires: [{greater_than_or_equal_to: 0}]
///   - name: Employee
///     parent: Person
///     fields:
///       - key: level
///         enum: {0: junior, 1: senior}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MappingSchema {
    #[serde(default)]
    pub types: Vec<TypeSchema>,
}

/// One mapped type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSchema>,
    /// Default keys for projections
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projection_keys: Vec<String>,
}

fn any_type() -> String {
    "any".to_string()
}

fn is_scalar(kind: &FieldKind) -> bool {
    *kind == FieldKind::Scalar
}

/// One field descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSchema {
    /// Internal key; also the external key unless `external_key` is set
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_key: Option<String>,
    /// `any`, `bool`, `integer`, `number`, `string`, `date`, `datetime`, or a type name
    #[serde(rename = "type", default = "any_type")]
    pub field_type: String,
    #[serde(default, skip_serializing_if = "is_scalar")]
    pub kind: FieldKind,
    /// Drop duplicate list elements, keeping order
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unique: bool,
    /// Implicit AND of every entry
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub requires: Vec<RequirementSchema>,
    /// Enumerated value -> label
    #[serde(rename = "enum", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub enum_values: BTreeMap<i64, String>,
    /// `rfc3339`, `number`, `date:<pattern>` or `datetime:<pattern>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

impl FieldSchema {
    pub fn new(key: impl Into<String>, field_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            external_key: None,
            field_type: field_type.into(),
            kind: FieldKind::Scalar,
            unique: false,
            requires: Vec::new(),
            enum_values: BTreeMap::new(),
            format: None,
        }
    }
}

/// One requirement entry; every property set in the entry must hold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementSchema {
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub exists: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greater_than: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub greater_than_or_equal_to: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal_to: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub less_than: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub less_than_or_equal_to: Option<f64>,
    /// Regular expression for string values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<String>,
    /// Any of the groups must pass; each group is an AND
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub either: Option<Vec<Vec<RequirementSchema>>>,
    /// The AND of these must fail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub not: Option<Vec<RequirementSchema>>,
}

impl RequirementSchema {
    pub fn exists() -> Self {
        Self {
            exists: true,
            ..Self::default()
        }
    }
}
