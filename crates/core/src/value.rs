//! In-process field values
//!
//! External data arrives as `serde_json::Value`. After the forward pipeline
//! runs, descriptor-covered fields hold a [`FieldValue`], which adds dates and
//! nested mapped objects to the JSON scalar set.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde_json::{Map, Number, Value};

use crate::object::{Mappable, downcast};

/// Internal value of a descriptor-covered field
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Explicit "no value" (JSON `null`)
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Date(NaiveDate),
    DateTime(DateTime<Utc>),
    /// Nested mapped instance
    Object(Box<dyn Mappable>),
    List(Vec<FieldValue>),
    Map(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// Short name of the value's kind, used in error messages
    pub fn type_name(&self) -> String {
        match self {
            FieldValue::Null => "null".to_string(),
            FieldValue::Bool(_) => "bool".to_string(),
            FieldValue::Integer(_) => "integer".to_string(),
            FieldValue::Float(_) => "number".to_string(),
            FieldValue::String(_) => "string".to_string(),
            FieldValue::Date(_) => "date".to_string(),
            FieldValue::DateTime(_) => "date-time".to_string(),
            FieldValue::Object(object) => object.type_info().name().to_string(),
            FieldValue::List(_) => "list".to_string(),
            FieldValue::Map(_) => "map".to_string(),
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric view; integers are widened
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&dyn Mappable> {
        match self {
            FieldValue::Object(object) => Some(object.as_ref()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[FieldValue]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, FieldValue>> {
        match self {
            FieldValue::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Take a nested instance out as its concrete type
    pub fn into_object<T: Mappable>(self) -> Option<T> {
        match self {
            FieldValue::Object(object) => downcast(object),
            _ => None,
        }
    }

    /// Take a list of nested instances out as their concrete type
    ///
    /// `Null` yields an empty list; any element of another type yields `None`.
    pub fn into_objects<T: Mappable>(self) -> Option<Vec<T>> {
        match self {
            FieldValue::Null => Some(Vec::new()),
            FieldValue::List(items) => items
                .into_iter()
                .map(FieldValue::into_object::<T>)
                .collect(),
            _ => None,
        }
    }

    /// Convert into a plain Rust type
    pub fn extract<T: FromField>(self) -> Result<T, String> {
        T::from_field(self)
    }

    /// Structural conversion from JSON, without any descriptor applied
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Integer(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::String(s.clone()),
            Value::Array(items) => FieldValue::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => FieldValue::Map(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Structural conversion to JSON
    ///
    /// Dates use ISO 8601 (`2014-06-01`, `2014-06-01T09:34:45Z`), non-finite
    /// floats become `null`, nested objects use [`Mappable::passthrough`].
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Integer(i) => Value::Number(Number::from(*i)),
            FieldValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
            FieldValue::String(s) => Value::String(s.clone()),
            FieldValue::Date(d) => Value::String(d.format("%Y-%m-%d").to_string()),
            FieldValue::DateTime(dt) => {
                Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            FieldValue::Object(object) => object.passthrough(),
            FieldValue::List(items) => Value::Array(items.iter().map(Self::to_json).collect()),
            FieldValue::Map(entries) => {
                let map: Map<String, Value> = entries
                    .iter()
                    .map(|(key, value)| (key.clone(), value.to_json()))
                    .collect();
                Value::Object(map)
            }
        }
    }

    /// Value equality for scalars and collections of scalars
    ///
    /// Nested objects never compare equal; they have no identity the mapper
    /// can observe.
    pub fn same_as(&self, other: &FieldValue) -> bool {
        match (self, other) {
            (FieldValue::Null, FieldValue::Null) => true,
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Integer(b)) => a == b,
            (FieldValue::Float(a), FieldValue::Float(b)) => a == b,
            (FieldValue::Integer(a), FieldValue::Float(b))
            | (FieldValue::Float(b), FieldValue::Integer(a)) => (*a as f64) == *b,
            (FieldValue::String(a), FieldValue::String(b)) => a == b,
            (FieldValue::Date(a), FieldValue::Date(b)) => a == b,
            (FieldValue::DateTime(a), FieldValue::DateTime(b)) => a == b,
            (FieldValue::List(a), FieldValue::List(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
            }
            (FieldValue::Map(a), FieldValue::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_as(vb))
            }
            _ => false,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<i32> for FieldValue {
    fn from(value: i32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<u32> for FieldValue {
    fn from(value: u32) -> Self {
        FieldValue::Integer(i64::from(value))
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::String(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::String(value.to_string())
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(value: NaiveDate) -> Self {
        FieldValue::Date(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::DateTime(value)
    }
}

impl From<Box<dyn Mappable>> for FieldValue {
    fn from(value: Box<dyn Mappable>) -> Self {
        FieldValue::Object(value)
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(FieldValue::Null, Into::into)
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(value: Vec<T>) -> Self {
        FieldValue::List(value.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<BTreeMap<String, T>> for FieldValue {
    fn from(value: BTreeMap<String, T>) -> Self {
        FieldValue::Map(value.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Wrap a nested instance
pub fn object<T: Mappable>(value: T) -> FieldValue {
    FieldValue::Object(Box::new(value))
}

/// Wrap a list of nested instances
pub fn objects<T: Mappable>(values: impl IntoIterator<Item = T>) -> FieldValue {
    FieldValue::List(values.into_iter().map(object).collect())
}

/// Conversion from a [`FieldValue`] into a plain Rust type
pub trait FromField: Sized {
    fn from_field(value: FieldValue) -> Result<Self, String>;
}

fn mismatch(expected: &str, value: &FieldValue) -> String {
    format!("expected {}, found {}", expected, value.type_name())
}

impl FromField for FieldValue {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        Ok(value)
    }
}

impl FromField for bool {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl FromField for i64 {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        value.as_i64().ok_or_else(|| mismatch("integer", &value))
    }
}

impl FromField for f64 {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        value.as_f64().ok_or_else(|| mismatch("number", &value))
    }
}

impl FromField for String {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl FromField for NaiveDate {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::Date(d) => Ok(d),
            other => Err(mismatch("date", &other)),
        }
    }
}

impl FromField for DateTime<Utc> {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::DateTime(dt) => Ok(dt),
            other => Err(mismatch("date-time", &other)),
        }
    }
}

impl<T: FromField> FromField for Option<T> {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::Null => Ok(None),
            other => T::from_field(other).map(Some),
        }
    }
}

impl<T: FromField> FromField for Vec<T> {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::Null => Ok(Vec::new()),
            FieldValue::List(items) => items.into_iter().map(T::from_field).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl<T: FromField> FromField for BTreeMap<String, T> {
    fn from_field(value: FieldValue) -> Result<Self, String> {
        match value {
            FieldValue::Null => Ok(BTreeMap::new()),
            FieldValue::Map(entries) => entries
                .into_iter()
                .map(|(key, value)| T::from_field(value).map(|v| (key, v)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}
