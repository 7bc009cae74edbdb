//! Value transforms between external JSON and internal field values

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::value::FieldValue;

/// Bidirectional value transform
///
/// `transform` maps an external value to its internal form; `reverse` is
/// used when building projections and persisted state. Errors are plain
/// messages, wrapped by the mapper into `MappingError::TransformationFailed`.
pub trait Transformer: Send + Sync {
    fn transform(&self, value: &Value) -> Result<FieldValue, String>;

    fn reverse(&self, value: &FieldValue) -> Result<Value, String>;
}

/// String <-> value conversion, e.g. dates or localized numbers
pub trait Formatter: Send + Sync {
    fn value_for_string(&self, input: &str) -> Result<FieldValue, String>;

    fn string_for_value(&self, value: &FieldValue) -> Result<String, String>;
}

type ForwardFn = Arc<dyn Fn(&Value) -> Result<FieldValue, String> + Send + Sync>;
type ReverseFn = Arc<dyn Fn(&FieldValue) -> Result<Value, String> + Send + Sync>;

/// Transform built from a pair of closures
#[derive(Clone)]
pub struct TransformFunction {
    forward: ForwardFn,
    reverse: Option<ReverseFn>,
}

impl TransformFunction {
    pub fn new<F, R>(forward: F, reverse: R) -> Self
    where
        F: Fn(&Value) -> Result<FieldValue, String> + Send + Sync + 'static,
        R: Fn(&FieldValue) -> Result<Value, String> + Send + Sync + 'static,
    {
        Self {
            forward: Arc::new(forward),
            reverse: Some(Arc::new(reverse)),
        }
    }

    /// Transform without a reverse direction; projections of the field are `null`
    pub fn forward_only<F>(forward: F) -> Self
    where
        F: Fn(&Value) -> Result<FieldValue, String> + Send + Sync + 'static,
    {
        Self {
            forward: Arc::new(forward),
            reverse: None,
        }
    }
}

impl Transformer for TransformFunction {
    fn transform(&self, value: &Value) -> Result<FieldValue, String> {
        (self.forward)(value)
    }

    fn reverse(&self, value: &FieldValue) -> Result<Value, String> {
        match &self.reverse {
            Some(reverse) => reverse(value),
            None => Err("transform has no reverse direction".to_string()),
        }
    }
}

impl fmt::Debug for TransformFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformFunction")
            .field("reversible", &self.reverse.is_some())
            .finish()
    }
}

/// Adapts a [`Formatter`] to the [`Transformer`] interface
pub(crate) struct FormatterTransform<'a>(pub &'a dyn Formatter);

impl Transformer for FormatterTransform<'_> {
    fn transform(&self, value: &Value) -> Result<FieldValue, String> {
        match value {
            Value::String(s) => self.0.value_for_string(s),
            other => Err(format!("expected string for formatter, found {}", json_kind(other))),
        }
    }

    fn reverse(&self, value: &FieldValue) -> Result<Value, String> {
        self.0.string_for_value(value).map(Value::String)
    }
}

/// Short name of a JSON value's kind
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
