//! Label <-> enumerated integer transform

use std::collections::BTreeMap;

use serde_json::Value;

use super::transform::{Transformer, json_kind};
use crate::value::FieldValue;

/// Maps string labels to enumerated integer values and back
///
/// ```rust,ignore
/// let priority = EnumTransformer::new([(0, "low"), (1, "high")]);
/// assert_eq!(priority.value_for("high"), Some(1));
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnumTransformer {
    labels: BTreeMap<i64, String>,
}

impl EnumTransformer {
    pub fn new<I, S>(table: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        Self {
            labels: table.into_iter().map(|(v, l)| (v, l.into())).collect(),
        }
    }

    pub fn labels(&self) -> &BTreeMap<i64, String> {
        &self.labels
    }

    /// Enumerated value for an exact label match
    pub fn value_for(&self, label: &str) -> Option<i64> {
        self.labels
            .iter()
            .find(|(_, l)| l.as_str() == label)
            .map(|(v, _)| *v)
    }

    pub fn label_for(&self, value: i64) -> Option<&str> {
        self.labels.get(&value).map(String::as_str)
    }
}

impl From<BTreeMap<i64, String>> for EnumTransformer {
    fn from(labels: BTreeMap<i64, String>) -> Self {
        Self { labels }
    }
}

impl Transformer for EnumTransformer {
    fn transform(&self, value: &Value) -> Result<FieldValue, String> {
        let label = value
            .as_str()
            .ok_or_else(|| format!("expected enum label, found {}", json_kind(value)))?;
        self.value_for(label)
            .map(FieldValue::Integer)
            .ok_or_else(|| format!("unknown enum label '{}'", label))
    }

    fn reverse(&self, value: &FieldValue) -> Result<Value, String> {
        let raw = value
            .as_i64()
            .ok_or_else(|| format!("expected enum value, found {}", value.type_name()))?;
        self.label_for(raw)
            .map(|l| Value::String(l.to_string()))
            .ok_or_else(|| format!("no label for enum value {}", raw))
    }
}
