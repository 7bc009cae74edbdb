//! Persisted-state encoding
//!
//! [`Mapper::encode`](crate::Mapper::encode) writes descriptor-covered fields
//! into a [`StateSink`] keyed by internal key;
//! [`Mapper::decode`](crate::Mapper::decode) reads them back from a
//! [`StateSource`] without running requirements. [`StateMap`] implements both
//! and converts to and from JSON or YAML text.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Destination for encoded state
pub trait StateSink {
    fn write(&mut self, key: &str, value: Value);
}

/// Source of previously encoded state
pub trait StateSource {
    fn read(&self, key: &str) -> Option<Value>;
}

impl StateSink for Map<String, Value> {
    fn write(&mut self, key: &str, value: Value) {
        self.insert(key.to_string(), value);
    }
}

impl StateSource for Map<String, Value> {
    fn read(&self, key: &str) -> Option<Value> {
        self.get(key).cloned()
    }
}

/// Errors converting persisted state to or from text
#[derive(Error, Debug)]
pub enum CodingError {
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Result type for persisted-state conversions
pub type CodingResult<T> = Result<T, CodingError>;

/// In-memory state store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateMap {
    entries: Map<String, Value>,
}

impl StateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.entries
    }

    pub fn to_json_string(&self) -> CodingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json_str(input: &str) -> CodingResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_yaml_string(&self) -> CodingResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml_str(input: &str) -> CodingResult<Self> {
        Ok(serde_yaml::from_str(input)?)
    }
}

impl From<Map<String, Value>> for StateMap {
    fn from(entries: Map<String, Value>) -> Self {
        Self { entries }
    }
}

impl StateSink for StateMap {
    fn write(&mut self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }
}

impl StateSource for StateMap {
    fn read(&self, key: &str) -> Option<Value> {
        self.entries.get(key).cloned()
    }
}
