//! Configuration for descriptor generation

use serde::{Deserialize, Serialize};

/// Configuration for [`describe_document`](super::describe_document)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Name of the type generated for the document root
    pub root_name: String,
    /// Prefix prepended to every generated type name
    pub prefix: String,
    /// Map RFC 3339 / ISO date strings to date fields
    pub detect_dates: bool,
    /// Maximum nesting depth of generated types
    pub max_depth: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            root_name: "root".to_string(),
            prefix: String::new(),
            detect_dates: true,
            max_depth: 10,
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_name(mut self, name: impl Into<String>) -> Self {
        self.root_name = name.into();
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_detect_dates(mut self, enabled: bool) -> Self {
        self.detect_dates = enabled;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
