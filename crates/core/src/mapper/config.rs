//! Configuration for the mapper engine

use serde::{Deserialize, Serialize};

/// Default nesting limit for mapped objects
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Configuration for a [`Mapper`](super::Mapper)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Maximum depth of nested mapped objects
    pub max_depth: usize,
    /// Accept integral floats (e.g. `3.0`) for integer fields
    pub coerce_integers: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            coerce_integers: true,
        }
    }
}

impl MapperConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a strict config (no numeric coercion)
    pub fn strict() -> Self {
        Self {
            coerce_integers: false,
            ..Self::default()
        }
    }

    /// Set maximum nesting depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }

    /// Enable/disable integral float coercion
    pub fn with_coerce_integers(mut self, enabled: bool) -> Self {
        self.coerce_integers = enabled;
        self
    }
}
