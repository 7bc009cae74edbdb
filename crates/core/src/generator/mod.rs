//! Descriptor generation from sample documents
//!
//! This module provides functionality to:
//! - Infer types and fields from a sample JSON document
//! - Emit the result as a mapping schema file
//! - Emit Rust scaffolding (structs, `Mappable` impls, descriptor registration)
//!
//! # Example
//!
//! ```rust,ignore
//! use objmap_core::generator::{GeneratorConfig, describe_str, render_rust, to_schema};
//!
//! let config = GeneratorConfig::new().with_root_name("order").with_prefix("Shop");
//! let types = describe_str(r#"{"id": 1, "items": [{"sku": "A1"}]}"#, &config)?;
//!
//! println!("{}", to_schema(&types).to_yaml_string()?);
//! println!("{}", render_rust(&types));
//! ```

mod config;
mod describe;
mod error;
mod naming;
mod render;

pub use config::GeneratorConfig;
pub use describe::{FieldDescription, FieldType, TypeDescription, describe_document, describe_str};
pub use error::{GeneratorError, GeneratorResult};
pub use naming::{pascal_case, singularize, snake_case};
pub use render::{render_rust, to_schema};
