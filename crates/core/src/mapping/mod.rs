//! Field mapping rules
//!
//! This module provides:
//! - [`MappingDescriptor`] and its builder, one per mapped field
//! - the [`Transformer`] and [`Formatter`] traits plus closure-based transforms
//! - [`EnumTransformer`] for label <-> integer enumerations
//! - date and number formatters
//!
//! # Example
//!
//! ```rust,ignore
//! use objmap_core::mapping::{DateFormatter, EnumTransformer, MappingDescriptor, TargetType};
//! use objmap_core::Requirement;
//!
//! let descriptors = vec![
//!     MappingDescriptor::builder("name")
//!         .target(TargetType::String)
//!         .requires(Requirement::exists())
//!         .build(),
//!     MappingDescriptor::builder("priority")
//!         .transformer(EnumTransformer::new([(0, "low"), (1, "high")]))
//!         .build(),
//!     MappingDescriptor::builder("created")
//!         .external_key("created_at")
//!         .formatter(DateFormatter::rfc3339())
//!         .build(),
//! ];
//! ```

mod descriptor;
mod enums;
mod format;
mod transform;

pub use descriptor::{Container, DescriptorBuilder, FieldKind, MappingDescriptor, TargetType};
pub use enums::EnumTransformer;
pub use format::{DateFormatter, NumberFormatter};
pub(crate) use transform::json_kind;
pub use transform::{Formatter, TransformFunction, Transformer};
