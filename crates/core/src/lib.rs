//! objmap core - declarative mapping between JSON-like data and typed objects
//!
//! Provides:
//! - Mapping descriptors binding external keys to internal fields
//! - Composable field requirements
//! - Value transforms, enum tables and date/number formatters
//! - The mapper engine: validate, apply, projection, persisted-state coding
//! - Declarative mapping schema files (YAML/JSON)
//! - Descriptor generation from sample documents

pub mod coding;
#[cfg(feature = "generator")]
pub mod generator;
pub mod mapper;
pub mod mapping;
pub mod object;
pub mod requirement;
#[cfg(feature = "schema")]
pub mod schema;
pub mod value;

pub use coding::{CodingError, StateMap, StateSink, StateSource};
pub use mapper::{
    Factory, Mapper, MapperConfig, MappingError, MappingResult, ValidationErrors, pretty_error,
};
pub use mapping::{
    Container, DateFormatter, DescriptorBuilder, EnumTransformer, FieldKind, Formatter,
    MappingDescriptor, NumberFormatter, TargetType, TransformFunction, Transformer,
};
pub use object::{Mappable, MappedType, Record, TypeInfo, TypeRef, downcast};
pub use requirement::{Comparison, Requirement};
pub use value::{FieldValue, FromField, object, objects};

#[cfg(feature = "schema")]
pub use schema::{MappingSchema, SchemaError, SchemaResult, SchemaTypes};

#[cfg(feature = "generator")]
pub use generator::{GeneratorConfig, GeneratorError, TypeDescription, describe_document};
