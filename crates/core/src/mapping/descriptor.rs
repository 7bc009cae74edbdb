//! Mapping descriptors
//!
//! A [`MappingDescriptor`] binds one external key to one internal field. It is
//! built once through [`DescriptorBuilder`] and is immutable afterwards.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::transform::{FormatterTransform, Formatter, TransformFunction, Transformer};
use crate::object::TypeRef;
use crate::requirement::Requirement;

/// Declared internal type of a field (or of each element of a collection)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    /// Untyped; any value is accepted
    Any,
    Bool,
    Integer,
    /// Integer or floating point
    Number,
    String,
    Date,
    DateTime,
    /// Nested mapped type
    Object(TypeRef),
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::Any => write!(f, "any"),
            TargetType::Bool => write!(f, "bool"),
            TargetType::Integer => write!(f, "integer"),
            TargetType::Number => write!(f, "number"),
            TargetType::String => write!(f, "string"),
            TargetType::Date => write!(f, "date"),
            TargetType::DateTime => write!(f, "date-time"),
            TargetType::Object(t) => write!(f, "{}", t.name()),
        }
    }
}

/// Shape of the external value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Scalar,
    List,
    Map,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar => write!(f, "scalar"),
            FieldKind::List => write!(f, "list"),
            FieldKind::Map => write!(f, "map"),
        }
    }
}

/// Container used for list fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    #[default]
    Sequence,
    /// Order-preserving, duplicates dropped
    UniqueSequence,
}

/// The transform a descriptor applies, after precedence is resolved
pub(crate) enum TransformStep<'a> {
    Transform(Box<dyn Transformer + 'a>),
    Borrowed(&'a dyn Transformer),
    Default,
}

impl TransformStep<'_> {
    pub(crate) fn transformer(&self) -> Option<&dyn Transformer> {
        match self {
            TransformStep::Transform(t) => Some(t.as_ref()),
            TransformStep::Borrowed(t) => Some(*t),
            TransformStep::Default => None,
        }
    }
}

/// Rule binding one external key to one internal field
#[derive(Clone)]
pub struct MappingDescriptor {
    external_key: String,
    internal_key: String,
    target: TargetType,
    kind: FieldKind,
    container: Container,
    formatter: Option<Arc<dyn Formatter>>,
    transformer: Option<Arc<dyn Transformer>>,
    transform_fn: Option<TransformFunction>,
    requirement: Option<Requirement>,
}

impl MappingDescriptor {
    /// Start a descriptor whose external and internal keys are both `key`
    pub fn builder(key: impl Into<String>) -> DescriptorBuilder {
        DescriptorBuilder::new(key)
    }

    pub fn number(key: impl Into<String>) -> Self {
        Self::builder(key).target(TargetType::Number).build()
    }

    pub fn integer(key: impl Into<String>) -> Self {
        Self::builder(key).target(TargetType::Integer).build()
    }

    pub fn string(key: impl Into<String>) -> Self {
        Self::builder(key).target(TargetType::String).build()
    }

    pub fn boolean(key: impl Into<String>) -> Self {
        Self::builder(key).target(TargetType::Bool).build()
    }

    pub fn object(key: impl Into<String>, target: &TypeRef) -> Self {
        Self::builder(key)
            .target(TargetType::Object(Arc::clone(target)))
            .build()
    }

    pub fn list_of(key: impl Into<String>, target: TargetType) -> Self {
        Self::builder(key).target(target).kind(FieldKind::List).build()
    }

    pub fn map_of(key: impl Into<String>, target: TargetType) -> Self {
        Self::builder(key).target(target).kind(FieldKind::Map).build()
    }

    /// List field stored in the given container
    pub fn collection_of(key: impl Into<String>, container: Container, target: TargetType) -> Self {
        Self::builder(key)
            .target(target)
            .kind(FieldKind::List)
            .container(container)
            .build()
    }

    pub fn external_key(&self) -> &str {
        &self.external_key
    }

    pub fn internal_key(&self) -> &str {
        &self.internal_key
    }

    pub fn target(&self) -> &TargetType {
        &self.target
    }

    pub fn kind(&self) -> FieldKind {
        self.kind
    }

    pub fn container(&self) -> Container {
        self.container
    }

    pub fn requirement(&self) -> Option<&Requirement> {
        self.requirement.as_ref()
    }

    /// Whether any transform is configured
    pub fn has_transform(&self) -> bool {
        self.formatter.is_some() || self.transformer.is_some() || self.transform_fn.is_some()
    }

    /// Resolve which transform applies: formatter, then transformer, then function
    pub(crate) fn transform_step(&self) -> TransformStep<'_> {
        if let Some(formatter) = &self.formatter {
            TransformStep::Transform(Box::new(FormatterTransform(formatter.as_ref())))
        } else if let Some(transformer) = &self.transformer {
            TransformStep::Borrowed(transformer.as_ref())
        } else if let Some(function) = &self.transform_fn {
            TransformStep::Borrowed(function)
        } else {
            TransformStep::Default
        }
    }
}

impl fmt::Debug for MappingDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappingDescriptor")
            .field("external_key", &self.external_key)
            .field("internal_key", &self.internal_key)
            .field("target", &self.target)
            .field("kind", &self.kind)
            .field("container", &self.container)
            .field("formatter", &self.formatter.is_some())
            .field("transformer", &self.transformer.is_some())
            .field("transform_fn", &self.transform_fn.is_some())
            .field("requirement", &self.requirement)
            .finish()
    }
}

/// Builder for [`MappingDescriptor`]
///
/// ```rust,ignore
/// let age = MappingDescriptor::builder("age")
///     .external_key("person_age")
///     .target(TargetType::Integer)
///     .requires(vec![Requirement::exists(), Requirement::greater_than_or_equal_to(0)])
///     .build();
/// ```
pub struct DescriptorBuilder {
    descriptor: MappingDescriptor,
}

impl DescriptorBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            descriptor: MappingDescriptor {
                external_key: key.clone(),
                internal_key: key,
                target: TargetType::Any,
                kind: FieldKind::Scalar,
                container: Container::Sequence,
                formatter: None,
                transformer: None,
                transform_fn: None,
                requirement: None,
            },
        }
    }

    /// Set both keys
    pub fn key(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.descriptor.external_key = key.clone();
        self.descriptor.internal_key = key;
        self
    }

    pub fn external_key(mut self, key: impl Into<String>) -> Self {
        self.descriptor.external_key = key.into();
        self
    }

    pub fn internal_key(mut self, key: impl Into<String>) -> Self {
        self.descriptor.internal_key = key.into();
        self
    }

    pub fn target(mut self, target: TargetType) -> Self {
        self.descriptor.target = target;
        self
    }

    pub fn kind(mut self, kind: FieldKind) -> Self {
        self.descriptor.kind = kind;
        self
    }

    pub fn container(mut self, container: Container) -> Self {
        self.descriptor.container = container;
        self
    }

    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.descriptor.formatter = Some(Arc::new(formatter));
        self
    }

    pub fn transformer(mut self, transformer: impl Transformer + 'static) -> Self {
        self.descriptor.transformer = Some(Arc::new(transformer));
        self
    }

    pub fn shared_transformer(mut self, transformer: Arc<dyn Transformer>) -> Self {
        self.descriptor.transformer = Some(transformer);
        self
    }

    pub fn transform_fn(mut self, function: TransformFunction) -> Self {
        self.descriptor.transform_fn = Some(function);
        self
    }

    /// Requirement the transformed value must satisfy; a `Vec` acts as AND
    pub fn requires(mut self, requirement: impl Into<Requirement>) -> Self {
        self.descriptor.requirement = Some(requirement.into());
        self
    }

    pub fn build(self) -> MappingDescriptor {
        self.descriptor
    }
}
