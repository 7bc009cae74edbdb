//! Host object model
//!
//! The mapper never inspects struct layouts. Everything it needs from an
//! instance goes through the [`Mappable`] trait: an explicit type identity
//! with a declared parent link, get/set by internal key, and an optional
//! per-field self-validation hook.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::value::FieldValue;

/// Shared handle to a type identity
pub type TypeRef = Arc<TypeInfo>;

/// Stable type identifier with an explicit parent link
///
/// Registry lookups resolve a type by walking [`TypeInfo::ancestors`], so a
/// subtype without its own registrations inherits those of the nearest
/// registered ancestor.
///
/// Identity is the name alone: equality, hashing, [`TypeInfo::is_a`] and the
/// mapper's registry all compare names, never parents or pointers. Type names
/// must therefore be unique within one `Mapper`; two `TypeInfo`s sharing a
/// name address the same registrations.
pub struct TypeInfo {
    name: String,
    parent: Option<TypeRef>,
}

impl TypeInfo {
    /// Create a type without a parent
    pub fn root(name: impl Into<String>) -> TypeRef {
        Arc::new(Self {
            name: name.into(),
            parent: None,
        })
    }

    /// Create a type that declares `parent` as its supertype
    pub fn child_of(name: impl Into<String>, parent: &TypeRef) -> TypeRef {
        Arc::new(Self {
            name: name.into(),
            parent: Some(Arc::clone(parent)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&TypeRef> {
        self.parent.as_ref()
    }

    /// Iterate over this type and its ancestors, nearest first
    pub fn ancestors(&self) -> Ancestors<'_> {
        Ancestors { next: Some(self) }
    }

    /// Whether this type is `other` or one of its descendants
    pub fn is_a(&self, other: &TypeInfo) -> bool {
        self.ancestors().any(|t| t.name == other.name)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.parent {
            Some(parent) => write!(f, "{}: {}", self.name, parent.name),
            None => f.write_str(&self.name),
        }
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Iterator returned by [`TypeInfo::ancestors`]
pub struct Ancestors<'a> {
    next: Option<&'a TypeInfo>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a TypeInfo;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent.as_deref();
        Some(current)
    }
}

/// Object-safe plumbing implemented for every `Mappable + Clone` type
pub trait MappableClone {
    fn clone_boxed(&self) -> Box<dyn Mappable>;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> MappableClone for T
where
    T: Mappable + Clone,
{
    fn clone_boxed(&self) -> Box<dyn Mappable> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

/// Capability the mapper requires from an instance
///
/// `get_field` and `set_field` address fields by internal key. Keys the
/// type does not know should return `None` / an error respectively.
pub trait Mappable: MappableClone + fmt::Debug + Send + Sync + 'static {
    /// Runtime type identity used for registry lookup
    fn type_info(&self) -> TypeRef;

    /// Current internal value for `key`
    fn get_field(&self, key: &str) -> Option<FieldValue>;

    /// Assign an internal value for `key`
    fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), String>;

    /// Self-validation hook, consulted before any value is assigned
    fn validate_field(&self, _key: &str, _value: &FieldValue) -> Result<(), String> {
        Ok(())
    }

    /// Representation used when the type has no registered descriptors
    ///
    /// Projection returns this value unchanged for unmapped types, including
    /// nested instances held by a mapped parent. The default is `null`, so a
    /// host type that is never registered but should still appear in a
    /// projection must override it.
    fn passthrough(&self) -> Value {
        Value::Null
    }
}

impl Clone for Box<dyn Mappable> {
    fn clone(&self) -> Self {
        self.clone_boxed()
    }
}

/// A statically typed `Mappable` that can be default-constructed
///
/// ```rust,ignore
/// static PERSON: Lazy<TypeRef> = Lazy::new(|| TypeInfo::root("Person"));
///
/// impl MappedType for Person {
///     fn static_type() -> TypeRef {
///         PERSON.clone()
///     }
/// }
/// ```
pub trait MappedType: Mappable + Clone + Default {
    fn static_type() -> TypeRef;
}

/// Downcast a boxed instance to its concrete type
pub fn downcast<T: Mappable>(instance: Box<dyn Mappable>) -> Option<T> {
    instance.into_any().downcast::<T>().ok().map(|concrete| *concrete)
}

/// Dynamically typed instance backed by a field map
///
/// Used for types declared in schema files, where no Rust struct exists.
#[derive(Debug, Clone)]
pub struct Record {
    type_info: TypeRef,
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    pub fn new(type_info: TypeRef) -> Self {
        Self {
            type_info,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldValue> {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Mappable for Record {
    fn type_info(&self) -> TypeRef {
        Arc::clone(&self.type_info)
    }

    fn get_field(&self, key: &str) -> Option<FieldValue> {
        self.fields.get(key).cloned()
    }

    fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), String> {
        self.fields.insert(key.to_string(), value);
        Ok(())
    }

    fn passthrough(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ancestor_walk() {
        let animal = TypeInfo::root("Animal");
        let dog = TypeInfo::child_of("Dog", &animal);
        let puppy = TypeInfo::child_of("Puppy", &dog);

        let names: Vec<&str> = puppy.ancestors().map(|t| t.name()).collect();
        assert_eq!(names, vec!["Puppy", "Dog", "Animal"]);
        assert!(puppy.is_a(&animal));
        assert!(!animal.is_a(&dog));
    }

    #[test]
    fn test_identity_is_the_name() {
        let base = TypeInfo::root("Base");
        let detached = TypeInfo::root("Item");
        let derived = TypeInfo::child_of("Item", &base);

        assert_eq!(detached, derived);
        assert!(detached.is_a(&derived));
        assert!(derived.is_a(&base));
        assert!(!detached.is_a(&base));
    }

    #[test]
    fn test_record_fields() {
        let ty = TypeInfo::root("Thing");
        let mut record = Record::new(ty.clone());
        record.set_field("name", FieldValue::from("lamp")).unwrap();

        assert_eq!(record.type_info(), ty);
        assert_eq!(record.get("name").and_then(FieldValue::as_str), Some("lamp"));
        assert!(record.get_field("missing").is_none());
        assert_eq!(record.passthrough(), serde_json::json!({"name": "lamp"}));
    }

    #[test]
    fn test_downcast_boxed_record() {
        let record = Record::new(TypeInfo::root("Thing"));
        let boxed: Box<dyn Mappable> = Box::new(record);
        let back: Record = downcast(boxed).unwrap();
        assert!(back.is_empty());
    }
}
