//! Per-type registrations with ancestor fallback

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::mapping::MappingDescriptor;
use crate::object::{Mappable, TypeInfo, TypeRef};

/// Builds an instance of the requested type from the incoming values
///
/// The values are passed for inspection only; the mapper populates the
/// returned instance afterwards.
pub type Factory =
    Arc<dyn Fn(&TypeRef, &Map<String, Value>) -> Result<Box<dyn Mappable>, String> + Send + Sync>;

/// Default constructor recorded by `Mapper::register::<T>()`
pub(crate) type Constructor = Arc<dyn Fn() -> Box<dyn Mappable> + Send + Sync>;

/// Everything registered for one type
#[derive(Default, Clone)]
pub(crate) struct Registry {
    descriptors: HashMap<String, Arc<[MappingDescriptor]>>,
    factories: HashMap<String, Factory>,
    constructors: HashMap<String, Constructor>,
    projection_keys: HashMap<String, Arc<[String]>>,
}

impl Registry {
    pub fn set_descriptors(&mut self, ty: &TypeInfo, descriptors: Vec<MappingDescriptor>) {
        self.descriptors
            .insert(ty.name().to_string(), descriptors.into());
    }

    pub fn set_factory(&mut self, ty: &TypeInfo, factory: Factory) {
        self.factories.insert(ty.name().to_string(), factory);
    }

    pub fn set_constructor(&mut self, ty: &TypeInfo, constructor: Constructor) {
        self.constructors.insert(ty.name().to_string(), constructor);
    }

    pub fn set_projection_keys(&mut self, ty: &TypeInfo, keys: Vec<String>) {
        self.projection_keys
            .insert(ty.name().to_string(), keys.into());
    }

    /// Descriptors of the nearest registered ancestor (including `ty` itself)
    pub fn descriptors(&self, ty: &TypeInfo) -> Option<Arc<[MappingDescriptor]>> {
        nearest(&self.descriptors, ty)
    }

    pub fn factory(&self, ty: &TypeInfo) -> Option<Factory> {
        nearest(&self.factories, ty)
    }

    /// Default constructors are never inherited: a parent's constructor
    /// would build the wrong type.
    pub fn constructor(&self, ty: &TypeInfo) -> Option<Constructor> {
        self.constructors.get(ty.name()).cloned()
    }

    pub fn projection_keys(&self, ty: &TypeInfo) -> Option<Arc<[String]>> {
        nearest(&self.projection_keys, ty)
    }

    pub fn type_count(&self) -> usize {
        self.descriptors.len()
    }
}

fn nearest<V: Clone>(table: &HashMap<String, V>, ty: &TypeInfo) -> Option<V> {
    ty.ancestors()
        .find_map(|ancestor| table.get(ancestor.name()))
        .cloned()
}
