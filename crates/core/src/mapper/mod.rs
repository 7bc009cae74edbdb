//! Mapper engine
//!
//! The [`Mapper`] owns a registry of descriptors, factories and projection
//! keys per type, and runs them:
//! - `validate` / `validate_on`: check values without touching an instance
//! - `apply` / `object_of`: validate, then assign all values or none
//! - `projection`: the external map view of an instance
//! - `encode` / `decode`: trusted persisted-state round trip
//!
//! # Example
//!
//! ```rust,ignore
//! use objmap_core::{Mapper, MappingDescriptor, Requirement, TargetType};
//! use serde_json::json;
//!
//! let mapper = Mapper::new();
//! mapper.register::<Person>(vec![
//!     MappingDescriptor::builder("name")
//!         .target(TargetType::String)
//!         .requires(Requirement::exists())
//!         .build(),
//! ]);
//!
//! let values = json!({"name": "Ada"});
//! let person: Person = mapper.object_of(values.as_object().unwrap())?;
//! assert_eq!(mapper.projection(&person), values);
//! ```

mod config;
mod error;
mod pipeline;
mod registry;
mod reverse;

use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub use config::{DEFAULT_MAX_DEPTH, MapperConfig};
pub use error::{MappingError, MappingResult, ValidationErrors, pretty_error};
pub use registry::Factory;

use crate::coding::{StateSink, StateSource};
use crate::mapping::MappingDescriptor;
use crate::object::{Mappable, MappedType, TypeInfo, TypeRef, downcast};
use pipeline::{Mode, Pipeline, assign, instantiate};
use registry::Registry;
use reverse::{Reverse, Target};

static SHARED: Lazy<Mapper> = Lazy::new(Mapper::new);

/// Registry of per-type mapping rules plus the operations that run them
///
/// Registration takes a write lock; every other operation works on a
/// snapshot of the registry taken under the read lock, so user closures
/// never run while a lock is held.
pub struct Mapper {
    config: MapperConfig,
    registry: RwLock<Arc<Registry>>,
}

impl Default for Mapper {
    fn default() -> Self {
        Self::new()
    }
}

impl Mapper {
    /// Create a mapper with default configuration
    pub fn new() -> Self {
        Self::with_config(MapperConfig::default())
    }

    pub fn with_config(config: MapperConfig) -> Self {
        Self {
            config,
            registry: RwLock::new(Arc::new(Registry::default())),
        }
    }

    /// Process-wide mapper
    pub fn shared() -> &'static Mapper {
        &SHARED
    }

    pub fn config(&self) -> &MapperConfig {
        &self.config
    }

    fn snapshot(&self) -> Arc<Registry> {
        // every write is a single insert, so a poisoned registry is still consistent
        Arc::clone(&self.registry.read().unwrap_or_else(PoisonError::into_inner))
    }

    fn update(&self, change: impl FnOnce(&mut Registry)) {
        let mut guard = self.registry.write().unwrap_or_else(PoisonError::into_inner);
        change(Arc::make_mut(&mut guard));
    }

    /// Replace the descriptors for `ty`
    pub fn register_descriptors(&self, ty: &TypeRef, descriptors: Vec<MappingDescriptor>) {
        debug!(
            type_name = %ty.name(),
            descriptors = descriptors.len(),
            "Registering descriptors"
        );
        self.update(|registry| registry.set_descriptors(ty, descriptors));
    }

    /// Register descriptors for `T` and record `T::default` as its constructor
    pub fn register<T: MappedType>(&self, descriptors: Vec<MappingDescriptor>) {
        let ty = T::static_type();
        self.register_descriptors(&ty, descriptors);
        self.update(|registry| {
            registry.set_constructor(&ty, Arc::new(|| Box::new(T::default()) as Box<dyn Mappable>))
        });
    }

    /// Factory used to build `ty` and its unregistered subtypes
    pub fn register_factory<F>(&self, ty: &TypeRef, factory: F)
    where
        F: Fn(&TypeRef, &Map<String, Value>) -> Result<Box<dyn Mappable>, String>
            + Send
            + Sync
            + 'static,
    {
        debug!(type_name = %ty.name(), "Registering factory");
        let factory: Factory = Arc::new(factory);
        self.update(|registry| registry.set_factory(ty, factory));
    }

    /// Default external keys for [`Mapper::projection`]
    pub fn register_projection_keys<I, S>(&self, ty: &TypeRef, keys: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys: Vec<String> = keys.into_iter().map(Into::into).collect();
        debug!(type_name = %ty.name(), keys = keys.len(), "Registering projection keys");
        self.update(|registry| registry.set_projection_keys(ty, keys));
    }

    /// Descriptors that apply to `ty`, inherited from the nearest registered ancestor
    pub fn descriptors(&self, ty: &TypeInfo) -> Option<Arc<[MappingDescriptor]>> {
        self.snapshot().descriptors(ty)
    }

    /// Number of types with registered descriptors
    pub fn registered_types(&self) -> usize {
        self.snapshot().type_count()
    }

    /// Validate `values` against the descriptors of `ty`
    pub fn validate(&self, values: &Map<String, Value>, ty: &TypeInfo) -> MappingResult<()> {
        let registry = self.snapshot();
        Pipeline::new(&registry, &self.config, Mode::Validate)
            .run(values, ty, None, 0)
            .into_result()
            .map(|_| ())
    }

    /// Validate `values` for `instance`, including its self-validation hook
    pub fn validate_on(&self, values: &Map<String, Value>, instance: &dyn Mappable) -> MappingResult<()> {
        let registry = self.snapshot();
        Pipeline::new(&registry, &self.config, Mode::Validate)
            .run(values, &instance.type_info(), Some(instance), 0)
            .into_result()
            .map(|_| ())
    }

    /// Validate and assign `values`; on error `instance` is left untouched
    pub fn apply<T: Mappable + Clone>(&self, values: &Map<String, Value>, instance: &mut T) -> MappingResult<()> {
        let mut staged = instance.clone();
        self.populate(&self.snapshot(), values, &mut staged)?;
        *instance = staged;
        Ok(())
    }

    /// [`Mapper::apply`] for type-erased instances
    pub fn apply_boxed(
        &self,
        values: &Map<String, Value>,
        instance: &mut Box<dyn Mappable>,
    ) -> MappingResult<()> {
        let mut staged = instance.clone();
        self.populate(&self.snapshot(), values, staged.as_mut())?;
        *instance = staged;
        Ok(())
    }

    /// Construct a `T` and populate it from `values`
    ///
    /// Uses a registered factory for `T` (or an ancestor) if there is one,
    /// otherwise `T::default()`.
    pub fn object_of<T: MappedType>(&self, values: &Map<String, Value>) -> MappingResult<T> {
        let registry = self.snapshot();
        let ty = T::static_type();

        let mut instance = match registry.factory(&ty) {
            Some(_) => {
                let built = instantiate(&registry, &ty, values)?;
                downcast::<T>(built).ok_or_else(|| MappingError::InitializationFailed {
                    type_name: ty.name().to_string(),
                    reason: "factory produced a different concrete type".to_string(),
                })?
            }
            None => T::default(),
        };

        self.populate(&registry, values, &mut instance)?;
        Ok(instance)
    }

    /// Construct an instance of `ty` through its factory or default constructor
    pub fn object_of_type(
        &self,
        values: &Map<String, Value>,
        ty: &TypeRef,
    ) -> MappingResult<Box<dyn Mappable>> {
        let registry = self.snapshot();
        let mut instance = instantiate(&registry, ty, values)?;
        self.populate(&registry, values, instance.as_mut())?;
        Ok(instance)
    }

    fn populate(
        &self,
        registry: &Registry,
        values: &Map<String, Value>,
        instance: &mut dyn Mappable,
    ) -> MappingResult<()> {
        let ty = instance.type_info();
        let staged = Pipeline::new(registry, &self.config, Mode::Validate)
            .run(values, &ty, Some(&*instance), 0)
            .into_result()?;
        debug!(type_name = %ty.name(), fields = staged.len(), "Applying values");
        assign(instance, staged)
    }

    /// Write descriptor-covered fields to `sink`, keyed by internal key
    pub fn encode(&self, instance: &dyn Mappable, sink: &mut dyn StateSink) {
        let registry = self.snapshot();
        let encoded = Reverse::new(&registry, &self.config, Target::Encode).encode(instance, 0);
        for (key, value) in encoded {
            sink.write(&key, value);
        }
    }

    /// Restore fields from `source` without requirement or self-validation checks
    ///
    /// Entries that cannot be converted or assigned are skipped.
    pub fn decode(&self, instance: &mut dyn Mappable, source: &dyn StateSource) {
        let registry = self.snapshot();
        let ty = instance.type_info();
        let Some(descriptors) = registry.descriptors(&ty) else {
            warn!(type_name = %ty.name(), "No descriptors registered, nothing to decode");
            return;
        };

        let values: Map<String, Value> = descriptors
            .iter()
            .filter_map(|d| {
                source
                    .read(d.internal_key())
                    .map(|value| (d.internal_key().to_string(), value))
            })
            .collect();

        let outcome = Pipeline::new(&registry, &self.config, Mode::Decode).run(&values, &ty, None, 0);
        for (key, error) in outcome.errors.iter() {
            warn!(type_name = %ty.name(), field = %key, error = %error, "Skipping persisted field");
        }

        if let Err(MappingError::InvalidValues(errors)) = assign(instance, outcome.staged) {
            for (key, error) in errors.iter() {
                warn!(type_name = %ty.name(), field = %key, error = %error, "Skipping persisted field");
            }
        }
    }

    /// External view of `instance` using its default projection keys
    pub fn projection(&self, instance: &dyn Mappable) -> Value {
        let registry = self.snapshot();
        Reverse::new(&registry, &self.config, Target::Projection).projection(instance, None, 0)
    }

    /// External view of `instance` restricted to `keys` (external keys)
    pub fn projection_for_keys<S: AsRef<str>>(&self, instance: &dyn Mappable, keys: &[S]) -> Value {
        let registry = self.snapshot();
        let keys: Vec<String> = keys.iter().map(|k| k.as_ref().to_string()).collect();
        Reverse::new(&registry, &self.config, Target::Projection).projection(instance, Some(&keys), 0)
    }
}
