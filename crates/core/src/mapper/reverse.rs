//! Reverse pipeline: read, reverse-transform, emit
//!
//! Used for projections (keyed by external key) and persisted-state encoding
//! (keyed by internal key). Neither direction fails outward: a value that
//! cannot be reversed is emitted as `null` (projection) or skipped (encode).

use serde_json::{Map, Value};
use tracing::warn;

use super::config::MapperConfig;
use super::registry::Registry;
use crate::mapping::MappingDescriptor;
use crate::object::Mappable;
use crate::value::FieldValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Projection,
    Encode,
}

pub(crate) struct Reverse<'a> {
    registry: &'a Registry,
    config: &'a MapperConfig,
    target: Target,
}

impl<'a> Reverse<'a> {
    pub fn new(registry: &'a Registry, config: &'a MapperConfig, target: Target) -> Self {
        Self {
            registry,
            config,
            target,
        }
    }

    /// External view of `instance`
    ///
    /// Keys are `keys` if given, else the registered projection keys, else every
    /// descriptor's external key.
    pub fn projection(&self, instance: &dyn Mappable, keys: Option<&[String]>, depth: usize) -> Value {
        let ty = instance.type_info();
        let Some(descriptors) = self.registry.descriptors(&ty) else {
            return instance.passthrough();
        };

        let defaults = self.registry.projection_keys(&ty);
        let keys: Vec<&str> = match (keys, defaults.as_deref()) {
            (Some(keys), _) | (None, Some(keys)) => keys.iter().map(String::as_str).collect(),
            (None, None) => descriptors.iter().map(MappingDescriptor::external_key).collect(),
        };

        let mut out = Map::new();
        for key in keys {
            let value = match descriptors.iter().find(|d| d.external_key() == key) {
                Some(descriptor) => self.read(instance, descriptor, depth).unwrap_or(Value::Null),
                None => instance
                    .get_field(key)
                    .map_or(Value::Null, |value| value.to_json()),
            };
            out.insert(key.to_string(), value);
        }
        Value::Object(out)
    }

    /// Descriptor-covered fields of `instance`, keyed by internal key
    pub fn encode(&self, instance: &dyn Mappable, depth: usize) -> Map<String, Value> {
        let ty = instance.type_info();
        let mut out = Map::new();
        let Some(descriptors) = self.registry.descriptors(&ty) else {
            warn!(type_name = %ty.name(), "No descriptors registered, nothing to encode");
            return out;
        };

        for descriptor in descriptors.iter() {
            if let Some(value) = self.read(instance, descriptor, depth) {
                out.insert(descriptor.internal_key().to_string(), value);
            }
        }
        out
    }

    /// Reverse one field; `None` when the instance has no value for it
    fn read(&self, instance: &dyn Mappable, descriptor: &MappingDescriptor, depth: usize) -> Option<Value> {
        let value = instance.get_field(descriptor.internal_key())?;
        match self.field(descriptor, &value, depth) {
            Ok(json) => Some(json),
            Err(reason) => {
                warn!(
                    field = %descriptor.internal_key(),
                    reason = %reason,
                    "Reverse transform failed"
                );
                match self.target {
                    Target::Projection => Some(Value::Null),
                    Target::Encode => None,
                }
            }
        }
    }

    fn field(&self, descriptor: &MappingDescriptor, value: &FieldValue, depth: usize) -> Result<Value, String> {
        match value {
            FieldValue::List(items) => Ok(Value::Array(
                items
                    .iter()
                    .map(|item| self.element_or_null(descriptor, item, depth))
                    .collect(),
            )),
            FieldValue::Map(entries) => Ok(Value::Object(
                entries
                    .iter()
                    .map(|(key, item)| (key.clone(), self.element_or_null(descriptor, item, depth)))
                    .collect(),
            )),
            other => self.element(descriptor, other, depth),
        }
    }

    fn element_or_null(&self, descriptor: &MappingDescriptor, value: &FieldValue, depth: usize) -> Value {
        self.element(descriptor, value, depth).unwrap_or_else(|reason| {
            warn!(
                field = %descriptor.internal_key(),
                reason = %reason,
                "Reverse transform failed for element"
            );
            Value::Null
        })
    }

    fn element(&self, descriptor: &MappingDescriptor, value: &FieldValue, depth: usize) -> Result<Value, String> {
        if value.is_null() {
            return Ok(Value::Null);
        }

        let step = descriptor.transform_step();
        if let Some(transformer) = step.transformer() {
            return transformer.reverse(value);
        }

        match value {
            FieldValue::Object(object) => {
                if depth >= self.config.max_depth {
                    return Err(format!("maximum nesting depth {} exceeded", self.config.max_depth));
                }
                Ok(match self.target {
                    Target::Projection => self.projection(object.as_ref(), None, depth + 1),
                    Target::Encode => Value::Object(self.encode(object.as_ref(), depth + 1)),
                })
            }
            other => Ok(other.to_json()),
        }
    }
}
