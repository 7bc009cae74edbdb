//! Forward pipeline: extract, transform, type-check, require, stage
//!
//! One pass walks every descriptor of a type and collects all failures
//! instead of stopping at the first one. Values that pass are staged and only
//! assigned by the caller once the whole pass succeeded.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};
use tracing::{debug, trace, warn};

use super::config::MapperConfig;
use super::error::{MappingError, MappingResult, ValidationErrors};
use super::registry::Registry;
use crate::mapping::{Container, FieldKind, MappingDescriptor, TargetType, json_kind};
use crate::object::{Mappable, TypeInfo, TypeRef};
use crate::value::FieldValue;

/// Which key addresses a field in the incoming map, and how strict the pass is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Mode {
    /// External keys; requirements and self-validation enforced
    Validate,
    /// Internal keys from persisted state; no requirement checks
    Decode,
}

/// Internal key and value, ready to assign
pub(crate) type Staged = Vec<(String, FieldValue)>;

/// Result of one pass over a type's descriptors
pub(crate) struct Outcome {
    pub staged: Staged,
    pub errors: ValidationErrors,
}

impl Outcome {
    /// Staged values, or every failure plus the values that did pass
    pub fn into_result(self) -> MappingResult<Staged> {
        let Outcome { staged, mut errors } = self;
        if errors.is_empty() {
            return Ok(staged);
        }
        for (key, value) in staged {
            errors.accept(key, value);
        }
        Err(MappingError::InvalidValues(errors))
    }
}

pub(crate) struct Pipeline<'a> {
    registry: &'a Registry,
    config: &'a MapperConfig,
    mode: Mode,
}

impl<'a> Pipeline<'a> {
    pub fn new(registry: &'a Registry, config: &'a MapperConfig, mode: Mode) -> Self {
        Self {
            registry,
            config,
            mode,
        }
    }

    /// Run every descriptor registered for `ty` (or its nearest ancestor)
    pub fn run(
        &self,
        values: &Map<String, Value>,
        ty: &TypeInfo,
        instance: Option<&dyn Mappable>,
        depth: usize,
    ) -> Outcome {
        let mut outcome = Outcome {
            staged: Vec::new(),
            errors: ValidationErrors::new(),
        };

        let Some(descriptors) = self.registry.descriptors(ty) else {
            debug!(type_name = %ty.name(), "No descriptors registered, nothing to map");
            return outcome;
        };

        debug!(
            type_name = %ty.name(),
            descriptors = descriptors.len(),
            mode = ?self.mode,
            "Running mapping pass"
        );

        for descriptor in descriptors.iter() {
            let key = match self.mode {
                Mode::Validate => descriptor.external_key(),
                Mode::Decode => descriptor.internal_key(),
            };
            let internal = descriptor.internal_key();

            match self.field(descriptor, values.get(key), instance, depth) {
                Ok(Some(value)) => {
                    trace!(field = %internal, "Field accepted");
                    outcome.staged.push((internal.to_string(), value));
                }
                Ok(None) => trace!(field = %internal, "Field absent"),
                Err(error) => {
                    trace!(field = %internal, error = %error, "Field rejected");
                    outcome.errors.insert(internal, error);
                }
            }
        }

        outcome
    }

    /// Process one field; `Ok(None)` means absent and nothing to assign
    fn field(
        &self,
        descriptor: &MappingDescriptor,
        raw: Option<&Value>,
        instance: Option<&dyn Mappable>,
        depth: usize,
    ) -> MappingResult<Option<FieldValue>> {
        let enforce = self.mode == Mode::Validate;

        let Some(raw) = raw else {
            if enforce {
                if let Some(requirement) = descriptor.requirement() {
                    if !requirement.evaluate(None) {
                        return Err(MappingError::RequirementFailed(requirement.to_string()));
                    }
                }
            }
            return Ok(None);
        };

        let value = self.forward(descriptor, raw, depth)?;

        if enforce {
            // Collection requirements were checked per element in `forward`
            if descriptor.kind() == FieldKind::Scalar || value.is_null() {
                self.require(descriptor, &value)?;
            }
            if let Some(instance) = instance {
                instance
                    .validate_field(descriptor.internal_key(), &value)
                    .map_err(MappingError::RequirementFailed)?;
            }
        }

        Ok(Some(value))
    }

    /// Transform and type-check a present value according to the field kind
    fn forward(
        &self,
        descriptor: &MappingDescriptor,
        raw: &Value,
        depth: usize,
    ) -> MappingResult<FieldValue> {
        match (descriptor.kind(), raw) {
            (_, Value::Null) => Ok(FieldValue::Null),
            (FieldKind::Scalar, _) => self.element(descriptor, raw, depth),
            (FieldKind::List, Value::Array(items)) => {
                let mut accepted = Vec::with_capacity(items.len());
                let mut errors = ValidationErrors::new();
                for (index, item) in items.iter().enumerate() {
                    match self.collection_element(descriptor, item, depth) {
                        Ok(value) => accepted.push((index, value)),
                        Err(error) => errors.insert(
                            format!("{}[{}]", descriptor.internal_key(), index),
                            error,
                        ),
                    }
                }
                if !errors.is_empty() {
                    for (index, value) in accepted {
                        errors.accept(format!("{}[{}]", descriptor.internal_key(), index), value);
                    }
                    return Err(MappingError::InvalidValues(errors));
                }
                let mut accepted: Vec<FieldValue> =
                    accepted.into_iter().map(|(_, value)| value).collect();
                if descriptor.container() == Container::UniqueSequence {
                    accepted = dedup(accepted);
                }
                Ok(FieldValue::List(accepted))
            }
            (FieldKind::Map, Value::Object(entries)) => {
                let mut accepted = BTreeMap::new();
                let mut errors = ValidationErrors::new();
                for (entry_key, item) in entries {
                    match self.collection_element(descriptor, item, depth) {
                        Ok(value) => {
                            accepted.insert(entry_key.clone(), value);
                        }
                        Err(error) => errors.insert(
                            format!("{}[{}]", descriptor.internal_key(), entry_key),
                            error,
                        ),
                    }
                }
                if !errors.is_empty() {
                    for (entry_key, value) in accepted {
                        errors.accept(format!("{}[{}]", descriptor.internal_key(), entry_key), value);
                    }
                    return Err(MappingError::InvalidValues(errors));
                }
                Ok(FieldValue::Map(accepted))
            }
            (kind, other) => Err(MappingError::UnexpectedType {
                expected: kind.to_string(),
                found: json_kind(other).to_string(),
            }),
        }
    }

    /// Element of a list or map: transform, type-check, then the field's requirement
    fn collection_element(
        &self,
        descriptor: &MappingDescriptor,
        raw: &Value,
        depth: usize,
    ) -> MappingResult<FieldValue> {
        let value = self.element(descriptor, raw, depth)?;
        if self.mode == Mode::Validate {
            self.require(descriptor, &value)?;
        }
        Ok(value)
    }

    fn require(&self, descriptor: &MappingDescriptor, value: &FieldValue) -> MappingResult<()> {
        match descriptor.requirement() {
            Some(requirement) if !requirement.evaluate(Some(value)) => {
                Err(MappingError::RequirementFailed(requirement.to_string()))
            }
            _ => Ok(()),
        }
    }

    /// Transform and type-check a single (element) value
    fn element(
        &self,
        descriptor: &MappingDescriptor,
        raw: &Value,
        depth: usize,
    ) -> MappingResult<FieldValue> {
        if raw.is_null() {
            return Ok(FieldValue::Null);
        }

        let step = descriptor.transform_step();
        let value = match step.transformer() {
            Some(transformer) => transformer
                .transform(raw)
                .map_err(MappingError::TransformationFailed)?,
            None => match descriptor.target() {
                TargetType::Object(target) => return self.nested(target, raw, depth),
                _ => FieldValue::from_json(raw),
            },
        };

        self.check_type(descriptor.target(), value)
    }

    /// Instantiate and populate a nested mapped object
    fn nested(&self, target: &TypeRef, raw: &Value, depth: usize) -> MappingResult<FieldValue> {
        let Value::Object(values) = raw else {
            return Err(MappingError::UnexpectedType {
                expected: target.name().to_string(),
                found: json_kind(raw).to_string(),
            });
        };
        if depth >= self.config.max_depth {
            return Err(MappingError::TransformationFailed(format!(
                "maximum nesting depth {} exceeded",
                self.config.max_depth
            )));
        }

        let mut instance = instantiate(self.registry, target, values)?;
        let ty = instance.type_info();
        let outcome = self.run(values, &ty, Some(instance.as_ref()), depth + 1);

        let staged = match self.mode {
            Mode::Validate => outcome.into_result()?,
            Mode::Decode => {
                for (key, error) in outcome.errors.iter() {
                    warn!(type_name = %ty.name(), field = %key, error = %error, "Skipping persisted field");
                }
                outcome.staged
            }
        };
        assign(instance.as_mut(), staged)?;

        Ok(FieldValue::Object(instance))
    }

    /// Check a transformed value against the declared type, coercing where lossless
    fn check_type(&self, target: &TargetType, value: FieldValue) -> MappingResult<FieldValue> {
        let coerced = match (target, value) {
            (_, FieldValue::Null) => FieldValue::Null,
            (TargetType::Any, value) => value,
            (TargetType::Bool, value @ FieldValue::Bool(_)) => value,
            (TargetType::Integer, value @ FieldValue::Integer(_)) => value,
            (TargetType::Integer, FieldValue::Float(f))
                if self.config.coerce_integers && is_integral(f) =>
            {
                FieldValue::Integer(f as i64)
            }
            (TargetType::Number, value @ (FieldValue::Integer(_) | FieldValue::Float(_))) => value,
            (TargetType::String, value @ FieldValue::String(_)) => value,
            (TargetType::Date, value @ FieldValue::Date(_)) => value,
            (TargetType::Date, FieldValue::String(s)) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(FieldValue::Date)
                .map_err(|e| MappingError::TransformationFailed(format!("'{}' is not a date: {}", s, e)))?,
            (TargetType::DateTime, value @ FieldValue::DateTime(_)) => value,
            (TargetType::DateTime, FieldValue::String(s)) => DateTime::parse_from_rfc3339(&s)
                .map(|dt| FieldValue::DateTime(dt.with_timezone(&Utc)))
                .map_err(|e| {
                    MappingError::TransformationFailed(format!("'{}' is not a timestamp: {}", s, e))
                })?,
            (TargetType::Object(expected), FieldValue::Object(object))
                if object.type_info().is_a(expected) =>
            {
                FieldValue::Object(object)
            }
            (target, other) => {
                return Err(MappingError::UnexpectedType {
                    expected: target.to_string(),
                    found: other.type_name(),
                });
            }
        };
        Ok(coerced)
    }
}

/// Build an instance of `target`: registered factory first, then default constructor
pub(crate) fn instantiate(
    registry: &Registry,
    target: &TypeRef,
    values: &Map<String, Value>,
) -> MappingResult<Box<dyn Mappable>> {
    let failed = |reason: String| MappingError::InitializationFailed {
        type_name: target.name().to_string(),
        reason,
    };

    let instance = if let Some(factory) = registry.factory(target) {
        factory(target, values).map_err(failed)?
    } else if let Some(constructor) = registry.constructor(target) {
        constructor()
    } else {
        return Err(failed("no factory or default constructor registered".to_string()));
    };

    let produced = instance.type_info();
    if !produced.is_a(target) {
        return Err(failed(format!("factory produced unrelated type {}", produced)));
    }
    Ok(instance)
}

/// Assign staged values, collecting every failed assignment
pub(crate) fn assign(instance: &mut dyn Mappable, staged: Staged) -> MappingResult<()> {
    let mut errors = ValidationErrors::new();
    for (key, value) in staged {
        if let Err(reason) = instance.set_field(&key, value) {
            errors.insert(
                key.clone(),
                MappingError::TransformationFailed(format!("cannot assign '{}': {}", key, reason)),
            );
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(MappingError::InvalidValues(errors))
    }
}

fn is_integral(f: f64) -> bool {
    f.is_finite() && f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64
}

fn dedup(items: Vec<FieldValue>) -> Vec<FieldValue> {
    let mut unique: Vec<FieldValue> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.iter().any(|seen| seen.same_as(&item)) {
            unique.push(item);
        }
    }
    unique
}
