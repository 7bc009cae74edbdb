//! Turning a schema into registered types and descriptors

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info};

use super::error::{SchemaError, SchemaResult};
use super::types::{FieldSchema, MappingSchema, RequirementSchema, TypeSchema};
use crate::mapper::Mapper;
use crate::mapping::{
    Container, DateFormatter, DescriptorBuilder, EnumTransformer, FieldKind, MappingDescriptor,
    NumberFormatter, TargetType,
};
use crate::object::{Mappable, Record, TypeInfo, TypeRef};
use crate::requirement::Requirement;

/// Types created by [`MappingSchema::install`], by name
#[derive(Debug, Clone, Default)]
pub struct SchemaTypes {
    types: BTreeMap<String, TypeRef>,
}

impl SchemaTypes {
    pub fn get(&self, name: &str) -> Option<&TypeRef> {
        self.types.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl MappingSchema {
    /// Register every type with `mapper`
    ///
    /// Each type gets its descriptors, a [`Record`] factory and its projection
    /// keys. Nothing is registered if the schema is inconsistent.
    pub fn install(&self, mapper: &Mapper) -> SchemaResult<SchemaTypes> {
        let types = self.resolve_types()?;

        let mut prepared = Vec::with_capacity(self.types.len());
        for ty in &self.types {
            let descriptors = self
                .inherited_fields(ty)
                .into_iter()
                .map(|field| build_descriptor(ty, field, &types))
                .collect::<SchemaResult<Vec<_>>>()?;
            prepared.push((ty, descriptors));
        }

        for (schema, descriptors) in prepared {
            let ty = &types.types[&schema.name];
            mapper.register_descriptors(ty, descriptors);
            mapper.register_factory(ty, |requested: &TypeRef, _| {
                Ok(Box::new(Record::new(requested.clone())) as Box<dyn Mappable>)
            });
            if !schema.projection_keys.is_empty() {
                mapper.register_projection_keys(ty, schema.projection_keys.iter().cloned());
            }
        }

        info!(types = types.len(), "Installed mapping schema");
        Ok(types)
    }

    /// Fields of `ty` after those of its ancestors; a redeclared key replaces the inherited field
    fn inherited_fields<'s>(&'s self, ty: &'s TypeSchema) -> Vec<&'s FieldSchema> {
        let mut chain = vec![ty];
        let mut current = ty;
        while let Some(parent) = current.parent.as_deref().and_then(|name| self.get_type(name)) {
            chain.push(parent);
            current = parent;
        }

        let mut fields: Vec<&FieldSchema> = Vec::new();
        for schema in chain.into_iter().rev() {
            for field in &schema.fields {
                match fields.iter().position(|f| f.key == field.key) {
                    Some(index) => fields[index] = field,
                    None => fields.push(field),
                }
            }
        }
        fields
    }

    /// Create type identities, parents before children
    fn resolve_types(&self) -> SchemaResult<SchemaTypes> {
        let mut seen = HashSet::new();
        for ty in &self.types {
            if !seen.insert(ty.name.as_str()) {
                return Err(SchemaError::DuplicateType(ty.name.clone()));
            }
        }
        for ty in &self.types {
            if let Some(parent) = &ty.parent {
                if !seen.contains(parent.as_str()) {
                    return Err(SchemaError::UnknownType(parent.clone()));
                }
            }
        }

        let mut resolved: BTreeMap<String, TypeRef> = BTreeMap::new();
        let mut pending: Vec<&TypeSchema> = self.types.iter().collect();
        while !pending.is_empty() {
            let before = pending.len();
            pending.retain(|ty| {
                let type_ref = match &ty.parent {
                    None => TypeInfo::root(ty.name.clone()),
                    Some(parent) => match resolved.get(parent) {
                        Some(parent) => TypeInfo::child_of(ty.name.clone(), parent),
                        None => return true,
                    },
                };
                debug!(type_name = %ty.name, parent = ?ty.parent, "Resolved schema type");
                resolved.insert(ty.name.clone(), type_ref);
                false
            });
            if pending.len() == before {
                return Err(SchemaError::InheritanceCycle(pending[0].name.clone()));
            }
        }

        Ok(SchemaTypes { types: resolved })
    }
}

fn build_descriptor(
    ty: &TypeSchema,
    field: &FieldSchema,
    types: &SchemaTypes,
) -> SchemaResult<MappingDescriptor> {
    let invalid = |reason: String| SchemaError::InvalidField {
        type_name: ty.name.clone(),
        field: field.key.clone(),
        reason,
    };

    let mut builder = DescriptorBuilder::new(field.key.as_str())
        .target(target_type(&field.field_type, types)?)
        .kind(field.kind);

    if let Some(external) = &field.external_key {
        builder = builder.external_key(external.as_str());
    }

    if field.unique {
        if field.kind != FieldKind::List {
            return Err(invalid("unique requires kind list".to_string()));
        }
        builder = builder.container(Container::UniqueSequence);
    }

    if !field.enum_values.is_empty() {
        builder = builder.transformer(EnumTransformer::from(field.enum_values.clone()));
    }

    if let Some(format) = &field.format {
        builder = match format.split_once(':') {
            None if format == "rfc3339" => builder.formatter(DateFormatter::rfc3339()),
            None if format == "number" => builder.formatter(NumberFormatter::new()),
            Some(("date", pattern)) => builder.formatter(DateFormatter::date_only(pattern)),
            Some(("datetime", pattern)) => builder.formatter(DateFormatter::with_pattern(pattern)),
            _ => return Err(invalid(format!("unknown format '{}'", format))),
        };
    }

    if !field.requires.is_empty() {
        builder = builder.requires(requirement_group(&field.requires)?);
    }

    Ok(builder.build())
}

fn target_type(name: &str, types: &SchemaTypes) -> SchemaResult<TargetType> {
    let target = match name {
        "any" => TargetType::Any,
        "bool" | "boolean" => TargetType::Bool,
        "integer" | "int" => TargetType::Integer,
        "number" | "float" => TargetType::Number,
        "string" => TargetType::String,
        "date" => TargetType::Date,
        "datetime" | "date-time" => TargetType::DateTime,
        other => match types.get(other) {
            Some(ty) => TargetType::Object(ty.clone()),
            None => return Err(SchemaError::UnknownType(other.to_string())),
        },
    };
    Ok(target)
}

/// AND of every entry
fn requirement_group(entries: &[RequirementSchema]) -> SchemaResult<Requirement> {
    let members = entries
        .iter()
        .map(requirement)
        .collect::<SchemaResult<Vec<_>>>()?;
    Ok(Requirement::from(members))
}

fn requirement(entry: &RequirementSchema) -> SchemaResult<Requirement> {
    let mut members = Vec::new();

    if entry.exists {
        members.push(Requirement::exists());
    }
    if let Some(t) = entry.greater_than {
        members.push(Requirement::greater_than(t));
    }
    if let Some(t) = entry.greater_than_or_equal_to {
        members.push(Requirement::greater_than_or_equal_to(t));
    }
    if let Some(t) = entry.equal_to {
        members.push(Requirement::equal_to(t));
    }
    if let Some(t) = entry.less_than {
        members.push(Requirement::less_than(t));
    }
    if let Some(t) = entry.less_than_or_equal_to {
        members.push(Requirement::less_than_or_equal_to(t));
    }
    if let Some(pattern) = &entry.matches {
        let matches = Requirement::matches(pattern)
            .map_err(|e| SchemaError::InvalidRequirement(format!("bad pattern '{}': {}", pattern, e)))?;
        members.push(matches);
    }
    if let Some(groups) = &entry.either {
        if groups.is_empty() {
            return Err(SchemaError::InvalidRequirement("either needs at least one group".to_string()));
        }
        let groups = groups
            .iter()
            .map(|group| requirement_group(group))
            .collect::<SchemaResult<Vec<_>>>()?;
        members.push(Requirement::any_of(groups));
    }
    if let Some(negated) = &entry.not {
        members.push(Requirement::not(requirement_group(negated)?));
    }

    match members.len() {
        0 => Err(SchemaError::InvalidRequirement("empty requirement entry".to_string())),
        1 => Ok(members.remove(0)),
        _ => Ok(Requirement::from(members)),
    }
}
