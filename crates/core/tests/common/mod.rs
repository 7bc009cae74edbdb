//! Mapped types shared by the integration tests

#![allow(dead_code)]

use objmap_core::{
    EnumTransformer, FieldKind, FieldValue, Mappable, MappedType, Mapper, MappingDescriptor,
    Requirement, TargetType, TypeInfo, TypeRef, object,
};
use once_cell::sync::Lazy;
use serde_json::{Map, Value};

pub static PERSON: Lazy<TypeRef> = Lazy::new(|| TypeInfo::root("Person"));
pub static EMPLOYEE: Lazy<TypeRef> = Lazy::new(|| TypeInfo::child_of("Employee", &PERSON));
pub static ADDRESS: Lazy<TypeRef> = Lazy::new(|| TypeInfo::root("Address"));

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub city: Option<String>,
    pub zip: Option<String>,
}

impl MappedType for Address {
    fn static_type() -> TypeRef {
        ADDRESS.clone()
    }
}

impl Mappable for Address {
    fn type_info(&self) -> TypeRef {
        Self::static_type()
    }

    fn get_field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "city" => self.city.clone().map(FieldValue::from),
            "zip" => self.zip.clone().map(FieldValue::from),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), String> {
        match key {
            "city" => self.city = value.extract()?,
            "zip" => self.zip = value.extract()?,
            _ => return Err(format!("unknown field '{}'", key)),
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Person {
    pub name: Option<String>,
    pub age: Option<i64>,
    pub tags: Vec<String>,
    pub address: Option<Address>,
    pub priority: Option<i64>,
}

impl MappedType for Person {
    fn static_type() -> TypeRef {
        PERSON.clone()
    }
}

impl Mappable for Person {
    fn type_info(&self) -> TypeRef {
        Self::static_type()
    }

    fn get_field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "name" => self.name.clone().map(FieldValue::from),
            "age" => self.age.map(FieldValue::from),
            "tags" => Some(FieldValue::from(self.tags.clone())),
            "address" => self.address.clone().map(object),
            "priority" => self.priority.map(FieldValue::from),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), String> {
        match key {
            "name" => self.name = value.extract()?,
            "age" => self.age = value.extract()?,
            "tags" => self.tags = value.extract()?,
            "address" => {
                self.address = match value {
                    FieldValue::Null => None,
                    other => Some(other.into_object().ok_or("expected Address")?),
                }
            }
            "priority" => self.priority = value.extract()?,
            _ => return Err(format!("unknown field '{}'", key)),
        }
        Ok(())
    }
}

/// Subtype of `Person` that only refuses ages over 70
#[derive(Debug, Clone, Default)]
pub struct Employee {
    pub name: Option<String>,
    pub age: Option<i64>,
}

impl MappedType for Employee {
    fn static_type() -> TypeRef {
        EMPLOYEE.clone()
    }
}

impl Mappable for Employee {
    fn type_info(&self) -> TypeRef {
        Self::static_type()
    }

    fn get_field(&self, key: &str) -> Option<FieldValue> {
        match key {
            "name" => self.name.clone().map(FieldValue::from),
            "age" => self.age.map(FieldValue::from),
            _ => None,
        }
    }

    fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), String> {
        match key {
            "name" => self.name = value.extract()?,
            "age" => self.age = value.extract()?,
            _ => return Err(format!("unknown field '{}'", key)),
        }
        Ok(())
    }

    fn validate_field(&self, key: &str, value: &FieldValue) -> Result<(), String> {
        match (key, value.as_i64()) {
            ("age", Some(age)) if age > 70 => Err(format!("{} is past retirement", age)),
            _ => Ok(()),
        }
    }
}

pub fn priority() -> EnumTransformer {
    EnumTransformer::new([(0, "low"), (1, "high")])
}

/// Person descriptors; `age` is read from `person_age`
pub fn person_descriptors() -> Vec<MappingDescriptor> {
    vec![
        MappingDescriptor::builder("name")
            .target(TargetType::String)
            .requires(Requirement::exists())
            .build(),
        MappingDescriptor::builder("age")
            .external_key("person_age")
            .target(TargetType::Integer)
            // optional, but within range when given
            .requires(Requirement::either(
                Requirement::not(Requirement::exists()),
                vec![
                    Requirement::greater_than_or_equal_to(0),
                    Requirement::less_than(150),
                ],
            ))
            .build(),
        MappingDescriptor::builder("tags")
            .target(TargetType::String)
            .kind(FieldKind::List)
            .build(),
        MappingDescriptor::object("address", &ADDRESS),
        MappingDescriptor::builder("priority")
            .transformer(priority())
            .build(),
    ]
}

pub fn address_descriptors() -> Vec<MappingDescriptor> {
    vec![
        MappingDescriptor::builder("city")
            .target(TargetType::String)
            .requires(Requirement::exists())
            .build(),
        MappingDescriptor::string("zip"),
    ]
}

/// Mapper with `Person` and `Address` registered
pub fn person_mapper() -> Mapper {
    let mapper = Mapper::new();
    mapper.register::<Address>(address_descriptors());
    mapper.register::<Person>(person_descriptors());
    mapper
}

pub fn values(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, found {}", other),
    }
}
