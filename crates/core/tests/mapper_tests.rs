//! Mapper engine tests: validate, apply, projection

mod common;

use std::sync::Arc;
use std::thread;

use common::{
    ADDRESS, Address, EMPLOYEE, Employee, PERSON, Person, person_descriptors, person_mapper,
    values,
};
use objmap_core::{
    Container, FieldKind, FieldValue, Mappable, Mapper, MappingDescriptor, MappingError, Record,
    Requirement, TargetType, TypeInfo, pretty_error,
};
use serde_json::json;

#[test]
fn test_required_name_rejects_null() {
    let mapper = Mapper::new();
    mapper.register::<Person>(vec![
        MappingDescriptor::builder("name")
            .target(TargetType::String)
            .requires(Requirement::exists())
            .build(),
    ]);

    let err = mapper
        .validate(&values(json!({"name": null})), &PERSON)
        .unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(matches!(errors.get("name"), Some(MappingError::RequirementFailed(_))));

    let input = json!({"name": "Ada"});
    let person: Person = mapper.object_of(&values(input.clone())).unwrap();
    assert_eq!(person.name.as_deref(), Some("Ada"));
    assert_eq!(mapper.projection(&person), input);
}

#[test]
fn test_apply_projection_round_trip() {
    let mapper = person_mapper();
    let input = json!({
        "name": "Ada",
        "person_age": 36,
        "tags": ["math", "engines"],
        "address": {"city": "London", "zip": "W1"},
        "priority": "high"
    });

    let person: Person = mapper.object_of(&values(input.clone())).unwrap();
    assert_eq!(person.age, Some(36));
    assert_eq!(person.priority, Some(1));
    assert_eq!(
        person.address,
        Some(Address {
            city: Some("London".to_string()),
            zip: Some("W1".to_string()),
        })
    );

    assert_eq!(mapper.projection(&person), input);
}

#[test]
fn test_failed_apply_changes_nothing() {
    let mapper = person_mapper();
    let mut person = Person {
        name: Some("Old".to_string()),
        age: Some(40),
        ..Person::default()
    };

    let err = mapper
        .apply(
            &values(json!({"name": "New", "person_age": -1, "tags": ["x"]})),
            &mut person,
        )
        .unwrap_err();

    assert!(err.field_errors().unwrap().contains("age"));
    assert_eq!(person.name.as_deref(), Some("Old"));
    assert_eq!(person.age, Some(40));
    assert!(person.tags.is_empty());
}

#[test]
fn test_all_failures_reported_by_internal_key() {
    let mapper = person_mapper();
    let err = mapper
        .validate(
            &values(json!({
                "name": 42,
                "person_age": 200,
                "priority": "medium",
                "tags": ["ok"]
            })),
            &PERSON,
        )
        .unwrap_err();

    let errors = err.field_errors().unwrap();
    let keys: Vec<&str> = errors.keys().collect();
    assert_eq!(keys, vec!["age", "name", "priority"]);
    assert!(matches!(errors.get("name"), Some(MappingError::UnexpectedType { .. })));
    assert!(matches!(errors.get("age"), Some(MappingError::RequirementFailed(_))));
    assert!(matches!(
        errors.get("priority"),
        Some(MappingError::TransformationFailed(_))
    ));
    assert!(errors.accepted().contains_key("tags"));

    let report = pretty_error(&err);
    assert!(report.starts_with("Invalid values (3 field(s)):"));
}

#[test]
fn test_absent_keys_are_left_alone() {
    let mapper = person_mapper();
    let mut person = Person {
        age: Some(40),
        tags: vec!["kept".to_string()],
        ..Person::default()
    };

    mapper.apply(&values(json!({"name": "Ada"})), &mut person).unwrap();
    assert_eq!(person.name.as_deref(), Some("Ada"));
    assert_eq!(person.age, Some(40));
    assert_eq!(person.tags, vec!["kept".to_string()]);

    // explicit null is assigned
    mapper
        .apply(&values(json!({"name": "Ada", "person_age": null})), &mut person)
        .unwrap();
    assert_eq!(person.age, None);
}

#[test]
fn test_absent_required_key_fails() {
    let mapper = person_mapper();
    let err = mapper.validate(&values(json!({})), &PERSON).unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["name"]);
}

#[test]
fn test_enum_field() {
    let mapper = person_mapper();
    let person: Person = mapper
        .object_of(&values(json!({"name": "Ada", "priority": "low"})))
        .unwrap();
    assert_eq!(person.priority, Some(0));
    assert_eq!(
        mapper.projection_for_keys(&person, &["priority"]),
        json!({"priority": "low"})
    );
}

#[test]
fn test_list_element_errors_keep_other_elements() {
    let mapper = person_mapper();
    let err = mapper
        .validate(
            &values(json!({"name": "Ada", "tags": ["a", 2, "c"]})),
            &PERSON,
        )
        .unwrap_err();

    let tags = match err.field_errors().unwrap().get("tags") {
        Some(MappingError::InvalidValues(elements)) => elements.clone(),
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(tags.keys().collect::<Vec<_>>(), vec!["tags[1]"]);
    assert!(matches!(
        tags.get("tags[1]"),
        Some(MappingError::UnexpectedType { .. })
    ));
    assert_eq!(
        tags.accepted().get("tags[0]").and_then(FieldValue::as_str),
        Some("a")
    );
    assert_eq!(
        tags.accepted().get("tags[2]").and_then(FieldValue::as_str),
        Some("c")
    );
}

#[test]
fn test_map_and_unique_collections() {
    let ty = TypeInfo::root("Scores");
    let mapper = Mapper::new();
    mapper.register_descriptors(
        &ty,
        vec![
            MappingDescriptor::map_of("scores", TargetType::Integer),
            MappingDescriptor::collection_of("labels", Container::UniqueSequence, TargetType::String),
        ],
    );
    mapper.register_factory(&ty, |ty, _| Ok(Box::new(Record::new(ty.clone())) as Box<dyn Mappable>));

    let record = mapper
        .object_of_type(
            &values(json!({
                "scores": {"ada": 3, "alan": 2},
                "labels": ["b", "a", "b"]
            })),
            &ty,
        )
        .unwrap();
    assert_eq!(
        mapper.projection(record.as_ref()),
        json!({"scores": {"ada": 3, "alan": 2}, "labels": ["b", "a"]})
    );

    let err = mapper
        .validate(&values(json!({"scores": {"ada": "x", "alan": 2}})), &ty)
        .unwrap_err();
    let scores = err.field_errors().unwrap().get("scores").unwrap();
    let elements = scores.field_errors().unwrap();
    assert!(elements.contains("scores[ada]"));
    assert!(elements.accepted().contains_key("scores[alan]"));

    let err = mapper
        .validate(&values(json!({"labels": "single"})), &ty)
        .unwrap_err();
    assert!(matches!(
        err.field_errors().unwrap().get("labels"),
        Some(MappingError::UnexpectedType { .. })
    ));
}

#[test]
fn test_collection_requirements_apply_per_element() {
    let ty = TypeInfo::root("Scoreboard");
    let mapper = Mapper::new();
    mapper.register_descriptors(
        &ty,
        vec![
            MappingDescriptor::builder("scores")
                .kind(FieldKind::List)
                .target(TargetType::Integer)
                .requires(Requirement::greater_than(0))
                .build(),
            MappingDescriptor::builder("ranks")
                .kind(FieldKind::Map)
                .target(TargetType::Integer)
                .requires(Requirement::greater_than(0))
                .build(),
        ],
    );

    mapper
        .validate(&values(json!({"scores": [1, 2, 3], "ranks": {"ada": 1, "alan": 2}})), &ty)
        .unwrap();

    let err = mapper
        .validate(
            &values(json!({"scores": [1, -2, 3], "ranks": {"ada": 1, "alan": 0}})),
            &ty,
        )
        .unwrap_err();
    let errors = err.field_errors().unwrap();
    assert_eq!(errors.keys().collect::<Vec<_>>(), vec!["ranks", "scores"]);

    let scores = errors.get("scores").unwrap().field_errors().unwrap();
    assert_eq!(scores.keys().collect::<Vec<_>>(), vec!["scores[1]"]);
    assert!(matches!(scores.get("scores[1]"), Some(MappingError::RequirementFailed(_))));
    assert_eq!(
        scores.accepted().get("scores[0]").and_then(FieldValue::as_i64),
        Some(1)
    );
    assert_eq!(
        scores.accepted().get("scores[2]").and_then(FieldValue::as_i64),
        Some(3)
    );

    let ranks = errors.get("ranks").unwrap().field_errors().unwrap();
    assert_eq!(ranks.keys().collect::<Vec<_>>(), vec!["ranks[alan]"]);
    assert!(matches!(ranks.get("ranks[alan]"), Some(MappingError::RequirementFailed(_))));
    assert_eq!(
        ranks.accepted().get("ranks[ada]").and_then(FieldValue::as_i64),
        Some(1)
    );
}

#[test]
fn test_nested_object_errors() {
    let mapper = person_mapper();
    let err = mapper
        .validate(
            &values(json!({"name": "Ada", "address": {"zip": "W1"}})),
            &PERSON,
        )
        .unwrap_err();

    let address = err.field_errors().unwrap().get("address").unwrap();
    let nested = address.field_errors().unwrap();
    assert!(matches!(nested.get("city"), Some(MappingError::RequirementFailed(_))));

    let err = mapper
        .validate(&values(json!({"name": "Ada", "address": "London"})), &PERSON)
        .unwrap_err();
    assert!(matches!(
        err.field_errors().unwrap().get("address"),
        Some(MappingError::UnexpectedType { .. })
    ));
}

#[test]
fn test_subtype_inherits_descriptors() {
    let mapper = Mapper::new();
    mapper.register::<Person>(person_descriptors());

    // Employee has no registrations of its own
    let err = mapper.validate(&values(json!({})), &EMPLOYEE).unwrap_err();
    assert!(err.field_errors().unwrap().contains("name"));

    let mut employee = Employee::default();
    mapper
        .apply(&values(json!({"name": "Grace", "person_age": 45})), &mut employee)
        .unwrap();
    assert_eq!(employee.name.as_deref(), Some("Grace"));
    assert_eq!(employee.age, Some(45));

    assert_eq!(
        mapper.projection_for_keys(&employee, &["name", "person_age"]),
        json!({"name": "Grace", "person_age": 45})
    );
}

#[test]
fn test_self_validation() {
    let mapper = Mapper::new();
    mapper.register::<Person>(person_descriptors());
    let input = values(json!({"name": "Grace", "person_age": 85}));

    // type-level validation has no instance to ask
    mapper.validate(&input, &EMPLOYEE).unwrap();

    let employee = Employee::default();
    let err = mapper.validate_on(&input, &employee).unwrap_err();
    match err.field_errors().unwrap().get("age") {
        Some(MappingError::RequirementFailed(reason)) => assert!(reason.contains("retirement")),
        other => panic!("unexpected {:?}", other),
    }

    let mut employee = Employee::default();
    assert!(mapper.apply(&input, &mut employee).is_err());
    assert_eq!(employee.age, None);
}

#[test]
fn test_factory_serves_subtypes() {
    let mapper = Mapper::new();
    mapper.register::<Person>(person_descriptors());
    mapper.register_factory(&PERSON, |ty, _| {
        if ty.name() == "Employee" {
            Ok(Box::new(Employee::default()) as Box<dyn Mappable>)
        } else {
            Ok(Box::new(Person::default()) as Box<dyn Mappable>)
        }
    });

    let built = mapper
        .object_of_type(&values(json!({"name": "Grace"})), &EMPLOYEE)
        .unwrap();
    assert_eq!(built.type_info().name(), "Employee");
    assert_eq!(
        built.get_field("name").and_then(|v| v.as_str().map(String::from)),
        Some("Grace".to_string())
    );
}

#[test]
fn test_unregistered_type_projection_passes_through() {
    let mapper = Mapper::new();
    let mut record = Record::new(TypeInfo::root("Loose"));
    record.set_field("answer", FieldValue::from(42)).unwrap();
    assert_eq!(mapper.projection(&record), json!({"answer": 42}));

    // typed instances without a passthrough representation project to null
    assert_eq!(mapper.projection(&Address::default()), serde_json::Value::Null);
}

#[derive(Debug, Clone)]
struct Stamp {
    code: String,
}

impl Mappable for Stamp {
    fn type_info(&self) -> objmap_core::TypeRef {
        TypeInfo::root("Stamp")
    }

    fn get_field(&self, _key: &str) -> Option<FieldValue> {
        None
    }

    fn set_field(&mut self, key: &str, _value: FieldValue) -> Result<(), String> {
        Err(format!("Stamp has no field '{}'", key))
    }

    fn passthrough(&self) -> serde_json::Value {
        json!({"code": self.code})
    }
}

#[test]
fn test_nested_unmapped_instance_uses_passthrough() {
    let letter = TypeInfo::root("Letter");
    let mapper = Mapper::new();
    mapper.register_descriptors(
        &letter,
        vec![
            MappingDescriptor::string("to"),
            MappingDescriptor::builder("stamp").target(TargetType::Any).build(),
            MappingDescriptor::object("address", &ADDRESS),
        ],
    );

    let mut record = Record::new(letter.clone());
    record.set_field("to", FieldValue::from("Ada")).unwrap();
    record
        .set_field(
            "stamp",
            FieldValue::Object(Box::new(Stamp {
                code: "1st".to_string(),
            })),
        )
        .unwrap();
    record
        .set_field("address", FieldValue::Object(Box::new(Address::default())))
        .unwrap();

    assert_eq!(
        mapper.projection(&record),
        json!({"to": "Ada", "stamp": {"code": "1st"}, "address": null})
    );
}

#[test]
fn test_unregistered_type_without_constructor() {
    let mapper = Mapper::new();
    let err = mapper
        .object_of_type(&values(json!({})), &ADDRESS)
        .unwrap_err();
    assert!(matches!(err, MappingError::InitializationFailed { .. }));
}

#[test]
fn test_projection_defaults_and_null_sentinel() {
    let mapper = person_mapper();
    mapper.register_projection_keys(&PERSON, ["name", "person_age"]);

    let person = Person {
        name: Some("Ada".to_string()),
        priority: Some(9),
        ..Person::default()
    };
    assert_eq!(
        mapper.projection(&person),
        json!({"name": "Ada", "person_age": null})
    );
    // reverse transform failure yields null
    assert_eq!(
        mapper.projection_for_keys(&person, &["priority"]),
        json!({"priority": null})
    );
}

#[test]
fn test_transform_function_field() {
    let ty = TypeInfo::root("Temperature");
    let mapper = Mapper::new();
    mapper.register_descriptors(
        &ty,
        vec![
            MappingDescriptor::builder("celsius")
                .external_key("fahrenheit")
                .target(TargetType::Number)
                .transform_fn(objmap_core::TransformFunction::new(
                    |v| {
                        v.as_f64()
                            .map(|f| FieldValue::Float((f - 32.0) * 5.0 / 9.0))
                            .ok_or_else(|| "expected number".to_string())
                    },
                    |v| {
                        v.as_f64()
                            .map(|c| json!(c * 9.0 / 5.0 + 32.0))
                            .ok_or_else(|| "expected number".to_string())
                    },
                ))
                .build(),
        ],
    );
    mapper.register_factory(&ty, |ty, _| Ok(Box::new(Record::new(ty.clone())) as Box<dyn Mappable>));

    let record = mapper
        .object_of_type(&values(json!({"fahrenheit": 212.0})), &ty)
        .unwrap();
    assert_eq!(
        record.get_field("celsius").and_then(|v| v.as_f64()),
        Some(100.0)
    );
    assert_eq!(mapper.projection(record.as_ref()), json!({"fahrenheit": 212.0}));
}

#[test]
fn test_concurrent_registration_and_validation() {
    let mapper = Arc::new(person_mapper());
    let input = values(json!({"name": "Ada", "person_age": 36}));

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let mapper = Arc::clone(&mapper);
            let input = input.clone();
            thread::spawn(move || {
                if i % 2 == 0 {
                    mapper.register::<Person>(person_descriptors());
                }
                let person: Person = mapper.object_of(&input).unwrap();
                person.age
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), Some(36));
    }
}

#[test]
fn test_list_kind_descriptor_shape() {
    let d = MappingDescriptor::list_of("tags", TargetType::String);
    assert_eq!(d.kind(), FieldKind::List);
}
