//! Output formats for type descriptions

use std::fmt::Write;

use super::describe::{FieldDescription, FieldType, TypeDescription};
use crate::mapping::FieldKind;
use crate::schema::{FieldSchema, MappingSchema, TypeSchema};

/// Mapping schema with one type per description
pub fn to_schema(types: &[TypeDescription]) -> MappingSchema {
    MappingSchema {
        types: types
            .iter()
            .map(|ty| TypeSchema {
                name: ty.name.clone(),
                parent: None,
                fields: ty.fields.iter().map(field_schema).collect(),
                projection_keys: Vec::new(),
            })
            .collect(),
    }
}

fn field_schema(field: &FieldDescription) -> FieldSchema {
    let mut schema = FieldSchema::new(field.internal_key.clone(), field.field_type.schema_name());
    if field.external_key != field.internal_key {
        schema.external_key = Some(field.external_key.clone());
    }
    schema.kind = field.kind;
    schema
}

/// Rust scaffolding: one struct per type, its `Mappable` impl, and a
/// `register_mappings` function registering every descriptor
pub fn render_rust(types: &[TypeDescription]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "use chrono::{{DateTime, NaiveDate, Utc}};");
    let _ = writeln!(out, "use once_cell::sync::Lazy;");
    let _ = writeln!(
        out,
        "use objmap_core::{{\n    FieldValue, Mappable, MappedType, Mapper, MappingDescriptor, TargetType, TypeInfo, TypeRef,\n    object, objects,\n}};"
    );

    for ty in types {
        out.push('\n');
        render_type(&mut out, ty);
    }

    out.push('\n');
    let _ = writeln!(out, "/// Register descriptors for every generated type");
    let _ = writeln!(out, "pub fn register_mappings(mapper: &Mapper) {{");
    for ty in types {
        let _ = writeln!(out, "    mapper.register::<{}>(vec![", ty.name);
        for field in &ty.fields {
            let _ = writeln!(out, "        {},", descriptor_expr(field));
        }
        let _ = writeln!(out, "    ]);");
    }
    let _ = writeln!(out, "}}");
    out
}

fn static_name(ty: &TypeDescription) -> String {
    format!("{}_TYPE", super::naming::snake_case(&ty.name).to_uppercase())
}

fn render_type(out: &mut String, ty: &TypeDescription) {
    let type_static = static_name(ty);
    let _ = writeln!(
        out,
        "static {}: Lazy<TypeRef> = Lazy::new(|| TypeInfo::root(\"{}\"));\n",
        type_static, ty.name
    );

    let _ = writeln!(out, "#[derive(Debug, Clone, Default)]");
    let _ = writeln!(out, "pub struct {} {{", ty.name);
    for field in &ty.fields {
        let _ = writeln!(out, "    pub {}: {},", field.internal_key, rust_type(field));
    }
    let _ = writeln!(out, "}}\n");

    let _ = writeln!(out, "impl MappedType for {} {{", ty.name);
    let _ = writeln!(out, "    fn static_type() -> TypeRef {{");
    let _ = writeln!(out, "        {}.clone()", type_static);
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}\n");

    let _ = writeln!(out, "impl Mappable for {} {{", ty.name);
    let _ = writeln!(out, "    fn type_info(&self) -> TypeRef {{");
    let _ = writeln!(out, "        Self::static_type()");
    let _ = writeln!(out, "    }}\n");

    let _ = writeln!(out, "    fn get_field(&self, key: &str) -> Option<FieldValue> {{");
    let _ = writeln!(out, "        match key {{");
    for field in &ty.fields {
        let _ = writeln!(out, "            \"{}\" => {},", field.internal_key, getter_expr(field));
    }
    let _ = writeln!(out, "            _ => None,");
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "    }}\n");

    let _ = writeln!(
        out,
        "    fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), String> {{"
    );
    let _ = writeln!(out, "        match key {{");
    for field in &ty.fields {
        let _ = writeln!(out, "            \"{}\" => {},", field.internal_key, setter_expr(field));
    }
    let _ = writeln!(out, "            _ => return Err(format!(\"unknown field '{{}}'\", key)),");
    let _ = writeln!(out, "        }}");
    let _ = writeln!(out, "        Ok(())");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out, "}}");
}

fn scalar_rust_type(field_type: &FieldType) -> &str {
    match field_type {
        FieldType::Any => "FieldValue",
        FieldType::Bool => "bool",
        FieldType::Integer => "i64",
        FieldType::Number => "f64",
        FieldType::String => "String",
        FieldType::Date => "NaiveDate",
        FieldType::DateTime => "DateTime<Utc>",
        FieldType::Object(name) => name,
    }
}

fn rust_type(field: &FieldDescription) -> String {
    let inner = scalar_rust_type(&field.field_type);
    match field.kind {
        FieldKind::List => format!("Vec<{}>", inner),
        FieldKind::Map => format!("std::collections::BTreeMap<String, {}>", inner),
        FieldKind::Scalar => format!("Option<{}>", inner),
    }
}

fn getter_expr(field: &FieldDescription) -> String {
    let name = &field.internal_key;
    match (&field.field_type, field.kind) {
        (FieldType::Object(_), FieldKind::Scalar) => format!("self.{}.clone().map(object)", name),
        (FieldType::Object(_), _) => format!("Some(objects(self.{}.clone()))", name),
        (_, FieldKind::Scalar) => format!("self.{}.clone().map(FieldValue::from)", name),
        _ => format!("Some(FieldValue::from(self.{}.clone()))", name),
    }
}

fn setter_expr(field: &FieldDescription) -> String {
    let name = &field.internal_key;
    match (&field.field_type, field.kind) {
        (FieldType::Object(type_name), FieldKind::Scalar) => format!(
            "self.{} = match value {{\n                FieldValue::Null => None,\n                other => Some(other.into_object().ok_or(\"expected {}\")?),\n            }}",
            name, type_name
        ),
        (FieldType::Object(type_name), _) => format!(
            "self.{} = value.into_objects().ok_or(\"expected list of {}\")?",
            name, type_name
        ),
        _ => format!("self.{} = value.extract()?", name),
    }
}

fn descriptor_expr(field: &FieldDescription) -> String {
    let target = match &field.field_type {
        FieldType::Any => "TargetType::Any".to_string(),
        FieldType::Bool => "TargetType::Bool".to_string(),
        FieldType::Integer => "TargetType::Integer".to_string(),
        FieldType::Number => "TargetType::Number".to_string(),
        FieldType::String => "TargetType::String".to_string(),
        FieldType::Date => "TargetType::Date".to_string(),
        FieldType::DateTime => "TargetType::DateTime".to_string(),
        FieldType::Object(name) => format!("TargetType::Object({}::static_type())", name),
    };

    let mut expr = format!("MappingDescriptor::builder(\"{}\")", field.internal_key);
    if field.external_key != field.internal_key {
        let _ = write!(expr, "\n            .external_key(\"{}\")", field.external_key);
    }
    let _ = write!(expr, "\n            .target({})", target);
    match field.kind {
        FieldKind::Scalar => {}
        FieldKind::List => expr.push_str("\n            .kind(objmap_core::FieldKind::List)"),
        FieldKind::Map => expr.push_str("\n            .kind(objmap_core::FieldKind::Map)"),
    }
    expr.push_str("\n            .build()");
    expr
}
