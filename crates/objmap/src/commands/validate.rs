//! Validate command implementation

use std::path::PathBuf;

use objmap_core::{Mapper, MappingError, TypeInfo, pretty_error};
use serde_json::{Map, Value};
use tracing::info;

use super::{documents, load_schema_type, parse_document, read_input};
use crate::error::CliError;
use crate::output::indent;

/// Arguments for the `validate` command
pub struct ValidateArgs {
    /// Mapping schema file
    pub schema: PathBuf,
    /// Type to validate against
    pub type_name: String,
    /// Input document, or `-` for stdin
    pub input: String,
}

/// Validate every document, returning the failures by label
pub fn validate_documents(
    mapper: &Mapper,
    ty: &TypeInfo,
    documents: &[(String, Map<String, Value>)],
) -> Vec<(String, MappingError)> {
    documents
        .iter()
        .filter_map(|(label, values)| {
            mapper
                .validate(values, ty)
                .err()
                .map(|error| (label.clone(), error))
        })
        .collect()
}

/// Handle the `validate` command
pub fn handle_validate(args: &ValidateArgs) -> Result<(), CliError> {
    let (mapper, ty) = load_schema_type(&args.schema, &args.type_name)?;
    let content = read_input(&args.input)?;
    let docs = documents(parse_document(&args.input, &content)?)?;

    info!(documents = docs.len(), type_name = %ty.name(), "Validating input");
    let failures = validate_documents(&mapper, &ty, &docs);

    if failures.is_empty() {
        println!("Validation successful ({} document(s))", docs.len());
        return Ok(());
    }

    for (label, error) in &failures {
        eprintln!("{}:", label);
        eprint!("{}", indent(&pretty_error(error), "  "));
    }
    Err(CliError::ValidationFailed {
        failed: failures.len(),
        total: docs.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_documents_reports_failures() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "person.yaml", PERSON_SCHEMA);
        let (mapper, ty) = load_schema_type(&schema, "Person").unwrap();

        let docs = documents(serde_json::json!([
            {"name": "Ada", "person_age": 36},
            {"person_age": -1, "level": "boss"}
        ]))
        .unwrap();
        let failures = validate_documents(&mapper, &ty, &docs);

        assert_eq!(failures.len(), 1);
        let (label, error) = &failures[0];
        assert_eq!(label, "document[1]");
        let keys: Vec<&str> = error.field_errors().unwrap().keys().collect();
        assert_eq!(keys, vec!["age", "level", "name"]);
    }

    #[test]
    fn test_handle_validate() {
        let dir = TempDir::new().unwrap();
        let schema = write(&dir, "person.yaml", PERSON_SCHEMA);
        let good = write(&dir, "good.json", r#"{"name": "Ada", "level": "senior"}"#);
        let bad = write(&dir, "bad.yaml", "- name: Ada\n- person_age: 3\n");

        let args = ValidateArgs {
            schema: schema.clone(),
            type_name: "Person".to_string(),
            input: good.display().to_string(),
        };
        handle_validate(&args).unwrap();

        let args = ValidateArgs {
            input: bad.display().to_string(),
            ..args
        };
        assert!(matches!(
            handle_validate(&args),
            Err(CliError::ValidationFailed { failed: 1, total: 2 })
        ));
    }
}
