use std::sync::OnceLock;

use serde_json::Value;

use crate::error::{Result, SchemaError};
use crate::report::ValidationReport;
use crate::validator::Validator;

/// The OpenEval item schema shipped with this crate (template format).
pub const ITEM_SCHEMA_JSON: &str = include_str!("../schemas/item_schema.json");

/// Process-wide validator for the bundled item schema, parsed on first use.
pub fn item_validator() -> Result<&'static Validator> {
    static ITEM: OnceLock<std::result::Result<Validator, String>> = OnceLock::new();
    ITEM.get_or_init(|| Validator::from_json(ITEM_SCHEMA_JSON).map_err(|err| err.to_string()))
        .as_ref()
        .map_err(|err| SchemaError::EmbeddedSchema(err.clone()))
}

/// Validate a record against the bundled OpenEval item schema.
///
/// The only error is a corrupt bundled schema; record problems are always
/// returned as violations in the report.
pub fn validate_entry(record: &Value) -> Result<ValidationReport> {
    Ok(item_validator()?.validate_entry(record))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::definition::Presence;
    use crate::report::ViolationKind;

    #[test]
    fn bundled_schema_loads() {
        let validator = item_validator().expect("bundled schema should parse");
        let schema = validator.schema();
        assert_eq!(schema.get("item_id").map(|s| s.presence), Some(Presence::Generated));
        assert!(schema.get("responses").is_some_and(|s| s.non_empty));
        assert!(schema.get("question_content").is_some_and(|s| s.non_empty));
        assert!(schema.get("references").is_some_and(|s| !s.non_empty));
    }

    #[test]
    fn validator_is_shared() {
        let first = item_validator().unwrap() as *const Validator;
        let second = item_validator().unwrap() as *const Validator;
        assert_eq!(first, second);
    }

    #[test]
    fn empty_object_reports_every_required_top_level_field() {
        let report = validate_entry(&json!({})).unwrap();
        let missing: Vec<&str> = report
            .of_kind(ViolationKind::MissingRequiredField)
            .map(|v| v.field_path.as_str())
            .collect();
        assert_eq!(
            missing,
            vec![
                "benchmark",
                "item_metadata",
                "question_content",
                "references",
                "responses"
            ]
        );
        assert_eq!(report.violations().len(), 5);
    }

    #[test]
    fn missing_field_reports_schema_description() {
        let record = json!({
            "benchmark": {"name": "mmlu", "version": "1.0", "task_type": "multiple_choice"}
        });
        let report = validate_entry(&record).unwrap();
        let license = report
            .violations()
            .iter()
            .find(|v| v.field_path == "benchmark.license")
            .expect("missing license should be reported");

        assert_eq!(license.kind, ViolationKind::MissingRequiredField);
        assert_eq!(
            license.field_description.as_deref(),
            Some("License under which the benchmark data is distributed")
        );
    }
}
