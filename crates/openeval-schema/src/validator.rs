use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::config::LoaderConfig;
use crate::definition::{
    json_type_name, FieldSpec, FieldType, Presence, Primitive, SchemaDefinition,
};
use crate::error::Result;
use crate::loader;
use crate::report::{ValidationReport, Violation, ViolationKind};

/// Path reported when the record itself is malformed.
pub const ROOT_PATH: &str = "$";

/// Checks candidate records against an immutable [`SchemaDefinition`].
///
/// Cloning is cheap and clones share the schema, so one validator can serve
/// any number of threads.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Arc<SchemaDefinition>,
}

impl Validator {
    pub fn new(schema: SchemaDefinition) -> Self {
        Self {
            schema: Arc::new(schema),
        }
    }

    /// Build a validator from a schema document with default config.
    pub fn from_json(schema_json: &str) -> Result<Self> {
        Self::from_json_with_config(schema_json, &LoaderConfig::default())
    }

    pub fn from_json_with_config(schema_json: &str, config: &LoaderConfig) -> Result<Self> {
        loader::parse_schema_str(schema_json, config).map(Self::new)
    }

    /// Load a schema file with default config.
    pub fn from_path(path: &Path) -> Result<Self> {
        Self::from_path_with_config(path, &LoaderConfig::default())
    }

    pub fn from_path_with_config(path: &Path, config: &LoaderConfig) -> Result<Self> {
        loader::load_schema_file(path, config).map(Self::new)
    }

    pub fn schema(&self) -> &SchemaDefinition {
        &self.schema
    }

    /// Validate one record, reporting every violation found.
    ///
    /// Never fails: a record that is not a JSON object yields a single
    /// `InvalidNestedStructure` violation at `$`.
    pub fn validate_entry(&self, record: &Value) -> ValidationReport {
        let mut violations = Vec::new();
        match record {
            Value::Object(map) => check_object(&self.schema, map, "", &mut violations),
            other => violations.push(Violation::new(
                ROOT_PATH,
                ViolationKind::InvalidNestedStructure,
                format!("record must be a JSON object, found {}", json_type_name(other)),
            )),
        }

        tracing::debug!(
            violations = violations.len(),
            passed = violations.is_empty(),
            "validated record"
        );
        ValidationReport::new(violations)
    }
}

fn child_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn check_object(
    schema: &SchemaDefinition,
    record: &Map<String, Value>,
    prefix: &str,
    out: &mut Vec<Violation>,
) {
    for (name, spec) in schema.iter() {
        let path = child_path(prefix, name);
        match (spec.presence, record.get(name)) {
            (Presence::Generated, _) => {}
            (Presence::Required, None) => out.push(
                Violation::new(
                    path,
                    ViolationKind::MissingRequiredField,
                    format!("required field of type {} is missing", spec.field_type.name()),
                )
                .with_description(spec.description.as_deref()),
            ),
            (Presence::Optional, None | Some(Value::Null)) => {}
            (_, Some(value)) => check_value(spec, value, &path, out),
        }
    }
}

fn check_value(spec: &FieldSpec, value: &Value, path: &str, out: &mut Vec<Violation>) {
    let field_type = &spec.field_type;
    let description = spec.description.as_deref();
    let violation = |path: String, kind: ViolationKind, detail: String| {
        Violation::new(path, kind, detail).with_description(description)
    };

    if !field_type.accepts(value) {
        out.push(violation(
            path.to_string(),
            ViolationKind::UnexpectedFieldType,
            format!("expected {}, found {}", field_type.name(), json_type_name(value)),
        ));
        return;
    }

    if spec.non_empty {
        if let Value::Array(items) = value {
            if items.is_empty() {
                out.push(violation(
                    path.to_string(),
                    ViolationKind::EmptyCollection,
                    "array must contain at least one element".to_string(),
                ));
            }
        }
    }

    match (field_type, value) {
        (FieldType::Enum(allowed), Value::String(s)) => {
            if !allowed.iter().any(|candidate| candidate == s) {
                out.push(violation(
                    path.to_string(),
                    ViolationKind::InvalidEnumValue,
                    format!("{s:?} is not one of: {}", allowed.join(", ")),
                ));
            }
        }
        (FieldType::Object(Some(nested)), Value::Object(map)) => {
            check_nested(nested, map, path, description, out);
        }
        (FieldType::Array(kinds), Value::Array(items)) if !kinds.is_empty() => {
            for (index, item) in items.iter().enumerate() {
                if !kinds.iter().any(|kind| kind.matches(item)) {
                    out.push(violation(
                        format!("{path}[{index}]"),
                        ViolationKind::UnexpectedFieldType,
                        element_mismatch(kinds, item),
                    ));
                }
            }
        }
        (FieldType::ObjectArray(nested), Value::Array(items)) => {
            for (index, item) in items.iter().enumerate() {
                let item_path = format!("{path}[{index}]");
                match (item, nested) {
                    (Value::Object(map), Some(nested)) => {
                        check_nested(nested, map, &item_path, description, out)
                    }
                    (Value::Object(_), None) => {}
                    (other, _) => out.push(violation(
                        item_path,
                        ViolationKind::InvalidNestedStructure,
                        format!("expected object, found {}", json_type_name(other)),
                    )),
                }
            }
        }
        _ => {}
    }
}

/// Validate a nested object; any nested violation is preceded by one
/// `InvalidNestedStructure` entry for the enclosing path.
fn check_nested(
    schema: &SchemaDefinition,
    map: &Map<String, Value>,
    path: &str,
    description: Option<&str>,
    out: &mut Vec<Violation>,
) {
    let mut nested = Vec::new();
    check_object(schema, map, path, &mut nested);
    if nested.is_empty() {
        return;
    }

    out.push(
        Violation::new(
            path,
            ViolationKind::InvalidNestedStructure,
            format!("nested object has {} violation(s)", nested.len()),
        )
        .with_description(description),
    );
    out.append(&mut nested);
}

fn element_mismatch(kinds: &[Primitive], item: &Value) -> String {
    format!(
        "expected {}, found {}",
        FieldType::Union(kinds.to_vec()).name(),
        json_type_name(item)
    )
}
