//! Typed-format schema documents.
//!
//! ```json
//! {
//!   "format": "typed",
//!   "fields": {
//!     "id":    { "type": "string" },
//!     "type":  { "type": "enum", "allowed_values": ["mc", "open"] },
//!     "notes": { "type": "string", "required": false }
//!   }
//! }
//! ```
//!
//! Documents are checked against a bundled JSON Schema before conversion.

use std::sync::OnceLock;

use jsonschema::Validator as MetaValidator;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::definition::{FieldSpec, FieldType, Presence, Primitive, SchemaDefinition};
use crate::error::{Result, SchemaError};

/// JSON Schema describing the typed definition format.
pub const TYPED_META_SCHEMA: &str = include_str!("../schemas/typed-definition.schema.json");

/// Meta-schema errors quoted in a single [`SchemaError::MetaSchema`].
const MAX_REPORTED_META_ERRORS: usize = 4;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum RawType {
    Any,
    String,
    Number,
    Integer,
    Boolean,
    Union,
    Enum,
    Object,
    Array,
    ArrayOfObject,
}

#[derive(Debug, Deserialize)]
struct RawField {
    #[serde(rename = "type")]
    kind: RawType,
    #[serde(default = "default_required")]
    required: bool,
    #[serde(default)]
    generated: bool,
    #[serde(default)]
    types: Vec<Primitive>,
    #[serde(default)]
    allowed_values: Vec<String>,
    fields: Option<Map<String, Value>>,
    #[serde(default)]
    items: Vec<Primitive>,
    #[serde(default)]
    non_empty: bool,
    description: Option<String>,
}

fn default_required() -> bool {
    true
}

fn meta_validator() -> Result<&'static MetaValidator> {
    static META: OnceLock<std::result::Result<MetaValidator, String>> = OnceLock::new();
    META.get_or_init(|| {
        let schema: Value =
            serde_json::from_str(TYPED_META_SCHEMA).map_err(|err| err.to_string())?;
        jsonschema::validator_for(&schema).map_err(|err| err.to_string())
    })
    .as_ref()
    .map_err(|err| SchemaError::MetaSchema(format!("meta-schema failed to compile: {err}")))
}

pub(crate) fn from_value(value: &Value) -> Result<SchemaDefinition> {
    check_meta(value)?;

    let fields = value
        .get("fields")
        .and_then(Value::as_object)
        .ok_or_else(|| SchemaError::definition("$", "typed schema requires a `fields` object"))?;
    parse_fields(fields, "")
}

fn check_meta(value: &Value) -> Result<()> {
    let validator = meta_validator()?;

    let mut errors = validator.iter_errors(value);
    if let Some(first) = errors.next() {
        let mut message = first.to_string();
        for err in errors.take(MAX_REPORTED_META_ERRORS - 1) {
            message.push_str("; ");
            message.push_str(&err.to_string());
        }
        return Err(SchemaError::MetaSchema(message));
    }

    Ok(())
}

fn parse_fields(fields: &Map<String, Value>, prefix: &str) -> Result<SchemaDefinition> {
    let mut schema = SchemaDefinition::new();
    for (name, raw) in fields {
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        let raw: RawField = serde_json::from_value(raw.clone())
            .map_err(|err| SchemaError::definition(&path, err.to_string()))?;
        schema.insert(name.clone(), convert(raw, &path)?);
    }
    Ok(schema)
}

fn convert(raw: RawField, path: &str) -> Result<FieldSpec> {
    let presence = match (raw.generated, raw.required) {
        (true, true) => {
            return Err(SchemaError::definition(
                path,
                "a generated field cannot also be required; set `required: false`",
            ))
        }
        (true, false) => Presence::Generated,
        (false, true) => Presence::Required,
        (false, false) => Presence::Optional,
    };

    let field_type = match raw.kind {
        RawType::Any => FieldType::Any,
        RawType::String => FieldType::String,
        RawType::Number => FieldType::Number,
        RawType::Integer => FieldType::Integer,
        RawType::Boolean => FieldType::Boolean,
        RawType::Union => FieldType::Union(raw.types),
        RawType::Enum => FieldType::Enum(raw.allowed_values),
        RawType::Object => FieldType::Object(nested(raw.fields.as_ref(), path)?),
        RawType::Array => FieldType::Array(raw.items),
        RawType::ArrayOfObject => {
            FieldType::ObjectArray(nested(raw.fields.as_ref(), &format!("{path}[]"))?)
        }
    };

    let mut spec = FieldSpec::new(presence, field_type);
    spec.non_empty = raw.non_empty;
    spec.description = raw.description;
    Ok(spec)
}

fn nested(fields: Option<&Map<String, Value>>, path: &str) -> Result<Option<SchemaDefinition>> {
    fields.map(|fields| parse_fields(fields, path)).transpose()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn meta_schema_compiles() {
        assert!(meta_validator().is_ok());
    }

    #[test]
    fn parses_every_field_kind() {
        let schema = from_value(&json!({
            "format": "typed",
            "fields": {
                "id": {"type": "string", "description": "unique id"},
                "score": {"type": "number"},
                "count": {"type": "integer", "required": false},
                "correct": {"type": "boolean"},
                "raw": {"type": "any"},
                "answer": {"type": "union", "types": ["string", "object"]},
                "kind": {"type": "enum", "allowed_values": ["mc", "open"]},
                "meta": {"type": "object", "fields": {"source": {"type": "string"}}},
                "blob": {"type": "object"},
                "tags": {"type": "array", "items": ["string"]},
                "responses": {
                    "type": "array_of_object",
                    "non_empty": true,
                    "fields": {"text": {"type": "string"}}
                },
                "item_id": {"type": "string", "required": false, "generated": true}
            }
        }))
        .unwrap();

        assert_eq!(schema.len(), 12);
        let names: Vec<&str> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names[0], "id");
        assert_eq!(names[11], "item_id");

        let get = |name: &str| schema.get(name).cloned().unwrap();
        assert_eq!(get("id").description.as_deref(), Some("unique id"));
        assert_eq!(get("count").presence, Presence::Optional);
        assert_eq!(
            get("answer").field_type,
            FieldType::Union(vec![Primitive::String, Primitive::Object])
        );
        assert_eq!(
            get("kind").field_type.allowed_values(),
            Some(&["mc".to_string(), "open".to_string()][..])
        );
        assert!(get("meta").field_type.nested_schema().is_some());
        assert_eq!(get("blob").field_type, FieldType::Object(None));
        assert_eq!(get("tags").field_type, FieldType::Array(vec![Primitive::String]));
        assert!(get("responses").non_empty);
        assert_eq!(get("item_id").presence, Presence::Generated);
    }

    #[test]
    fn meta_schema_rejects_malformed_declarations() {
        let cases = [
            json!({"format": "typed", "fields": {}}),
            json!({"format": "typed", "fields": {"a": {"type": "uuid"}}}),
            json!({"format": "typed", "fields": {"a": {"type": "enum"}}}),
            json!({"format": "typed", "fields": {"a": {"type": "enum", "allowed_values": []}}}),
            json!({
                "format": "typed",
                "fields": {"a": {"type": "string", "allowed_values": ["x"]}}
            }),
            json!({"format": "typed", "fields": {"a": {"type": "string", "fields": {}}}}),
            json!({"format": "typed", "fields": {"a": {"type": "string", "non_empty": true}}}),
            json!({"format": "typed", "fields": {"a": {"type": "string", "colour": "red"}}}),
            json!({"format": "typed", "fields": {"a": {"type": "object", "fields": {"b": {}}}}}),
            json!({"fields": {"a": {"type": "string"}}}),
        ];
        for case in cases {
            assert!(
                matches!(from_value(&case), Err(SchemaError::MetaSchema(_))),
                "{case}"
            );
        }
    }

    #[test]
    fn generated_and_required_conflict() {
        let err = from_value(&json!({
            "format": "typed",
            "fields": {
                "meta": {
                    "type": "object",
                    "fields": {"x": {"type": "string", "generated": true}}
                }
            }
        }))
        .unwrap_err();
        assert!(
            matches!(err, SchemaError::InvalidDefinition { ref path, .. } if path == "meta.x")
        );
    }
}
