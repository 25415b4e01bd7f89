use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A JSON value category that a field or array element may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Primitive {
    String,
    /// Integral numbers only.
    Integer,
    /// Any JSON number, integral or not.
    Number,
    Boolean,
    Object,
}

impl Primitive {
    /// Whether `value` belongs to this category.
    pub fn matches(self, value: &Value) -> bool {
        match self {
            Primitive::String => value.is_string(),
            Primitive::Integer => value.is_i64() || value.is_u64(),
            Primitive::Number => value.is_number(),
            Primitive::Boolean => value.is_boolean(),
            Primitive::Object => value.is_object(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Integer => "integer",
            Primitive::Number => "number",
            Primitive::Boolean => "boolean",
            Primitive::Object => "object",
        }
    }
}

/// Runtime type name of a JSON value, as used in violation details.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Expected type of a declared field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    /// Presence is checked, the value is not.
    Any,
    String,
    Number,
    Integer,
    Boolean,
    /// Value must match at least one of the listed categories.
    Union(Vec<Primitive>),
    /// String drawn from a closed set of allowed values.
    Enum(Vec<String>),
    /// JSON object, checked against the nested schema when one is declared.
    Object(Option<SchemaDefinition>),
    /// JSON array whose elements match one of the listed categories.
    /// An empty list leaves elements unconstrained.
    Array(Vec<Primitive>),
    /// JSON array of objects, each checked against the nested schema when declared.
    ObjectArray(Option<SchemaDefinition>),
}

impl FieldType {
    /// Human-readable type name, e.g. `array<string>` or `integer | number`.
    pub fn name(&self) -> String {
        match self {
            FieldType::Any => "any".to_string(),
            FieldType::String => "string".to_string(),
            FieldType::Number => "number".to_string(),
            FieldType::Integer => "integer".to_string(),
            FieldType::Boolean => "boolean".to_string(),
            FieldType::Union(kinds) => join_primitives(kinds),
            FieldType::Enum(_) => "enum".to_string(),
            FieldType::Object(_) => "object".to_string(),
            FieldType::Array(kinds) if kinds.is_empty() => "array".to_string(),
            FieldType::Array(kinds) => format!("array<{}>", join_primitives(kinds)),
            FieldType::ObjectArray(_) => "array<object>".to_string(),
        }
    }

    /// Whether the value has the right JSON shape, ignoring nested content
    /// and enum membership.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::Any => true,
            FieldType::String | FieldType::Enum(_) => value.is_string(),
            FieldType::Number => Primitive::Number.matches(value),
            FieldType::Integer => Primitive::Integer.matches(value),
            FieldType::Boolean => value.is_boolean(),
            FieldType::Union(kinds) => kinds.iter().any(|kind| kind.matches(value)),
            FieldType::Object(_) => value.is_object(),
            FieldType::Array(_) | FieldType::ObjectArray(_) => value.is_array(),
        }
    }

    pub fn nested_schema(&self) -> Option<&SchemaDefinition> {
        match self {
            FieldType::Object(schema) | FieldType::ObjectArray(schema) => schema.as_ref(),
            _ => None,
        }
    }

    pub fn allowed_values(&self) -> Option<&[String]> {
        match self {
            FieldType::Enum(values) => Some(values),
            _ => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, FieldType::Array(_) | FieldType::ObjectArray(_))
    }
}

fn join_primitives(kinds: &[Primitive]) -> String {
    kinds
        .iter()
        .map(|kind| kind.name())
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Whether a contributor must supply a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Required,
    Optional,
    /// Filled in by the curation system; never required and never checked.
    Generated,
}

impl Presence {
    pub fn as_str(self) -> &'static str {
        match self {
            Presence::Required => "required",
            Presence::Optional => "optional",
            Presence::Generated => "generated",
        }
    }
}

/// Declaration of a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub presence: Presence,
    pub field_type: FieldType,
    /// Array fields only: an empty array is a violation.
    pub non_empty: bool,
    pub description: Option<String>,
}

impl FieldSpec {
    pub fn new(presence: Presence, field_type: FieldType) -> Self {
        Self {
            presence,
            field_type,
            non_empty: false,
            description: None,
        }
    }

    pub fn required(field_type: FieldType) -> Self {
        Self::new(Presence::Required, field_type)
    }

    pub fn optional(field_type: FieldType) -> Self {
        Self::new(Presence::Optional, field_type)
    }

    pub fn generated() -> Self {
        Self::new(Presence::Generated, FieldType::Any)
    }

    pub fn non_empty(mut self) -> Self {
        self.non_empty = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.presence == Presence::Required
    }
}

/// Ordered mapping from field name to [`FieldSpec`].
///
/// Declaration order is preserved and governs the order in which
/// violations are reported.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaDefinition {
    fields: Vec<(String, FieldSpec)>,
}

impl SchemaDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, replacing any earlier declaration with the same name
    /// in place.
    pub fn with_field(mut self, name: impl Into<String>, spec: FieldSpec) -> Self {
        self.insert(name, spec);
        self
    }

    /// Insert a field, returning the declaration it replaced.
    pub fn insert(&mut self, name: impl Into<String>, spec: FieldSpec) -> Option<FieldSpec> {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, spec)),
            None => {
                self.fields.push((name, spec));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, spec)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSpec)> {
        self.fields.iter().map(|(name, spec)| (name.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Deepest chain of nested schemas; a flat schema has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .fields
            .iter()
            .filter_map(|(_, spec)| spec.field_type.nested_schema())
            .map(SchemaDefinition::depth)
            .max()
            .unwrap_or(0)
    }

    /// Every declared field, nested ones included, with its display path.
    /// Array-of-object children are shown as `parent[].child`.
    pub fn flatten(&self) -> Vec<(String, &FieldSpec)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);
        out
    }

    fn flatten_into<'a>(&'a self, prefix: &str, out: &mut Vec<(String, &'a FieldSpec)>) {
        for (name, spec) in &self.fields {
            let path = if prefix.is_empty() {
                name.clone()
            } else {
                format!("{prefix}.{name}")
            };
            out.push((path.clone(), spec));
            match &spec.field_type {
                FieldType::Object(Some(nested)) => nested.flatten_into(&path, out),
                FieldType::ObjectArray(Some(nested)) => {
                    nested.flatten_into(&format!("{path}[]"), out)
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn primitive_matching() {
        assert!(Primitive::Integer.matches(&json!(3)));
        assert!(!Primitive::Integer.matches(&json!(3.5)));
        assert!(Primitive::Number.matches(&json!(3)));
        assert!(Primitive::Number.matches(&json!(3.5)));
        assert!(!Primitive::Number.matches(&json!(true)));
        assert!(!Primitive::Boolean.matches(&json!(0)));
        assert!(Primitive::Object.matches(&json!({})));
    }

    #[test]
    fn json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!(1)), "integer");
        assert_eq!(json_type_name(&json!(1.5)), "number");
        assert_eq!(json_type_name(&json!([])), "array");
    }

    #[test]
    fn field_type_names() {
        assert_eq!(
            FieldType::Union(vec![Primitive::Integer, Primitive::Number]).name(),
            "integer | number"
        );
        assert_eq!(FieldType::Array(vec![Primitive::String]).name(), "array<string>");
        assert_eq!(FieldType::Array(Vec::new()).name(), "array");
        assert_eq!(FieldType::ObjectArray(None).name(), "array<object>");
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut schema = SchemaDefinition::new()
            .with_field("a", FieldSpec::required(FieldType::String))
            .with_field("b", FieldSpec::required(FieldType::Number));
        let old = schema.insert("a", FieldSpec::optional(FieldType::Boolean));

        assert_eq!(old, Some(FieldSpec::required(FieldType::String)));
        let names: Vec<&str> = schema.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(schema.get("a").map(|s| s.presence), Some(Presence::Optional));
    }

    #[test]
    fn depth_and_flatten_follow_nesting() {
        let inner =
            SchemaDefinition::new().with_field("text", FieldSpec::required(FieldType::String));
        let schema = SchemaDefinition::new()
            .with_field("id", FieldSpec::required(FieldType::String))
            .with_field(
                "responses",
                FieldSpec::required(FieldType::ObjectArray(Some(inner.clone()))),
            )
            .with_field("meta", FieldSpec::required(FieldType::Object(Some(inner))));

        assert_eq!(schema.depth(), 2);
        let paths: Vec<String> = schema.flatten().into_iter().map(|(p, _)| p).collect();
        assert_eq!(
            paths,
            vec!["id", "responses", "responses[].text", "meta", "meta.text"]
        );
    }
}
