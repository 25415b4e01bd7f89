//! Template-format schema documents.
//!
//! A template mirrors the shape of an item. Each string leaf describes one
//! field with a leading tag, e.g. `"[int or float] latency in seconds"` or
//! `"[str, optional] free-form notes"`. Objects nest, and arrays carry a
//! single template element describing their contents.

use serde_json::{Map, Value};

use crate::config::LoaderConfig;
use crate::definition::{FieldSpec, FieldType, Presence, Primitive, SchemaDefinition};
use crate::error::{Result, SchemaError};

pub(crate) fn from_value(value: &Value, config: &LoaderConfig) -> Result<SchemaDefinition> {
    match value {
        Value::Object(map) => parse_object(map, "", config),
        _ => Err(SchemaError::definition("$", "template schema must be a JSON object")),
    }
}

fn parse_object(
    map: &Map<String, Value>,
    prefix: &str,
    config: &LoaderConfig,
) -> Result<SchemaDefinition> {
    let mut schema = SchemaDefinition::new();
    for (key, leaf) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let mut spec = parse_leaf(leaf, &path, config)?;
        if spec.field_type.is_array() && config.requires_non_empty(key) {
            spec.non_empty = true;
        }
        schema.insert(key.clone(), spec);
    }
    Ok(schema)
}

fn parse_leaf(leaf: &Value, path: &str, config: &LoaderConfig) -> Result<FieldSpec> {
    match leaf {
        Value::String(text) => {
            let tag = Tag::parse(text, path)?;
            let field_type = match tag.type_expr {
                Some(expr) => parse_type(expr, path)?,
                None if tag.presence == Presence::Required && tag.bracketed => {
                    return Err(SchemaError::definition(path, "tag declares no type"));
                }
                None if tag.bracketed => FieldType::Any,
                None => FieldType::String,
            };
            Ok(tag.into_spec(field_type))
        }
        Value::Object(map) => {
            let nested = parse_object(map, path, config)?;
            Ok(FieldSpec::required(FieldType::Object(Some(nested))))
        }
        Value::Array(items) => match items.first() {
            Some(Value::String(text)) => {
                let tag = Tag::parse(text, path)?;
                let elements = match tag.type_expr {
                    Some(expr) => parse_primitives(expr, path)?,
                    None if tag.bracketed => Vec::new(),
                    None => vec![Primitive::String],
                };
                Ok(tag.into_spec(FieldType::Array(elements)))
            }
            Some(Value::Object(template)) => {
                let nested = parse_object(template, &format!("{path}[]"), config)?;
                Ok(FieldSpec::required(FieldType::ObjectArray(Some(nested))))
            }
            _ => Ok(FieldSpec::generated()),
        },
        _ => Ok(FieldSpec::generated()),
    }
}

/// A parsed `[type, modifier, ...] description` leaf.
#[derive(Debug, PartialEq)]
struct Tag<'a> {
    bracketed: bool,
    type_expr: Option<&'a str>,
    presence: Presence,
    description: Option<&'a str>,
}

impl<'a> Tag<'a> {
    fn parse(text: &'a str, path: &str) -> Result<Self> {
        let trimmed = text.trim_start();
        let Some(rest) = trimmed.strip_prefix('[') else {
            return Ok(Self {
                bracketed: false,
                type_expr: None,
                presence: Presence::Required,
                description: non_blank(text),
            });
        };

        let close = find_tag_end(rest).ok_or_else(|| {
            SchemaError::definition(path, format!("unterminated tag in {text:?}"))
        })?;
        let (inner, description) = (&rest[..close], &rest[close + 1..]);

        let mut type_expr = None;
        let mut presence = Presence::Required;
        for token in inner.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            if token.eq_ignore_ascii_case("auto") {
                presence = Presence::Generated;
            } else if token.eq_ignore_ascii_case("optional") {
                if presence != Presence::Generated {
                    presence = Presence::Optional;
                }
            } else if type_expr.is_none() {
                type_expr = Some(token);
            } else {
                return Err(SchemaError::definition(
                    path,
                    format!("unknown tag modifier `{token}`"),
                ));
            }
        }

        Ok(Self {
            bracketed: true,
            type_expr,
            presence,
            description: non_blank(description),
        })
    }

    fn into_spec(self, field_type: FieldType) -> FieldSpec {
        let spec = match self.presence {
            Presence::Generated => FieldSpec::generated(),
            presence => FieldSpec::new(presence, field_type),
        };
        match self.description {
            Some(description) => spec.with_description(description),
            None => spec,
        }
    }
}

/// Index of the `]` closing the tag, skipping brackets of `list[...]`.
fn find_tag_end(rest: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, ch) in rest.char_indices() {
        match ch {
            '[' => depth += 1,
            ']' if depth == 0 => return Some(index),
            ']' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn non_blank(text: &str) -> Option<&str> {
    let text = text.trim();
    (!text.is_empty()).then_some(text)
}

fn parse_type(expr: &str, path: &str) -> Result<FieldType> {
    let lower = expr.to_ascii_lowercase();

    if let Some(inner) = lower.strip_prefix("list[").and_then(|s| s.strip_suffix(']')) {
        return parse_primitives(inner, path).map(FieldType::Array);
    }
    if lower == "list" {
        return Ok(FieldType::Array(Vec::new()));
    }
    if lower == "any" {
        return Ok(FieldType::Any);
    }
    if lower.starts_with("enum(") {
        return parse_enum(expr, path);
    }

    let kinds = parse_primitives(expr, path)?;
    if kinds.len() != 1 {
        return Ok(if kinds.is_empty() {
            FieldType::Any
        } else {
            FieldType::Union(kinds)
        });
    }
    Ok(match kinds[0] {
        Primitive::String => FieldType::String,
        Primitive::Integer => FieldType::Integer,
        Primitive::Number => FieldType::Number,
        Primitive::Boolean => FieldType::Boolean,
        Primitive::Object => FieldType::Object(None),
    })
}

/// Parse `a|b|c` inside `enum(...)`, keeping the values' original case.
fn parse_enum(expr: &str, path: &str) -> Result<FieldType> {
    let inner = expr
        .get(5..)
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(|| SchemaError::definition(path, format!("malformed enum `{expr}`")))?;

    let mut values: Vec<String> = Vec::new();
    for value in inner.split('|').map(str::trim) {
        if value.is_empty() {
            return Err(SchemaError::definition(path, "enum values must not be empty"));
        }
        if values.iter().any(|existing| existing == value) {
            return Err(SchemaError::definition(
                path,
                format!("duplicate enum value `{value}`"),
            ));
        }
        values.push(value.to_string());
    }
    Ok(FieldType::Enum(values))
}

/// Parse an `x or y` union. `any` yields an empty, unconstrained list.
fn parse_primitives(expr: &str, path: &str) -> Result<Vec<Primitive>> {
    let mut kinds = Vec::new();
    for token in expr.split(" or ").map(str::trim) {
        let kind = match token.to_ascii_lowercase().as_str() {
            "any" => return Ok(Vec::new()),
            "str" | "string" => Primitive::String,
            "int" | "integer" => Primitive::Integer,
            "float" | "number" => Primitive::Number,
            "bool" | "boolean" => Primitive::Boolean,
            "dict" | "object" => Primitive::Object,
            _ => {
                return Err(SchemaError::definition(
                    path,
                    format!("unknown type `{token}`"),
                ))
            }
        };
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }

    // Number already admits integers.
    if kinds.contains(&Primitive::Number) {
        kinds.retain(|kind| *kind != Primitive::Integer);
    }
    Ok(kinds)
}
