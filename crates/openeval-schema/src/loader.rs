use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::config::{LoaderConfig, SchemaFormat};
use crate::definition::{FieldType, SchemaDefinition};
use crate::error::{Result, SchemaError};
use crate::{template, typed};

/// Read and parse a schema definition file.
///
/// Symlinks are refused and the file must fit within
/// [`LoaderConfig::max_schema_file_size`].
pub fn load_schema_file(path: &Path, config: &LoaderConfig) -> Result<SchemaDefinition> {
    let path_metadata = std::fs::symlink_metadata(path)
        .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;
    let file_type = path_metadata.file_type();

    if file_type.is_symlink() {
        return Err(SchemaError::LoadFailed(format!(
            "refusing to load schema symlink: {}",
            path.display()
        )));
    }
    if !file_type.is_file() {
        return Err(SchemaError::LoadFailed(format!(
            "not a regular file: {}",
            path.display()
        )));
    }

    let file = std::fs::File::open(path).map_err(|err| {
        SchemaError::LoadFailed(format!("failed opening schema {}: {err}", path.display()))
    })?;
    let opened_metadata = file
        .metadata()
        .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;

    #[cfg(unix)]
    {
        if !same_file_identity(&path_metadata, &opened_metadata) {
            return Err(SchemaError::LoadFailed(format!(
                "schema file changed during load: {}",
                path.display()
            )));
        }
    }

    let max_bytes = config.max_schema_file_size;
    if opened_metadata.len() > max_bytes as u64 {
        return Err(SchemaError::TooLarge {
            size: opened_metadata.len(),
            max: max_bytes,
        });
    }

    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| {
            SchemaError::LoadFailed(format!("failed reading schema {}: {err}", path.display()))
        })?;
    if content.len() > max_bytes {
        return Err(SchemaError::TooLarge {
            size: content.len() as u64,
            max: max_bytes,
        });
    }

    tracing::debug!(path = %path.display(), bytes = content.len(), "read schema file");
    parse_schema_str(&content, config)
}

/// Parse a schema definition from JSON text.
pub fn parse_schema_str(schema_json: &str, config: &LoaderConfig) -> Result<SchemaDefinition> {
    let value: Value = serde_json::from_str(schema_json)?;
    parse_schema_value(&value, config)
}

/// Parse a schema definition from an already-decoded JSON document.
pub fn parse_schema_value(value: &Value, config: &LoaderConfig) -> Result<SchemaDefinition> {
    let format = resolve_format(value, config.format);
    let schema = match format {
        SchemaFormat::Typed => typed::from_value(value)?,
        SchemaFormat::Template | SchemaFormat::Auto => template::from_value(value, config)?,
    };

    if schema.is_empty() {
        return Err(SchemaError::definition("$", "schema declares no fields"));
    }
    check_depth(&schema, "", 1, config.max_nesting_depth)?;

    tracing::debug!(
        ?format,
        fields = schema.len(),
        depth = schema.depth(),
        "parsed schema definition"
    );
    Ok(schema)
}

/// Resolve [`SchemaFormat::Auto`] from the document itself.
pub fn resolve_format(value: &Value, requested: SchemaFormat) -> SchemaFormat {
    match requested {
        SchemaFormat::Auto => match value.get("format").and_then(Value::as_str) {
            Some("typed") => SchemaFormat::Typed,
            _ => SchemaFormat::Template,
        },
        other => other,
    }
}

fn check_depth(schema: &SchemaDefinition, prefix: &str, depth: usize, max: usize) -> Result<()> {
    for (name, spec) in schema.iter() {
        let (nested, path) = match &spec.field_type {
            FieldType::Object(Some(nested)) => (nested, format!("{prefix}{name}")),
            FieldType::ObjectArray(Some(nested)) => (nested, format!("{prefix}{name}[]")),
            _ => continue,
        };
        if depth + 1 > max {
            return Err(SchemaError::TooDeep { path, max });
        }
        check_depth(nested, &format!("{path}."), depth + 1, max)?;
    }
    Ok(())
}

#[cfg(unix)]
fn same_file_identity(
    path_metadata: &std::fs::Metadata,
    opened_metadata: &std::fs::Metadata,
) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}
