use serde::Serialize;

use openeval_schema::{FieldSpec, Presence, SchemaDefinition};

use crate::cmd::{SchemaArgs, SchemaSource};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, schema_id, table, OutputFormat};

#[derive(Serialize)]
struct FieldRow<'a> {
    path: String,
    #[serde(rename = "type")]
    type_name: String,
    presence: Presence,
    non_empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    allowed_values: Option<&'a [String]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

#[derive(Serialize)]
struct SchemaOutput<'a> {
    schema_id: String,
    source: String,
    depth: usize,
    fields: Vec<FieldRow<'a>>,
}

pub fn run(_args: SchemaArgs, source: &SchemaSource, format: OutputFormat) -> CliResult<i32> {
    let validator = source.load()?;
    let output = SchemaOutput {
        schema_id: schema_id("schema-fields"),
        source: source.label(),
        depth: validator.schema().depth(),
        fields: field_rows(validator.schema()),
    };

    print_schema(&output, format);
    Ok(SUCCESS)
}

fn field_rows(schema: &SchemaDefinition) -> Vec<FieldRow<'_>> {
    schema
        .flatten()
        .into_iter()
        .map(|(path, spec): (String, &FieldSpec)| FieldRow {
            path,
            type_name: spec.field_type.name(),
            presence: spec.presence,
            non_empty: spec.non_empty,
            allowed_values: spec.field_type.allowed_values(),
            description: spec.description.as_deref(),
        })
        .collect()
}

fn print_schema(output: &SchemaOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table => {
            let mut out = table(["FIELD", "TYPE", "PRESENCE", "ALLOWED", "DESCRIPTION"]);
            for row in &output.fields {
                out.add_row(vec![
                    row.path.clone(),
                    type_label(row),
                    row.presence.as_str().to_string(),
                    row.allowed_values.map(|v| v.join(", ")).unwrap_or_default(),
                    row.description.unwrap_or("").to_string(),
                ]);
            }
            println!("{out}");
        }
        OutputFormat::Pretty => {
            println!("schema {}\n", output.source);
            for row in &output.fields {
                println!(
                    "  {:<44} {:<24} {}",
                    row.path,
                    type_label(row),
                    row.presence.as_str()
                );
            }
        }
        OutputFormat::Raw => {
            for row in &output.fields {
                println!("{}", row.path);
            }
        }
    }
}

fn type_label(row: &FieldRow<'_>) -> String {
    if row.non_empty {
        format!("{} (non-empty)", row.type_name)
    } else {
        row.type_name.clone()
    }
}

#[cfg(test)]
mod tests {
    use openeval_schema::item_validator;

    use super::*;

    #[test]
    fn bundled_schema_rows_include_nested_paths() {
        let validator = item_validator().expect("bundled schema should load");
        let rows = field_rows(validator.schema());

        let task_type = rows
            .iter()
            .find(|row| row.path == "benchmark.task_type")
            .expect("task_type row");
        assert_eq!(task_type.type_name, "enum");
        assert!(task_type.allowed_values.is_some_and(|v| v.len() == 5));

        let responses = rows
            .iter()
            .find(|row| row.path == "responses")
            .expect("responses row");
        assert!(responses.non_empty);
        assert_eq!(type_label(responses), "array<object> (non-empty)");

        assert!(rows.iter().any(|row| row.path == "responses[].scores[].value"));
    }

    #[test]
    fn rows_serialize_type_key() {
        let validator = item_validator().expect("bundled schema should load");
        let rows = field_rows(validator.schema());
        let json = serde_json::to_string(&rows[0]).expect("row should serialize");
        assert!(json.contains("\"type\":\"any\""));
        assert!(json.contains("\"presence\":\"generated\""));
    }
}
