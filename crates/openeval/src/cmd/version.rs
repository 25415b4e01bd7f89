use std::collections::BTreeMap;

use serde::Serialize;

use crate::cmd::{SchemaSource, VersionArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_json, schema_id, OutputFormat};

/// Variables that change which schema is used or how much gets logged.
const ENVIRONMENT: [&str; 2] = ["OPENEVAL_SCHEMA", "RUST_LOG"];

#[derive(Debug, Serialize)]
struct SchemaFacts {
    source: String,
    format: String,
    top_level_fields: usize,
    total_fields: usize,
    required_fields: usize,
    depth: usize,
}

#[derive(Debug, Serialize)]
struct VersionOutput {
    schema_id: String,
    name: &'static str,
    version: &'static str,
    schema: SchemaFacts,
    environment: BTreeMap<&'static str, Option<String>>,
}

pub fn run(args: VersionArgs, source: &SchemaSource, format: OutputFormat) -> CliResult<i32> {
    if !args.extended {
        println!("openeval {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    let validator = source.load()?;
    let schema = validator.schema();
    let fields = schema.flatten();
    let output = VersionOutput {
        schema_id: schema_id("version"),
        name: "openeval",
        version: env!("CARGO_PKG_VERSION"),
        schema: SchemaFacts {
            source: source.label(),
            format: source.format.as_str().to_string(),
            top_level_fields: schema.len(),
            total_fields: fields.len(),
            required_fields: fields.iter().filter(|(_, spec)| spec.is_required()).count(),
            depth: schema.depth(),
        },
        environment: ENVIRONMENT
            .into_iter()
            .map(|name| (name, std::env::var(name).ok()))
            .collect(),
    };

    print_version(&output, format);
    Ok(SUCCESS)
}

fn print_version(output: &VersionOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table | OutputFormat::Pretty | OutputFormat::Raw => {
            println!("name: {}", output.name);
            println!("version: {}", output.version);
            println!("schema: {}", output.schema.source);
            println!("schema_format: {}", output.schema.format);
            println!(
                "schema_fields: {} top-level, {} total, {} required",
                output.schema.top_level_fields,
                output.schema.total_fields,
                output.schema.required_fields
            );
            println!("schema_depth: {}", output.schema.depth);
            for (name, value) in &output.environment {
                println!("{name}: {}", value.as_deref().unwrap_or("(not set)"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extended_output_serializes_schema_facts() {
        let output = VersionOutput {
            schema_id: schema_id("version"),
            name: "openeval",
            version: "0.1.0",
            schema: SchemaFacts {
                source: "bundled:item_schema.json".to_string(),
                format: "auto".to_string(),
                top_level_fields: 8,
                total_fields: 30,
                required_fields: 20,
                depth: 3,
            },
            environment: BTreeMap::from([("RUST_LOG", None)]),
        };

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&output).expect("serialize"))
                .expect("round trip");
        assert_eq!(json["schema"]["depth"], 3);
        assert_eq!(json["environment"]["RUST_LOG"], serde_json::Value::Null);
        assert!(json["schema_id"]
            .as_str()
            .is_some_and(|id| id.ends_with("version.schema.json")));
    }
}
