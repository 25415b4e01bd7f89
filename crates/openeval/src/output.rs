use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Base URI of the JSON documents the CLI emits.
pub const SCHEMA_ID_BASE: &str = "https://schemas.openeval.dev/openeval/cli/v1";

pub fn schema_id(document: &str) -> String {
    format!("{SCHEMA_ID_BASE}/{document}.schema.json")
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<comfy_table::Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_ids_are_versioned_uris() {
        assert_eq!(
            schema_id("doctor-report"),
            "https://schemas.openeval.dev/openeval/cli/v1/doctor-report.schema.json"
        );
    }
}
