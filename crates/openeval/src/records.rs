use std::io::Read;
use std::path::Path;

use serde_json::Value;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};

/// A candidate record together with where it came from.
#[derive(Debug)]
pub struct SourcedRecord {
    /// `file`, `file[index]` for array members, or `file:line` for JSON Lines.
    pub source: String,
    pub record: Value,
}

/// Read every record held in `path`.
pub fn read_file(path: &Path) -> CliResult<Vec<SourcedRecord>> {
    let text = std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    let lines = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("jsonl" | "ndjson")
    );
    parse_records(&path.display().to_string(), &text, lines)
}

pub fn read_stdin() -> CliResult<Vec<SourcedRecord>> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .map_err(|err| io_error("failed reading stdin", err))?;
    parse_records("<stdin>", &text, false)
}

/// Split input into records.
///
/// A JSON array is a batch of records and any other JSON document is a
/// single record. With `lines` set, each non-blank line is parsed as its own
/// record. Text that is not one JSON document is read as JSON Lines only when
/// its first non-blank line is a complete JSON value; otherwise the
/// whole-document error is returned so its line and column stay accurate.
pub fn parse_records(label: &str, text: &str, lines: bool) -> CliResult<Vec<SourcedRecord>> {
    if !lines {
        match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => {
                return Ok(items
                    .into_iter()
                    .enumerate()
                    .map(|(index, record)| SourcedRecord {
                        source: format!("{label}[{index}]"),
                        record,
                    })
                    .collect())
            }
            Ok(record) => {
                return Ok(vec![SourcedRecord {
                    source: label.to_string(),
                    record,
                }])
            }
            Err(err) if !first_line_is_record(text) => {
                return Err(CliError::new(
                    DATA_INVALID,
                    format!("{label}: not valid JSON: {err}"),
                ))
            }
            Err(err) => {
                tracing::debug!(source = label, error = %err, "reading input as JSON Lines");
            }
        }
    }

    let mut records = Vec::new();
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let source = format!("{label}:{}", number + 1);
        let record = serde_json::from_str(line).map_err(|err| {
            CliError::new(DATA_INVALID, format!("{source}: not valid JSON: {err}"))
        })?;
        records.push(SourcedRecord { source, record });
    }
    Ok(records)
}

fn first_line_is_record(text: &str) -> bool {
    text.lines()
        .find(|line| !line.trim().is_empty())
        .is_some_and(|line| serde_json::from_str::<Value>(line).is_ok())
}
