use serde::Serialize;

use openeval_schema::{ValidationReport, Validator, Violation};

use crate::cmd::{SchemaSource, ValidateArgs};
use crate::exit::{CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_json, schema_id, table, OutputFormat};
use crate::records::{self, SourcedRecord};

#[derive(Serialize)]
struct RecordResult<'a> {
    source: &'a str,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

#[derive(Serialize)]
struct ValidateOutput<'a> {
    schema_id: String,
    schema: String,
    total: usize,
    passed: usize,
    failed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    results: Option<Vec<RecordResult<'a>>>,
}

pub fn run(args: ValidateArgs, source: &SchemaSource, format: OutputFormat) -> CliResult<i32> {
    let validator = source.load()?;

    let mut records = Vec::new();
    if args.stdin {
        records.extend(records::read_stdin()?);
    }
    for path in &args.files {
        records.extend(records::read_file(path)?);
    }

    let reports = validate_all(&validator, &records);
    let failed = reports.iter().filter(|report| !report.passed()).count();

    tracing::info!(
        records = reports.len(),
        failed,
        schema = %source.label(),
        "validation finished"
    );

    let results: Vec<RecordResult<'_>> = records
        .iter()
        .zip(&reports)
        .map(|(record, report)| RecordResult {
            source: &record.source,
            report,
        })
        .collect();
    let output = ValidateOutput {
        schema_id: schema_id("validation-report"),
        schema: source.label(),
        total: results.len(),
        passed: results.len() - failed,
        failed,
        results: (!args.quiet).then_some(results),
    };
    print_validate(&output, format);

    if failed == 0 {
        Ok(SUCCESS)
    } else {
        Ok(DATA_INVALID)
    }
}

fn validate_all(validator: &Validator, records: &[SourcedRecord]) -> Vec<ValidationReport> {
    records
        .iter()
        .map(|sourced| {
            let report = validator.validate_entry(&sourced.record);
            if !report.passed() {
                tracing::debug!(
                    source = %sourced.source,
                    violations = report.violations().len(),
                    "record failed validation"
                );
            }
            report
        })
        .collect()
}

fn print_validate(output: &ValidateOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table => {
            if let Some(results) = &output.results {
                let header = ["RECORD", "RESULT", "FIELD", "KIND", "DETAIL", "DESCRIPTION"];
                let mut out = table(header);
                for result in results {
                    if result.report.passed() {
                        out.add_row(vec![result.source, "PASS", "", "", "", ""]);
                        continue;
                    }
                    for violation in result.report.violations() {
                        out.add_row(vec![
                            result.source.to_string(),
                            "FAIL".to_string(),
                            violation.field_path.clone(),
                            violation.kind.to_string(),
                            violation.detail.clone(),
                            violation.field_description.clone().unwrap_or_default(),
                        ]);
                    }
                }
                println!("{out}");
            }
            println!("{}", summary_line(output));
        }
        OutputFormat::Pretty => {
            for result in output.results.iter().flatten() {
                println!("{}: {}", result.source, pass_text(result.report.passed()));
                for (number, violation) in result.report.violations().iter().enumerate() {
                    println!("  {}. {}", number + 1, describe(violation));
                }
            }
            println!("{}", summary_line(output));
        }
        OutputFormat::Raw => {
            for result in output.results.iter().flatten() {
                println!("{} {}", pass_text(result.report.passed()), result.source);
            }
            if output.results.is_none() {
                println!("{}", pass_text(output.failed == 0));
            }
        }
    }
}

fn pass_text(passed: bool) -> &'static str {
    if passed {
        "pass"
    } else {
        "fail"
    }
}

fn describe(violation: &Violation) -> String {
    let line = format!(
        "{} ({}): {}",
        violation.field_path, violation.kind, violation.detail
    );
    match &violation.field_description {
        Some(description) => format!("{line}\n     field: {description}"),
        None => line,
    }
}

fn summary_line(output: &ValidateOutput<'_>) -> String {
    format!(
        "{} record(s) checked against {}: {} passed, {} failed",
        output.total, output.schema, output.passed, output.failed
    )
}
