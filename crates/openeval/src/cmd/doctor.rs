use serde::Serialize;

use openeval_schema::{item_validator, loader, LoaderConfig};

use crate::cmd::{DoctorArgs, SchemaSource};
use crate::exit::{CliResult, HEALTH_CHECK_FAILED, SUCCESS};
use crate::output::{print_json, schema_id, OutputFormat};

/// Smallest typed document; loading it exercises the meta-schema.
const TYPED_PROBE: &str = r#"{"format":"typed","fields":{"id":{"type":"string"}}}"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Pass,
    Fail,
    Info,
    Skip,
}

#[derive(Debug, Serialize)]
struct CheckResult {
    name: &'static str,
    status: CheckStatus,
    detail: String,
}

impl CheckResult {
    fn new(name: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name,
            status,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorOutput {
    schema_id: String,
    checks: Vec<CheckResult>,
    overall: &'static str,
}

pub fn run(_args: DoctorArgs, source: &SchemaSource, format: OutputFormat) -> CliResult<i32> {
    let checks = vec![
        bundled_schema_check(),
        typed_format_check(),
        configured_schema_check(source),
        compiled_features_check(),
    ];

    let has_fail = checks.iter().any(|c| c.status == CheckStatus::Fail);
    let output = DoctorOutput {
        schema_id: schema_id("doctor-report"),
        checks,
        overall: if has_fail { "fail" } else { "pass" },
    };

    print_doctor(&output, format);

    if has_fail {
        Ok(HEALTH_CHECK_FAILED)
    } else {
        Ok(SUCCESS)
    }
}

fn bundled_schema_check() -> CheckResult {
    match item_validator() {
        Ok(validator) => CheckResult::new(
            "bundled_schema",
            CheckStatus::Pass,
            format!(
                "{} fields, depth {}",
                validator.schema().flatten().len(),
                validator.schema().depth()
            ),
        ),
        Err(err) => CheckResult::new("bundled_schema", CheckStatus::Fail, err.to_string()),
    }
}

fn typed_format_check() -> CheckResult {
    match loader::parse_schema_str(TYPED_PROBE, &LoaderConfig::default()) {
        Ok(_) => CheckResult::new("typed_format", CheckStatus::Pass, "meta-schema compiled"),
        Err(err) => CheckResult::new("typed_format", CheckStatus::Fail, err.to_string()),
    }
}

fn configured_schema_check(source: &SchemaSource) -> CheckResult {
    let Some(path) = &source.path else {
        return CheckResult::new(
            "configured_schema",
            CheckStatus::Skip,
            "no --schema or OPENEVAL_SCHEMA given; using bundled schema",
        );
    };

    match source.load() {
        Ok(validator) => CheckResult::new(
            "configured_schema",
            CheckStatus::Pass,
            format!(
                "{} loaded ({} top-level fields)",
                path.display(),
                validator.schema().len()
            ),
        ),
        Err(err) => CheckResult::new("configured_schema", CheckStatus::Fail, err.message),
    }
}

fn compiled_features_check() -> CheckResult {
    let mut features = Vec::new();
    if cfg!(feature = "cli") {
        features.push("cli");
    }
    CheckResult::new("compiled_features", CheckStatus::Info, features.join(", "))
}

fn print_doctor(output: &DoctorOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(output),
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("openeval doctor\n");
            for c in &output.checks {
                println!(
                    "  [{:>4}] {:<20} {}",
                    status_text(c.status),
                    c.name,
                    c.detail
                );
            }
            if output.overall == "pass" {
                println!("\n  Result: all checks passed");
            } else {
                println!("\n  Result: one or more checks failed");
            }
        }
        OutputFormat::Raw => println!("{}", output.overall),
    }
}

fn status_text(status: CheckStatus) -> &'static str {
    match status {
        CheckStatus::Pass => "PASS",
        CheckStatus::Fail => "FAIL",
        CheckStatus::Info => "INFO",
        CheckStatus::Skip => "SKIP",
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn builtin_checks_pass() {
        assert_eq!(bundled_schema_check().status, CheckStatus::Pass);
        assert_eq!(typed_format_check().status, CheckStatus::Pass);
    }

    #[test]
    fn configured_schema_is_skipped_without_path() {
        let check = configured_schema_check(&SchemaSource::default());
        assert_eq!(check.status, CheckStatus::Skip);
    }

    #[test]
    fn missing_configured_schema_fails() {
        let source = SchemaSource {
            path: Some(PathBuf::from("/nonexistent/openeval/item_schema.json")),
            ..SchemaSource::default()
        };
        let check = configured_schema_check(&source);
        assert_eq!(check.status, CheckStatus::Fail);
        assert!(check.detail.contains("/nonexistent/openeval/item_schema.json"));
    }

    #[test]
    fn doctor_output_has_overall_status() {
        let output = DoctorOutput {
            schema_id: schema_id("doctor-report"),
            checks: vec![CheckResult::new("x", CheckStatus::Pass, "ok")],
            overall: "pass",
        };
        let json = serde_json::to_string(&output).expect("doctor output should serialize");
        assert!(json.contains("\"overall\":\"pass\""));
    }
}
