use clap::{Args, Subcommand};
use std::path::PathBuf;

use openeval_schema::{item_validator, LoaderConfig, SchemaFormat, Validator};

use crate::exit::{schema_error, CliResult};
use crate::output::OutputFormat;

pub mod doctor;
pub mod schema;
pub mod validate;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate record files against the item schema.
    Validate(ValidateArgs),
    /// Print the fields declared by the loaded schema.
    Schema(SchemaArgs),
    /// Show version information and facts about the loaded schema.
    Version(VersionArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
}

pub fn run(command: Command, source: &SchemaSource, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Validate(args) => validate::run(args, source, format),
        Command::Schema(args) => schema::run(args, source, format),
        Command::Version(args) => version::run(args, source, format),
        Command::Doctor(args) => doctor::run(args, source, format),
    }
}

/// Where the schema comes from: a file, or the bundled item schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaSource {
    pub path: Option<PathBuf>,
    pub format: SchemaFormat,
}

impl SchemaSource {
    pub fn label(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => "bundled:item_schema.json".to_string(),
        }
    }

    pub fn load(&self) -> CliResult<Validator> {
        let validator = match &self.path {
            Some(path) => {
                let config = LoaderConfig {
                    format: self.format,
                    ..LoaderConfig::default()
                };
                Validator::from_path_with_config(path, &config)
            }
            None => item_validator().cloned(),
        };
        let validator =
            validator.map_err(|err| schema_error(&format!("loading {}", self.label()), err))?;

        tracing::debug!(
            schema = %self.label(),
            fields = validator.schema().len(),
            "schema loaded"
        );
        Ok(validator)
    }
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Record files: one JSON record, a JSON array of records, or JSON Lines.
    #[arg(required_unless_present = "stdin")]
    pub files: Vec<PathBuf>,
    /// Read records from standard input.
    #[arg(long, conflicts_with = "files")]
    pub stdin: bool,
    /// Print only the summary.
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

#[derive(Args, Debug, Default)]
pub struct SchemaArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Also describe the loaded schema and relevant environment variables.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}
