mod cmd;
mod exit;
mod logging;
mod output;
mod records;

use std::path::PathBuf;

use clap::Parser;

use openeval_schema::SchemaFormat;

use crate::cmd::{Command, SchemaSource};
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "openeval", version, about = "OpenEval item schema validator")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Schema definition file. Defaults to the bundled OpenEval item schema.
    #[arg(long, value_name = "PATH", env = "OPENEVAL_SCHEMA", global = true)]
    schema: Option<PathBuf>,

    /// Layout of the schema file: auto, typed or template.
    #[arg(long, value_name = "FORMAT", default_value = "auto", global = true)]
    schema_format: SchemaFormat,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let source = SchemaSource {
        path: cli.schema,
        format: cli.schema_format,
    };
    let result = cmd::run(cli.command, &source, format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
