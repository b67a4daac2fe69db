//! `formstate`: run one form validation session and print the result.

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use formstate_cli::cli::Cli;
use formstate_cli::logging::{init_logging, LogConfig};
use formstate_cli::session::{load_document, load_options, load_schema, run, EXIT_FAILURE};

fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(&LogConfig::from_verbosity(cli.verbose)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_FAILURE);
    }
    match execute(&cli) {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            eprintln!("error: {error:#}");
            std::process::exit(EXIT_FAILURE);
        }
    }
}

fn execute(cli: &Cli) -> Result<i32> {
    let schema = load_schema(cli)?;
    let document = load_document(cli)?;
    let options = load_options(cli)?;
    let report = run(cli, schema, document, options)?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report).context("writing report")?;
    stdout.write_all(b"\n").context("writing report")?;
    Ok(report.exit_code())
}
