//! Argument definitions for the `formstate` binary.

use std::path::PathBuf;

use clap::{ArgAction, ArgGroup, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "formstate",
    version,
    about = "Drive a form validation session over a JSON document",
    long_about = "Load a JSON document, apply field edits and touches, then print the \
                  document together with the errors a form would display.\n\n\
                  Mutations run in order: every --set, then every --unset, then every --touch. \
                  --step is gated next, and --validate-all is applied last."
)]
#[command(group(ArgGroup::new("schema_source").required(true).args(["schema", "json_schema"])))]
pub struct Cli {
    /// Rule schema config (JSON: {"messages": {...}, "fields": [...]}).
    #[arg(long, value_name = "PATH")]
    pub schema: Option<PathBuf>,

    /// JSON Schema document to validate against.
    #[arg(long = "json-schema", value_name = "PATH")]
    pub json_schema: Option<PathBuf>,

    /// Form document to load (stdin when omitted).
    #[arg(long, value_name = "PATH")]
    pub document: Option<PathBuf>,

    /// Engine options (JSON, e.g. {"initial_validate_all": true}).
    #[arg(long, value_name = "PATH")]
    pub options: Option<PathBuf>,

    /// Write a value: PATH=JSON. Values that are not valid JSON are taken as strings.
    #[arg(long = "set", value_name = "PATH=JSON")]
    pub set: Vec<String>,

    /// Remove the value at PATH (sequence elements are spliced out).
    #[arg(long = "unset", value_name = "PATH")]
    pub unset: Vec<String>,

    /// Mark PATH as touched.
    #[arg(long = "touch", value_name = "PATH")]
    pub touch: Vec<String>,

    /// Show every error, not only touched ones.
    #[arg(long = "validate-all")]
    pub validate_all: bool,

    /// Gate a step owning these comma-separated path prefixes.
    #[arg(long, value_name = "PATH,PATH", value_delimiter = ',')]
    pub step: Option<Vec<String>>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}
