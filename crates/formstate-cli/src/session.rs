//! One command-line validation session: load, mutate, report.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Serialize;
use serde_json::Value;

use formstate::{ErrorTree, FieldPath, FormOptions, GateDecision, ModifyMethod, Schema, ValidationEngine};
use formstate_schema::{JsonSchemaAdapter, RuleSchema};

use crate::cli::Cli;

/// Exit status when a gated step has errors.
pub const EXIT_STEP_INVALID: i32 = 1;
/// Exit status for load, parse, path and logging failures.
pub const EXIT_FAILURE: i32 = 2;

/// What the binary prints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub document: Value,
    pub errors: ErrorTree,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_valid: Option<bool>,
}

impl Report {
    /// Process exit status: 1 when a gated step was invalid.
    pub fn exit_code(&self) -> i32 {
        match self.step_valid {
            Some(false) => EXIT_STEP_INVALID,
            _ => 0,
        }
    }
}

fn read_json(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn load_schema(cli: &Cli) -> Result<Box<dyn Schema>> {
    if let Some(path) = &cli.schema {
        let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let schema = RuleSchema::from_json_str(&text).with_context(|| format!("loading rule schema {}", path.display()))?;
        return Ok(Box::new(schema));
    }
    if let Some(path) = &cli.json_schema {
        let schema = JsonSchemaAdapter::new(&read_json(path)?)
            .with_context(|| format!("compiling JSON Schema {}", path.display()))?;
        return Ok(Box::new(schema));
    }
    bail!("one of --schema or --json-schema is required")
}

/// The document from `--document`, or stdin.
pub fn load_document(cli: &Cli) -> Result<Value> {
    match &cli.document {
        Some(path) => read_json(path),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading document from stdin")?;
            serde_json::from_str(buf.trim()).context("parsing document from stdin")
        }
    }
}

pub fn load_options(cli: &Cli) -> Result<FormOptions> {
    match &cli.options {
        Some(path) => {
            serde_json::from_value(read_json(path)?).with_context(|| format!("parsing options {}", path.display()))
        }
        None => Ok(FormOptions::default()),
    }
}

/// Split `PATH=JSON`. A value that does not parse as JSON is kept as a
/// string, so `name=train` works without shell-quoting.
fn parse_assignment(arg: &str) -> Result<(&str, Value)> {
    let Some((path, raw)) = arg.split_once('=') else {
        bail!("--set expects PATH=JSON, got {arg:?}");
    };
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((path, value))
}

/// Apply the command line's mutations to a fresh engine and report.
pub fn run<S: Schema>(cli: &Cli, schema: S, document: Value, options: FormOptions) -> Result<Report> {
    let mut engine = ValidationEngine::with_options(schema, document, options);

    let sets = cli
        .set
        .iter()
        .map(|arg| parse_assignment(arg))
        .collect::<Result<Vec<_>>>()?;
    engine.set_fields_at(sets, ModifyMethod::Set)?;
    engine.set_fields_at(cli.unset.iter().map(|path| (path.as_str(), Value::Null)), ModifyMethod::Unset)?;
    engine.touch_fields_at(cli.touch.iter().map(String::as_str), ModifyMethod::Set)?;

    let step_valid = match &cli.step {
        Some(fields) => {
            let fields = fields
                .iter()
                .map(|field| engine.path(field))
                .collect::<Result<Vec<FieldPath>, _>>()?;
            Some(engine.advance_step(&fields) == GateDecision::Proceed)
        }
        None => None,
    };
    // After the gate: leaving a valid step switches validate-all back off.
    if cli.validate_all {
        engine.set_validate_all(true);
    }

    let errors = engine.current_errors();
    tracing::info!(errors = errors.len(), revision = engine.state().revision, "session finished");
    Ok(Report {
        document: engine.document().clone(),
        errors,
        step_valid,
    })
}
