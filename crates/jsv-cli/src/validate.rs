//! # Validate Subcommand
//!
//! Validates one instance document against one schema document, with
//! optional preloaded documents for cross-document `$ref`.
//!
//! Options come from `--config` first, then individual flags override
//! them. The report is written as pretty JSON, or as a one-line verdict
//! with `--brief`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use jsv_core::LogLevel;
use jsv_validator::{ValidationOptions, ValidationProcessor};

use crate::load::{load_document, parse_ref};
use crate::{EXIT_ABORTED, EXIT_INVALID, EXIT_SUCCESS};

/// Arguments for the `jsv validate` subcommand.
#[derive(Args, Debug, Default)]
pub struct ValidateArgs {
    /// Schema document (JSON, or YAML by extension).
    #[arg(long, value_name = "FILE")]
    pub schema: PathBuf,

    /// Instance document to validate.
    #[arg(long, value_name = "FILE")]
    pub instance: PathBuf,

    /// Preload a document for `$ref`, as `<uri>=<file>`. Repeatable.
    #[arg(long = "ref", value_name = "URI=FILE")]
    pub refs: Vec<String>,

    /// Messages below this level are dropped from the report.
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Messages at or above this level abort validation.
    #[arg(long, value_name = "LEVEL")]
    pub exception_threshold: Option<LogLevel>,

    /// Maximum nested validation steps.
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Options file (YAML, or JSON by extension).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Print a one-line verdict instead of the full report.
    #[arg(long)]
    pub brief: bool,
}

/// Merge `--config` with the individual flags.
pub fn resolve_options(args: &ValidateArgs) -> Result<ValidationOptions> {
    let mut options = match &args.config {
        Some(path) => ValidationOptions::load(path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => ValidationOptions::default(),
    };
    if let Some(level) = args.log_level {
        options.log_level = level;
    }
    if let Some(level) = args.exception_threshold {
        options.exception_threshold = level;
    }
    if let Some(depth) = args.max_depth {
        options.max_depth = depth;
    }
    Ok(options)
}

/// A processor with every `--ref` document preloaded.
pub fn build_processor(args: &ValidateArgs) -> Result<ValidationProcessor> {
    let mut builder = ValidationProcessor::builder();
    for arg in &args.refs {
        let (uri, path) = parse_ref(arg)?;
        let document = load_document(&path)?;
        builder = builder
            .with_document(&uri, document)
            .with_context(|| format!("failed to register {uri}"))?;
        tracing::info!(uri = %uri, path = %path.display(), "preloaded schema document");
    }
    Ok(builder.build())
}

/// Execute the validate subcommand, writing the outcome to `out`.
///
/// Returns the exit code: 0 valid, 1 invalid, 2 aborted.
pub fn run_validate(args: &ValidateArgs, out: &mut dyn Write) -> Result<u8> {
    let options = resolve_options(args)?;
    let processor = build_processor(args)?;
    let schema = load_document(&args.schema)?;
    let instance = load_document(&args.instance)?;

    tracing::debug!(
        schema = %args.schema.display(),
        instance = %args.instance.display(),
        ?options,
        "validating"
    );

    match processor.validate(&schema, &instance, &options) {
        Ok(report) => {
            let code = if report.is_success() {
                EXIT_SUCCESS
            } else {
                EXIT_INVALID
            };
            if args.brief {
                let verdict = if code == EXIT_SUCCESS { "valid" } else { "invalid" };
                writeln!(out, "{}: {verdict}", display_name(&args.instance))?;
            } else {
                writeln!(out, "{}", serde_json::to_string_pretty(&report.as_json())?)?;
            }
            tracing::info!(messages = report.len(), code, "validation finished");
            Ok(code)
        }
        Err(exception) => {
            let message = exception.message();
            if args.brief {
                writeln!(
                    out,
                    "{}: aborted ({}: {})",
                    display_name(&args.instance),
                    message.level(),
                    message.message()
                )?;
            } else {
                writeln!(out, "{}", serde_json::to_string_pretty(&message.as_json())?)?;
            }
            tracing::warn!(level = %message.level(), "validation aborted");
            Ok(EXIT_ABORTED)
        }
    }
}

fn display_name(path: &Path) -> String {
    path.display().to_string()
}
