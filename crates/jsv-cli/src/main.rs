//! # jsv CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, and
//! dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use jsv_cli::validate::{run_validate, ValidateArgs};
use jsv_cli::EXIT_ABORTED;

/// jsv: JSON Schema validation with severity-leveled reports.
#[derive(Parser, Debug)]
#[command(name = "jsv", version, about, long_about = None)]
struct Cli {
    /// Enable verbose diagnostics. Repeat for more (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit diagnostics as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate an instance document against a schema.
    Validate(ValidateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match cli.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    let mut stdout = std::io::stdout().lock();
    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &mut stdout),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ABORTED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsv_core::LogLevel;
    use std::path::PathBuf;

    #[test]
    fn cli_parse_validate_minimal() {
        let cli = Cli::try_parse_from(["jsv", "validate", "--schema", "s.json", "--instance", "i.yaml"])
            .unwrap();
        let Commands::Validate(args) = cli.command;
        assert_eq!(args.schema, PathBuf::from("s.json"));
        assert_eq!(args.instance, PathBuf::from("i.yaml"));
        assert!(args.refs.is_empty());
        assert!(args.log_level.is_none());
        assert!(!args.brief);
    }

    #[test]
    fn cli_parse_validate_all_flags() {
        let cli = Cli::try_parse_from([
            "jsv",
            "validate",
            "--schema",
            "s.json",
            "--instance",
            "i.json",
            "--ref",
            "urn:a=a.json",
            "--ref",
            "urn:b=b.yaml",
            "--log-level",
            "warning",
            "--exception-threshold",
            "ERROR",
            "--max-depth",
            "64",
            "--config",
            "jsv.yaml",
            "--brief",
            "--log-json",
        ])
        .unwrap();
        assert!(cli.log_json);
        let Commands::Validate(args) = cli.command;
        assert_eq!(args.refs, ["urn:a=a.json", "urn:b=b.yaml"]);
        assert_eq!(args.log_level, Some(LogLevel::Warning));
        assert_eq!(args.exception_threshold, Some(LogLevel::Error));
        assert_eq!(args.max_depth, Some(64));
        assert_eq!(args.config, Some(PathBuf::from("jsv.yaml")));
        assert!(args.brief);
    }

    #[test]
    fn cli_rejects_unknown_level() {
        let result = Cli::try_parse_from([
            "jsv", "validate", "--schema", "s", "--instance", "i", "--log-level", "loud",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_requires_schema_and_instance() {
        assert!(Cli::try_parse_from(["jsv", "validate", "--schema", "s.json"]).is_err());
    }

    #[test]
    fn cli_verbose_counts() {
        let cli = Cli::try_parse_from(["jsv", "-vv", "validate", "--schema", "s", "--instance", "i"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
