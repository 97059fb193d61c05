//! Hookpin CLI library
//!
//! This library contains all the CLI logic for hookpin, making it reusable
//! for testing and integration with other tools.

pub mod cmd;
pub mod command;
pub mod common;
pub mod error;
pub mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use command::Command;
use common::RuntimeContext;
use error::CommandError;

/// Exit status when hooks failed or the manifest is invalid
pub const EXIT_FAILED: i32 = 1;

/// Exit status for anything that stopped hookpin itself
pub const EXIT_ERROR: i32 = 3;

/// Hookpin - check and run a pre-commit hook manifest
#[derive(Parser)]
#[command(name = "hookpin")]
#[command(about = "Check and run the hooks of a .pre-commit-config.yaml")]
#[command(version)]
#[command(long_about = "Check and run the hooks of a .pre-commit-config.yaml

Validates the manifest (hook sources, pinned revisions, hook references),
shows which hooks apply to which files, and runs local hooks.

Examples:
  • hookpin validate --strict
  • hookpin list
  • hookpin plan --all-files
  • hookpin run --hook flake8")]
pub struct Cli {
    /// Path to the hook manifest (default: .pre-commit-config.yaml in the repository root)
    #[arg(short, long, env = "HOOKPIN_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Path to the settings file
    #[arg(long, env = "HOOKPIN_SETTINGS", value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "HOOKPIN_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for hookpin CLI
#[derive(Subcommand)]
pub enum Commands {
    /// Check the manifest for errors and warnings
    Validate(cmd::validate::ValidateCommand),

    /// List hook sources and their hook references
    List(cmd::list::ListCommand),

    /// Show the effective settings of one hook
    Show(cmd::show::ShowCommand),

    /// Show which hooks would run on which files
    Plan(cmd::plan::PlanCommand),

    /// Run the hooks
    Run(cmd::run::RunCommand),
}

fn execute_command(command: Commands, context: &RuntimeContext) -> Result<()> {
    match command {
        Commands::Validate(validate_cmd) => {
            validate_cmd.execute(context)?;
        }
        Commands::List(list_cmd) => {
            list_cmd.execute(context)?;
        }
        Commands::Show(show_cmd) => {
            show_cmd.execute(context)?;
        }
        Commands::Plan(plan_cmd) => {
            plan_cmd.execute(context)?;
        }
        Commands::Run(run_cmd) => {
            run_cmd.execute(context)?;
        }
    }
    Ok(())
}

/// Run the CLI
///
/// # Errors
///
/// Returns an error if logging or settings cannot be set up, or the command fails.
pub fn run(cli: Cli) -> Result<()> {
    // Initialize logging based on verbosity
    hookpin_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let config = hookpin_config::Config::load_or_default(cli.settings.as_deref())
        .context("Failed to load settings")?;

    let context = RuntimeContext::new(config, cli.config.as_deref())?;

    execute_command(cli.command, &context)
}

/// Exit status for an error returned by [`run`]
///
/// Failing hooks, an invalid manifest and an unknown hook selector are
/// results of the check; everything else is an error of hookpin itself.
#[must_use]
pub fn exit_code(error: &anyhow::Error) -> i32 {
    match error.downcast_ref::<CommandError>() {
        Some(
            CommandError::HooksFailed { .. }
            | CommandError::ValidationFailed { .. }
            | CommandError::HookNotFound(_),
        ) => EXIT_FAILED,
        _ => EXIT_ERROR,
    }
}

/// Whether an error is an expected check result rather than a malfunction
#[must_use]
pub fn is_check_failure(error: &anyhow::Error) -> bool {
    exit_code(error) == EXIT_FAILED
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run_flags() {
        let cli = Cli::try_parse_from([
            "hookpin",
            "-c",
            "hooks.yaml",
            "run",
            "--all-files",
            "--hook",
            "flake8",
            "--stage",
            "pre-push",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("hooks.yaml")));
        let Commands::Run(run) = cli.command else {
            panic!("expected run command");
        };
        assert!(run.all_files);
        assert_eq!(run.hook.as_deref(), Some("flake8"));
        assert_eq!(run.stage.as_deref(), Some("pre-push"));
    }

    #[test]
    fn test_parse_validate_format() {
        let cli = Cli::try_parse_from(["hookpin", "validate", "--strict", "--format", "json"])
            .unwrap();
        let Commands::Validate(validate) = cli.command else {
            panic!("expected validate command");
        };
        assert!(validate.strict);
        assert_eq!(validate.format, cmd::OutputFormat::Json);
    }

    #[test]
    fn test_exit_codes() {
        let failed = anyhow::Error::from(CommandError::HooksFailed {
            failed: 1,
            total: 3,
        });
        assert_eq!(exit_code(&failed), EXIT_FAILED);
        assert!(is_check_failure(&failed));

        let invalid = anyhow::Error::from(CommandError::ValidationFailed {
            errors: 2,
            warnings: 0,
        });
        assert_eq!(exit_code(&invalid), EXIT_FAILED);

        let broken = anyhow::Error::from(CommandError::Core(hookpin_core::Error::Git(
            "bad index".to_string(),
        )));
        assert_eq!(exit_code(&broken), EXIT_ERROR);

        let io = anyhow::anyhow!("Failed to load settings");
        assert_eq!(exit_code(&io), EXIT_ERROR);
        assert!(!is_check_failure(&io));
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["hookpin", "list", "--format", "yaml"]).is_err());
    }
}
