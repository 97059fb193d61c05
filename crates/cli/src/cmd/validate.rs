//! Validate command implementation
//!
//! Check the manifest and report its shape and every issue found.

use clap::Args;
use hookpin_config::{ManifestSummary, Severity, ValidationReport, validate};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cmd::{OutputFormat, plural};
use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use crate::ui::StatusIcon;

/// Validate command
#[derive(Args, Debug)]
pub struct ValidateCommand {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Output format (simple, json)
    #[arg(long, default_value = "simple")]
    pub format: OutputFormat,
}

/// JSON shape of a validation run
#[derive(Serialize)]
struct ValidationOutput<'a> {
    manifest: String,
    valid: bool,
    strict: bool,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

impl Command for ValidateCommand {
    type Output = ValidationReport;

    fn execute(&self, context: &RuntimeContext) -> Result<ValidationReport> {
        let manifest = context.load_manifest()?;
        let report = validate(&manifest);

        let strict = self.strict || context.config.lint.strict;
        let valid = if strict {
            report.is_valid_strict()
        } else {
            report.is_valid()
        };

        match self.format {
            OutputFormat::Json => {
                let output = ValidationOutput {
                    manifest: context.manifest_path.display().to_string(),
                    valid,
                    strict,
                    report: &report,
                };
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Simple => print_report(context, &report, valid),
        }

        if valid {
            Ok(report)
        } else {
            Err(CommandError::ValidationFailed {
                errors: report.errors().count(),
                warnings: report.warnings().count(),
            })
        }
    }
}

fn print_report(context: &RuntimeContext, report: &ValidationReport, valid: bool) {
    let icons = context.use_icons;

    println!(
        "{} {}: {}",
        StatusIcon::Info.get(icons).bright_blue(),
        context.manifest_path.display(),
        summary_line(&report.summary)
    );

    for issue in &report.issues {
        match issue.severity {
            Severity::Error => println!(
                "  {} {} {}",
                StatusIcon::Error.get(icons).red(),
                issue.location.bold(),
                issue.message
            ),
            Severity::Warning => println!(
                "  {} {} {}",
                StatusIcon::Warning.get(icons).yellow(),
                issue.location.bold(),
                issue.message
            ),
        }
    }

    if valid {
        println!("{} {}", StatusIcon::Success.get(icons).green(), "Manifest is valid".green());
    }
}

/// One-line description of the manifest's shape
fn summary_line(summary: &ManifestSummary) -> String {
    format!(
        "{} and {} ({})",
        plural(summary.sources, "source", "sources"),
        plural(summary.hook_entries, "hook entry", "hook entries"),
        plural(summary.distinct_hook_ids, "distinct hook id", "distinct hook ids")
    )
}
