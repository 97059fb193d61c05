//! Run command implementation
//!
//! Run the hooks planned for a stage and print one status line per hook.

use anyhow::Context;
use clap::Args;
use hookpin_engine::{FileSet, HookOutcome, HookReport, HookRunner, RunSummary};
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::cmd::{plural, selects};
use crate::command::Command;
use crate::common::{Prepared, RuntimeContext};
use crate::error::{CommandError, Result};

/// Width of a status line, dots included
const LINE_WIDTH: usize = 79;

/// Run command
#[derive(Args, Debug)]
pub struct RunCommand {
    /// Run on every tracked file instead of the staged ones
    #[arg(short, long)]
    pub all_files: bool,

    /// Run only the hooks with this id, alias or name
    #[arg(long, value_name = "ID")]
    pub hook: Option<String>,

    /// Stage to run (default: pre-commit)
    #[arg(long, value_name = "STAGE")]
    pub stage: Option<String>,

    /// Stop after the first failing hook
    #[arg(long)]
    pub fail_fast: bool,

    /// Run only on these files
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl Command for RunCommand {
    type Output = RunSummary;

    fn execute(&self, context: &RuntimeContext) -> Result<RunSummary> {
        let mut prepared =
            Prepared::new(context, self.all_files, self.stage.as_deref(), &self.files)?;

        if let Some(selector) = &self.hook {
            let manifest = &prepared.manifest;
            prepared.plan.hooks.retain(|planned| {
                manifest
                    .hook_at(planned.position())
                    .is_some_and(|(_, hook)| selects(hook, selector))
            });
            if prepared.plan.hooks.is_empty() {
                return Err(CommandError::HookNotFound(selector.clone()));
            }
        }

        let all_files = if prepared.needs_meta() {
            FileSet::new(&context.repo_root, context.all_files()?)?
        } else {
            FileSet::default()
        };

        let summary = HookRunner::builder(&prepared.plan, &prepared.resolved, &context.repo_root)
            .fail_fast(self.fail_fast || prepared.manifest.fail_fast)
            .max_args(context.config.run.max_args)
            .meta(prepared.meta_context(&all_files))
            .build()
            .run()
            .context("Failed to run hooks")?;

        for report in &summary.results {
            print_report(report);
        }

        tracing::debug!(
            passed = summary.passed(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            "Run finished"
        );

        if summary.is_success() {
            if summary.results.is_empty() {
                println!("{}", "No hooks to run.".yellow());
            } else {
                println!(
                    "{}",
                    format!(
                        "{} passed, {} skipped",
                        plural(summary.passed(), "hook", "hooks"),
                        summary.skipped()
                    )
                    .dimmed()
                );
            }
            Ok(summary)
        } else {
            Err(CommandError::HooksFailed {
                failed: summary.failed(),
                total: summary.results.len(),
            })
        }
    }
}

fn print_report(report: &HookReport) {
    match &report.outcome {
        HookOutcome::Passed { output } => {
            println!("{}", status_line(&report.name, "Passed", LINE_WIDTH).green());
            if report.verbose && !output.trim().is_empty() {
                print_output(report, output);
            }
        }
        HookOutcome::Failed { output } => {
            println!("{}", status_line(&report.name, "Failed", LINE_WIDTH).red());
            print_output(report, output);
        }
        HookOutcome::Skipped(reason) => {
            let status = format!("({reason})Skipped");
            println!("{}", status_line(&report.name, &status, LINE_WIDTH).yellow());
        }
    }
}

fn print_output(report: &HookReport, output: &str) {
    println!("{}", format!("- hook id: {}", report.id).dimmed());
    println!(
        "{}",
        format!("- duration: {:.2}s", report.elapsed.as_secs_f64()).dimmed()
    );
    if !output.trim().is_empty() {
        println!();
        println!("{}", output.trim_end());
        println!();
    }
}

/// `name`, a run of dots, then `status`, padded out to `width`
///
/// At least three dots are always printed.
fn status_line(name: &str, status: &str, width: usize) -> String {
    let used = name.chars().count() + status.chars().count();
    let dots = width.saturating_sub(used).max(3);
    format!("{name}{}{status}", ".".repeat(dots))
}
