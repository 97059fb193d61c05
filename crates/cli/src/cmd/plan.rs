//! Plan command implementation
//!
//! Show which hooks would run for a stage and the files each would get,
//! without running anything.

use clap::Args;
use hookpin_engine::ExecutionPlan;
use owo_colors::OwoColorize;
use std::path::PathBuf;

use crate::cmd::{OutputFormat, plural};
use crate::command::Command;
use crate::common::{Prepared, RuntimeContext};
use crate::error::Result;
use crate::ui::StatusIcon;

/// Plan command
#[derive(Args, Debug)]
pub struct PlanCommand {
    /// Consider every tracked file instead of the staged ones
    #[arg(short, long)]
    pub all_files: bool,

    /// Stage to plan for (default: pre-commit)
    #[arg(long, value_name = "STAGE")]
    pub stage: Option<String>,

    /// Output format (simple, json)
    #[arg(long, default_value = "simple")]
    pub format: OutputFormat,

    /// Consider only these files
    #[arg(value_name = "FILES")]
    pub files: Vec<PathBuf>,
}

impl Command for PlanCommand {
    type Output = ExecutionPlan;

    fn execute(&self, context: &RuntimeContext) -> Result<ExecutionPlan> {
        let prepared = Prepared::new(context, self.all_files, self.stage.as_deref(), &self.files)?;

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&prepared.plan)?),
            OutputFormat::Simple => print_plan(&prepared, context.use_icons),
        }

        Ok(prepared.plan)
    }
}

fn print_plan(prepared: &Prepared, use_icons: bool) {
    let plan = &prepared.plan;
    println!(
        "{} Stage {} over {}",
        StatusIcon::Info.get(use_icons).bright_blue(),
        plan.stage.bold(),
        plural(prepared.files.len(), "file", "files")
    );

    for hook in &plan.hooks {
        match &hook.skipped {
            None => {
                println!(
                    "  {} {} {}",
                    StatusIcon::Running.get(use_icons).green(),
                    hook.name,
                    format!("({})", plural(hook.files.len(), "file", "files")).dimmed()
                );
                for file in &hook.files {
                    println!("      {}", file.display().dimmed());
                }
            }
            Some(reason) => println!(
                "  {} {} {}",
                StatusIcon::Warning.get(use_icons).yellow(),
                hook.name.dimmed(),
                format!("(skipped: {reason})").dimmed()
            ),
        }
    }

    let runnable = plan.runnable().count();
    println!(
        "{} of {} will run",
        plural(runnable, "hook", "hooks"),
        plan.hooks.len()
    );
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use hookpin_config::Config;
    use hookpin_engine::SkipReason;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_plan_for_stages() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("app.py"), "").unwrap();
        fs::write(temp.path().join("data.json"), "{}").unwrap();
        fs::write(
            temp.path().join(".pre-commit-config.yaml"),
            r"
repos:
  - repo: local
    hooks:
      - id: py
        name: py
        entry: cat
        language: system
        types: [python]
      - id: push-only
        name: push only
        entry: cat
        language: system
        stages: [pre-push]
",
        )
        .unwrap();
        let context = RuntimeContext::from_parts(Config::default(), temp.path().to_path_buf(), false);

        let command = PlanCommand {
            all_files: false,
            stage: None,
            format: OutputFormat::Simple,
            files: Vec::new(),
        };
        let plan = command.execute(&context).unwrap();
        assert_eq!(plan.hooks[0].files, vec![PathBuf::from("app.py")]);
        assert_eq!(plan.hooks[1].skipped, Some(SkipReason::StageMismatch));

        let command = PlanCommand {
            stage: Some("push".to_string()),
            files: vec![PathBuf::from("data.json")],
            format: OutputFormat::Json,
            ..command
        };
        let plan = command.execute(&context).unwrap();
        assert_eq!(plan.stage, "pre-push");
        assert_eq!(plan.hooks[0].skipped, Some(SkipReason::NoFiles));
        assert!(plan.hooks[1].will_run());
        assert_eq!(plan.hooks[1].files, vec![PathBuf::from("data.json")]);
    }
}
