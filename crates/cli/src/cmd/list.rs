//! List command implementation
//!
//! Print the hook sources of the manifest with their hook references.

use clap::Args;
use hookpin_config::{Manifest, SourceKind};
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cmd::OutputFormat;
use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::Result;
use crate::ui::StatusIcon;

/// List command
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Output format (simple, json)
    #[arg(long, default_value = "simple")]
    pub format: OutputFormat,
}

#[derive(Debug, Serialize, PartialEq)]
struct SourceListing<'a> {
    repo: &'a str,
    kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    rev: Option<&'a str>,
    hooks: Vec<HookListing<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
struct HookListing<'a> {
    id: &'a str,
    name: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    additional_dependencies: &'a [String],
}

fn listing(manifest: &Manifest) -> Vec<SourceListing<'_>> {
    manifest
        .repos
        .iter()
        .map(|source| SourceListing {
            repo: &source.location,
            kind: source.kind().name(),
            rev: source.revision.as_deref(),
            hooks: source
                .hooks
                .iter()
                .map(|hook| HookListing {
                    id: &hook.id,
                    name: hook.display_name(),
                    additional_dependencies: &hook.additional_dependencies,
                })
                .collect(),
        })
        .collect()
}

impl Command for ListCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let manifest = context.load_manifest()?;
        let sources = listing(&manifest);

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&sources)?);
            return Ok(());
        }

        if sources.is_empty() {
            println!("{}", "No hook sources configured.".yellow());
            return Ok(());
        }

        for (source, listed) in manifest.repos.iter().zip(&sources) {
            let rev = match (source.kind(), listed.rev) {
                (SourceKind::Remote, Some(rev)) => format!(" @ {rev}"),
                (SourceKind::Remote, None) => " (no rev)".to_string(),
                _ => String::new(),
            };
            println!("{}{}", listed.repo.bold(), rev.dimmed());

            for hook in &listed.hooks {
                let icon = StatusIcon::Hook.get(context.use_icons);
                if hook.name == hook.id {
                    println!("  {} {}", icon.cyan(), hook.id);
                } else {
                    println!("  {} {} {}", icon.cyan(), hook.id, format!("({})", hook.name).dimmed());
                }
                if !hook.additional_dependencies.is_empty() {
                    println!(
                        "      {} {}",
                        "with".dimmed(),
                        hook.additional_dependencies.join(", ")
                    );
                }
            }
        }

        Ok(())
    }
}
