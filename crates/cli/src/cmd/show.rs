//! Show command implementation
//!
//! Print everything known about one hook: what the manifest says and, when
//! a definition is available, the effective settings after overrides.

use clap::Args;
use hookpin_config::{HookRef, HookSource};
use hookpin_engine::{HookOrigin, ResolvedEntry};
use owo_colors::OwoColorize;

use crate::cmd::selects;
use crate::command::Command;
use crate::common::RuntimeContext;
use crate::error::{CommandError, Result};
use crate::ui::StatusIcon;

/// Show command
#[derive(Args, Debug)]
pub struct ShowCommand {
    /// Hook id, alias or name
    #[arg(value_name = "ID_OR_NAME")]
    pub hook: String,
}

impl Command for ShowCommand {
    type Output = usize;

    fn execute(&self, context: &RuntimeContext) -> Result<usize> {
        let manifest = context.load_manifest()?;
        let resolved = context.catalog()?.resolve(&manifest)?;

        let mut shown = 0;
        for (position, source, hook) in manifest.hooks() {
            if !selects(hook, &self.hook) {
                continue;
            }
            if shown > 0 {
                println!();
            }
            let entry = resolved.iter().find(|e| e.position == position);
            print!("{}", describe(source, hook, entry, context.use_icons));
            shown += 1;
        }

        if shown == 0 {
            return Err(CommandError::HookNotFound(self.hook.clone()));
        }
        Ok(shown)
    }
}

fn field(out: &mut String, key: &str, value: impl std::fmt::Display) {
    out.push_str(&format!("  {:<24}{}\n", format!("{key}:").dimmed(), value));
}

fn list_or_dash(values: &[String]) -> String {
    if values.is_empty() {
        "-".to_string()
    } else {
        values.join(", ")
    }
}

fn describe(
    source: &HookSource,
    hook: &HookRef,
    entry: Option<&ResolvedEntry>,
    use_icons: bool,
) -> String {
    let mut out = format!(
        "{} {}\n",
        StatusIcon::Hook.get(use_icons).cyan(),
        hook.display_name().bold()
    );

    field(&mut out, "id", &hook.id);
    field(&mut out, "repo", &source.location);
    if let Some(rev) = &source.revision {
        field(&mut out, "rev", rev);
    }
    if let Some(types) = &hook.types {
        field(&mut out, "types", list_or_dash(types));
    }
    if let Some(exclude) = &hook.exclude {
        field(&mut out, "exclude", exclude);
    }
    if !hook.additional_dependencies.is_empty() {
        field(
            &mut out,
            "additional_dependencies",
            list_or_dash(&hook.additional_dependencies),
        );
    }

    let Some(entry) = entry else {
        return out;
    };

    let origin = match &entry.origin {
        HookOrigin::Catalog(path) => path.display().to_string(),
        HookOrigin::Local => "inline (local)".to_string(),
        HookOrigin::Meta => "built-in (meta)".to_string(),
        HookOrigin::Unresolved => {
            field(&mut out, "definition", "not available".yellow());
            return out;
        }
    };

    let hook = &entry.hook;
    field(&mut out, "definition", origin);
    field(&mut out, "language", &hook.language);
    field(&mut out, "entry", &hook.entry);
    if !hook.args.is_empty() {
        field(&mut out, "args", hook.args.join(" "));
    }
    field(&mut out, "files", hook.files.as_str());
    field(&mut out, "effective types", list_or_dash(&hook.types));
    if !hook.stages.is_empty() {
        field(&mut out, "stages", hook.stages.join(", "));
    }
    out
}
