//! Hook execution engine
//!
//! Runs the hooks of an [`ExecutionPlan`] one after another in manifest
//! order and reports an outcome for each.

use crate::catalog::ResolvedEntry;
use crate::meta::MetaContext;
use crate::plan::{ExecutionPlan, PlannedHook, SkipReason};
use hookpin_config::ResolvedHook;
use hookpin_core::{Error, Result};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Default upper bound on file names passed to one invocation
pub const DEFAULT_MAX_ARGS: usize = 4096;

/// What happened to one hook
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookOutcome {
    /// Every invocation exited successfully
    Passed {
        /// Combined output, kept for `verbose` hooks
        output: String,
    },
    /// An invocation failed or could not be started
    Failed {
        /// Combined stdout and stderr of the failing invocations
        output: String,
    },
    /// The hook did not run
    Skipped(SkipReason),
}

impl HookOutcome {
    /// Get the string name of this outcome
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Passed { .. } => "passed",
            Self::Failed { .. } => "failed",
            Self::Skipped(_) => "skipped",
        }
    }
}

/// Outcome of one hook with its identity and timing
#[derive(Debug, Clone)]
pub struct HookReport {
    /// Hook id
    pub id: String,
    /// Display name
    pub name: String,
    /// What happened
    pub outcome: HookOutcome,
    /// Whether the hook asked for its output on success
    pub verbose: bool,
    /// Wall time spent running the hook
    pub elapsed: Duration,
}

/// Reports of a whole run
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Reports in execution order
    pub results: Vec<HookReport>,
}

impl RunSummary {
    /// Number of passed hooks
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, HookOutcome::Passed { .. }))
    }

    /// Number of failed hooks
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, HookOutcome::Failed { .. }))
    }

    /// Number of skipped hooks
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, HookOutcome::Skipped(_)))
    }

    /// No hook failed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&HookOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Runs a plan
///
/// Use [`HookRunner::builder`] to configure one.
pub struct HookRunner<'a> {
    plan: &'a ExecutionPlan,
    resolved: &'a [ResolvedEntry],
    repo_root: &'a Path,
    env_vars: IndexMap<String, String>,
    fail_fast: bool,
    max_args: usize,
    meta: Option<MetaContext<'a>>,
}

impl<'a> HookRunner<'a> {
    /// Create a builder for configuring a `HookRunner`
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let summary = HookRunner::builder(&plan, &resolved, &root)
    ///     .fail_fast(manifest.fail_fast)
    ///     .max_args(settings.run.max_args)
    ///     .build()
    ///     .run()?;
    /// ```
    pub fn builder(
        plan: &'a ExecutionPlan,
        resolved: &'a [ResolvedEntry],
        repo_root: &'a Path,
    ) -> HookRunnerBuilder<'a> {
        HookRunnerBuilder::new(plan, resolved, repo_root)
    }

    /// Run every planned hook in order
    ///
    /// With fail-fast on, the run stops at the first failure and the hooks
    /// after it are neither run nor reported.
    ///
    /// # Errors
    ///
    /// Returns error if the plan refers to a hook missing from the resolved
    /// entries or a meta hook cannot be evaluated
    #[tracing::instrument(skip(self), fields(stage = %self.plan.stage))]
    pub fn run(&self) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        for planned in &self.plan.hooks {
            let entry = self
                .resolved
                .iter()
                .find(|e| e.position == planned.position())
                .ok_or_else(|| {
                    Error::HookExecution(format!(
                        "Planned hook '{}' at repos[{}].hooks[{}] was not resolved",
                        planned.id, planned.source_index, planned.hook_index
                    ))
                })?;

            let span = tracing::info_span!(
                "hook_execution",
                hook_id = %planned.id,
                files = planned.files.len(),
            );
            let _guard = span.enter();

            let start = Instant::now();
            let outcome = match &planned.skipped {
                Some(reason) => {
                    tracing::debug!(%reason, "Skipping hook");
                    HookOutcome::Skipped(reason.clone())
                }
                None => self.execute(entry, planned)?,
            };
            let elapsed = start.elapsed();

            let failed = matches!(outcome, HookOutcome::Failed { .. });
            if failed {
                tracing::debug!(elapsed_ms = elapsed.as_millis(), "Hook failed");
            } else {
                tracing::debug!(
                    elapsed_ms = elapsed.as_millis(),
                    outcome = outcome.name(),
                    "Hook finished"
                );
            }

            summary.results.push(HookReport {
                id: planned.id.clone(),
                name: planned.name.clone(),
                outcome,
                verbose: entry.hook.verbose,
                elapsed,
            });

            if failed && self.fail_fast {
                tracing::debug!("Stopping after first failure (fail_fast)");
                break;
            }
        }

        Ok(summary)
    }

    /// Execute a single hook
    fn execute(&self, entry: &ResolvedEntry, planned: &PlannedHook) -> Result<HookOutcome> {
        let hook = &entry.hook;

        match hook.language.as_str() {
            "fail" => {
                let mut output = hook.entry.clone();
                for file in &planned.files {
                    output.push('\n');
                    output.push_str(&file.display().to_string());
                }
                Ok(HookOutcome::Failed { output })
            }
            "meta" => {
                let Some(meta) = &self.meta else {
                    return Ok(HookOutcome::Skipped(SkipReason::NotRunnable(
                        hook.language.clone(),
                    )));
                };
                let result = meta.run(&hook.id, &planned.files)?;
                Ok(if result.passed {
                    HookOutcome::Passed {
                        output: result.output,
                    }
                } else {
                    HookOutcome::Failed {
                        output: result.output,
                    }
                })
            }
            "system" | "script" => Ok(self.execute_command(entry, &planned.files)),
            other => Ok(HookOutcome::Skipped(SkipReason::NotRunnable(
                other.to_string(),
            ))),
        }
    }

    /// Run the hook's entry once per batch of files
    ///
    /// Problems with the entry itself (unparsable, program missing) are
    /// reported as a failed hook.
    fn execute_command(&self, entry: &ResolvedEntry, files: &[PathBuf]) -> HookOutcome {
        let hook = &entry.hook;

        let program = match self.command_line(entry) {
            Ok(parts) => parts,
            Err(message) => return HookOutcome::Failed { output: message },
        };

        let mut output = String::new();
        let mut passed = true;

        for batch in batches(hook, files, self.max_args) {
            let mut args = program[1..].to_vec();
            args.extend(batch.iter().map(|f| f.display().to_string()));

            tracing::debug!(program = %program[0], args = args.len(), "Executing command");

            let mut cmd = duct::cmd(&program[0], &args)
                .dir(self.repo_root)
                .stderr_to_stdout()
                .stdout_capture()
                .unchecked();
            for (key, value) in &self.env_vars {
                cmd = cmd.env(key, value);
            }

            match cmd.run() {
                Ok(result) => {
                    output.push_str(&String::from_utf8_lossy(&result.stdout));
                    if !result.status.success() {
                        passed = false;
                        if let Some(code) = result.status.code() {
                            output.push_str(&format!("\n(exit code {code})\n"));
                        }
                    }
                }
                Err(e) => {
                    passed = false;
                    output.push_str(&format!("Failed to run '{}': {e}\n", program[0]));
                }
            }
        }

        if passed {
            HookOutcome::Passed { output }
        } else {
            HookOutcome::Failed { output }
        }
    }

    /// Split the entry and locate its program
    ///
    /// `script` entries are resolved against the hook's repository; others
    /// must be found on `PATH` or be a path that exists. The returned program
    /// is the resolved path, so spawning does not depend on the process cwd.
    fn command_line(&self, entry: &ResolvedEntry) -> std::result::Result<Vec<String>, String> {
        let hook = &entry.hook;

        let mut parts = shell_words::split(&hook.entry)
            .map_err(|e| format!("Failed to parse entry '{}': {e}", hook.entry))?;
        if parts.is_empty() {
            return Err(format!("Hook '{}' has an empty entry", hook.id));
        }
        parts.extend(hook.args.iter().cloned());

        if hook.language == "script" {
            let script = entry.script_root(self.repo_root).join(&parts[0]);
            if !script.is_file() {
                return Err(format!("Script not found: {}", script.display()));
            }
            parts[0] = script.display().to_string();
        } else {
            // Relative programs resolve against the repository, not our cwd
            let found = which::which_in(&parts[0], std::env::var_os("PATH"), self.repo_root)
                .map_err(|_| format!("Executable `{}` not found", parts[0]))?;
            tracing::trace!(program = %found.display(), "Resolved executable");
            parts[0] = found.display().to_string();
        }

        Ok(parts)
    }
}

/// Partition `files` into invocations
///
/// No file names at all when `pass_filenames` is off; a single batch when
/// `require_serial` is set; otherwise batches of at most `max_args`.
fn batches<'f>(hook: &ResolvedHook, files: &'f [PathBuf], max_args: usize) -> Vec<&'f [PathBuf]> {
    if !hook.pass_filenames || files.is_empty() {
        return vec![&files[..0]];
    }
    if hook.require_serial {
        return vec![files];
    }
    files.chunks(max_args.max(1)).collect()
}

/// Builder for [`HookRunner`]
pub struct HookRunnerBuilder<'a> {
    plan: &'a ExecutionPlan,
    resolved: &'a [ResolvedEntry],
    repo_root: &'a Path,
    env_vars: IndexMap<String, String>,
    fail_fast: bool,
    max_args: usize,
    meta: Option<MetaContext<'a>>,
}

impl<'a> HookRunnerBuilder<'a> {
    /// Create a new builder with required parameters
    ///
    /// This is typically called via [`HookRunner::builder`].
    pub fn new(
        plan: &'a ExecutionPlan,
        resolved: &'a [ResolvedEntry],
        repo_root: &'a Path,
    ) -> Self {
        let mut env_vars = IndexMap::new();
        env_vars.insert("PRE_COMMIT".to_string(), "1".to_string());
        env_vars.insert("HOOKPIN_STAGE".to_string(), plan.stage.clone());

        Self {
            plan,
            resolved,
            repo_root,
            env_vars,
            fail_fast: false,
            max_args: DEFAULT_MAX_ARGS,
            meta: None,
        }
    }

    /// Stop at the first failing hook
    #[must_use]
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Add an environment variable for every hook
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env_vars.insert(key.into(), value.into());
        self
    }

    /// Limit the file names passed to one invocation
    #[must_use]
    pub fn max_args(mut self, max_args: usize) -> Self {
        self.max_args = max_args;
        self
    }

    /// Enable the built-in `meta` hooks
    ///
    /// Without this they are skipped as not runnable.
    #[must_use]
    pub fn meta(mut self, context: MetaContext<'a>) -> Self {
        self.meta = Some(context);
        self
    }

    /// Build the `HookRunner`
    #[must_use]
    pub fn build(self) -> HookRunner<'a> {
        HookRunner {
            plan: self.plan,
            resolved: self.resolved,
            repo_root: self.repo_root,
            env_vars: self.env_vars,
            fail_fast: self.fail_fast,
            max_args: self.max_args,
            meta: self.meta,
        }
    }
}
