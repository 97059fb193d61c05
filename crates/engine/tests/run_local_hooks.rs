//! End-to-end runs of local hooks against a scratch directory
#![cfg(unix)]
#![allow(clippy::unwrap_used, clippy::panic)]

use hookpin_config::Manifest;
use hookpin_engine::git::walk_files;
use hookpin_engine::meta::MetaContext;
use hookpin_engine::{
    ExecutionPlan, FileSet, HookCatalog, HookOutcome, HookRunner, RunSummary, SkipReason,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn workspace() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("pkg")).unwrap();
    fs::create_dir_all(root.join("docs")).unwrap();
    fs::write(root.join("pkg/a.py"), "print('a')\n").unwrap();
    fs::write(root.join("pkg/b.py"), "print('b')\n").unwrap();
    fs::write(root.join("docs/conf.py"), "project = 'x'\n").unwrap();
    fs::write(root.join("data.json"), "{}\n").unwrap();
    temp
}

struct Run {
    summary: RunSummary,
    plan: ExecutionPlan,
}

fn run_with(root: &Path, manifest: &str, fail_fast: bool, max_args: usize) -> Run {
    let manifest = Manifest::from_yaml_str(manifest).unwrap();
    let resolved = HookCatalog::new().resolve(&manifest).unwrap();
    let files = FileSet::new(root, walk_files(root).unwrap()).unwrap();
    let plan = ExecutionPlan::build(&manifest, &resolved, &files, "pre-commit").unwrap();

    let summary = HookRunner::builder(&plan, &resolved, root)
        .fail_fast(fail_fast || manifest.fail_fast)
        .max_args(max_args)
        .meta(MetaContext {
            manifest: &manifest,
            resolved: &resolved,
            files: &files,
        })
        .build()
        .run()
        .unwrap();

    Run { summary, plan }
}

fn run(root: &Path, manifest: &str) -> Run {
    run_with(root, manifest, false, 4096)
}

fn output(outcome: &HookOutcome) -> &str {
    match outcome {
        HookOutcome::Passed { output } | HookOutcome::Failed { output } => output,
        HookOutcome::Skipped(reason) => panic!("hook was skipped: {reason}"),
    }
}

#[test]
fn test_passing_and_failing_hooks() {
    let temp = workspace();
    let result = run(
        temp.path(),
        r#"
repos:
  - repo: local
    hooks:
      - id: cat-python
        name: cat python
        entry: cat
        language: system
        types: [python]
        exclude: ^docs/
      - id: reject-json
        name: reject json
        entry: "sh -c 'echo bad: $*; exit 1' --"
        language: system
        types: [json]
"#,
    );

    let results = &result.summary.results;
    assert_eq!(results.len(), 2);

    assert!(matches!(results[0].outcome, HookOutcome::Passed { .. }));
    let cat = output(&results[0].outcome);
    assert!(cat.contains("print('a')"));
    assert!(cat.contains("print('b')"));
    assert!(!cat.contains("project"));

    assert!(matches!(results[1].outcome, HookOutcome::Failed { .. }));
    assert!(output(&results[1].outcome).contains("bad: data.json"));
    assert!(output(&results[1].outcome).contains("(exit code 1)"));
    assert!(!result.summary.is_success());
}

#[test]
fn test_fail_fast_stops_after_first_failure() {
    let temp = workspace();
    let manifest = r#"
repos:
  - repo: local
    hooks:
      - id: always-fails
        name: always fails
        entry: nope
        language: fail
        files: \.json$
      - id: marker
        name: marker
        entry: "touch ran.marker"
        language: system
        pass_filenames: false
        always_run: true
"#;

    let result = run_with(temp.path(), manifest, true, 4096);
    assert_eq!(result.summary.results.len(), 1);
    assert_eq!(output(&result.summary.results[0].outcome), "nope\ndata.json");
    assert!(!temp.path().join("ran.marker").exists());

    let result = run_with(temp.path(), manifest, false, 4096);
    assert_eq!(result.summary.results.len(), 2);
    assert!(temp.path().join("ran.marker").exists());
}

#[test]
fn test_manifest_fail_fast() {
    let temp = workspace();
    let result = run(
        temp.path(),
        r"
fail_fast: true
repos:
  - repo: local
    hooks:
      - id: first
        name: first
        entry: broken
        language: fail
      - id: second
        name: second
        entry: 'true'
        language: system
",
    );
    assert_eq!(result.summary.results.len(), 1);
    assert_eq!(result.plan.hooks.len(), 2);
}

#[test]
fn test_pass_filenames_false_runs_once_without_files() {
    let temp = workspace();
    let result = run_with(
        temp.path(),
        r#"
repos:
  - repo: local
    hooks:
      - id: count
        name: count
        entry: "sh -c 'echo args=$#' --"
        language: system
        pass_filenames: false
"#,
        false,
        1,
    );
    let out = output(&result.summary.results[0].outcome);
    assert_eq!(out.trim(), "args=0");
}

#[test]
fn test_files_are_batched_by_max_args() {
    let temp = workspace();
    let result = run_with(
        temp.path(),
        r#"
repos:
  - repo: local
    hooks:
      - id: batches
        name: batches
        entry: "sh -c 'echo batch=$#' --"
        language: system
        types: [python]
      - id: serial
        name: serial
        entry: "sh -c 'echo batch=$#' --"
        language: system
        types: [python]
        require_serial: true
"#,
        false,
        2,
    );
    let batched = output(&result.summary.results[0].outcome);
    assert_eq!(batched.lines().collect::<Vec<_>>(), vec!["batch=2", "batch=1"]);

    let serial = output(&result.summary.results[1].outcome);
    assert_eq!(serial.trim(), "batch=3");
}

#[test]
fn test_script_hook_runs_from_repository() {
    use std::os::unix::fs::PermissionsExt;

    let temp = workspace();
    let script = temp.path().join("check.sh");
    fs::write(&script, "#!/bin/sh\necho \"script saw $#\"\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let result = run(
        temp.path(),
        r"
repos:
  - repo: local
    hooks:
      - id: script
        name: script
        entry: check.sh
        language: script
        types: [json]
",
    );
    assert_eq!(
        output(&result.summary.results[0].outcome).trim(),
        "script saw 1"
    );
}

#[test]
fn test_relative_system_entry_runs_from_repository() {
    use std::os::unix::fs::PermissionsExt;

    let temp = workspace();
    fs::create_dir(temp.path().join("scripts")).unwrap();
    let script = temp.path().join("scripts/count.sh");
    fs::write(&script, "#!/bin/sh\necho \"counted $#\"\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    // The test process runs from the crate directory, not from the workspace
    assert_ne!(
        std::env::current_dir().unwrap().canonicalize().unwrap(),
        temp.path().canonicalize().unwrap()
    );

    let result = run(
        temp.path(),
        r"
repos:
  - repo: local
    hooks:
      - id: count
        name: count
        entry: ./scripts/count.sh
        language: system
        types: [python]
",
    );
    let outcome = &result.summary.results[0].outcome;
    assert!(matches!(outcome, HookOutcome::Passed { .. }), "{outcome:?}");
    assert_eq!(output(outcome).trim(), "counted 3");
}

#[test]
fn test_missing_executable_fails_hook() {
    let temp = workspace();
    let result = run(
        temp.path(),
        r"
repos:
  - repo: local
    hooks:
      - id: ghost
        name: ghost
        entry: hookpin-test-no-such-program --flag
        language: system
",
    );
    let outcome = &result.summary.results[0].outcome;
    assert!(matches!(outcome, HookOutcome::Failed { .. }));
    assert!(output(outcome).contains("not found"));
}

#[test]
fn test_skipped_hooks_are_reported() {
    let temp = workspace();
    let result = run(
        temp.path(),
        r"
repos:
  - repo: https://github.com/psf/black
    rev: 23.3.0
    hooks:
      - id: black
  - repo: local
    hooks:
      - id: rustfmt
        name: rustfmt
        entry: rustfmt
        language: system
        types: [rust]
      - id: mypy
        name: mypy
        entry: mypy
        language: python
  - repo: meta
    hooks:
      - id: identity
",
    );

    let outcomes: Vec<_> = result
        .summary
        .results
        .iter()
        .map(|r| r.outcome.clone())
        .collect();
    assert_eq!(
        outcomes,
        vec![
            HookOutcome::Skipped(SkipReason::Unresolved),
            HookOutcome::Skipped(SkipReason::NoFiles),
            HookOutcome::Skipped(SkipReason::NotRunnable("python".to_string())),
            HookOutcome::Passed {
                output: "data.json\ndocs/conf.py\npkg/a.py\npkg/b.py".to_string()
            },
        ]
    );
    assert!(result.summary.is_success());
}
