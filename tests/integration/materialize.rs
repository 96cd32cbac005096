//! Integration tests for `condep materialize`.

use condep_cli::test_utils::{TestProject, TestProjectBuilder};
use predicates::prelude::*;

use crate::condep;

fn project() -> TestProject {
    TestProjectBuilder::new()
        .unwrap()
        .with_rc("conditions:\n  useNative:\n    default: true\n")
        .with_manifest(
            r#"{
  "name": "root",
  "workspaces": ["packages/*"],
  "dependencies": {"bindings": "condition:useNative ? 2.1.0 : 1.0.0"}
}"#,
        )
        .with_workspace(
            "packages/app",
            r#"{"name": "app", "dependencies": {"bindings": "condition:useNative ? (workspace:*) :"}}"#,
        )
        .build()
        .unwrap()
}

#[test]
fn test_materialize_uses_declared_default() {
    let project = project();

    condep(&project)
        .args(["materialize", "useNative"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Materialized"));

    assert_eq!(project.manifest("").unwrap()["dependencies"]["bindings"], "2.1.0");
    assert_eq!(project.manifest("packages/app").unwrap()["dependencies"]["bindings"], "workspace:*");
}

#[test]
fn test_materialize_reads_environment() {
    let project = project();

    condep(&project).args(["materialize", "useNative"]).env("useNative", "0").assert().success();

    assert_eq!(project.manifest("").unwrap()["dependencies"]["bindings"], "1.0.0");
    let app = project.manifest("packages/app").unwrap();
    assert!(app["dependencies"].get("bindings").is_none());
}

#[test]
fn test_materialize_forced_value_wins() {
    let project = project();

    condep(&project)
        .args(["materialize", "useNative", "--false"])
        .env("useNative", "true")
        .assert()
        .success();

    assert_eq!(project.manifest("").unwrap()["dependencies"]["bindings"], "1.0.0");
}

#[test]
fn test_materialize_conflicting_flags() {
    let project = project();
    let before = project.read("package.json").unwrap();

    condep(&project)
        .args(["materialize", "useNative", "--true", "--false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mutually exclusive"));

    assert_eq!(project.read("package.json").unwrap(), before);
}

#[test]
fn test_materialize_unknown_condition() {
    let project = project();

    condep(&project)
        .args(["materialize", "useNativ"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown condition: useNativ"))
        .stderr(predicate::str::contains("useNative"));
}

#[test]
fn test_materialize_dry_run_writes_nothing() {
    let project = project();
    let before = project.read("packages/app/package.json").unwrap();

    condep(&project)
        .args(["materialize", "useNative", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Would materialize"));

    assert_eq!(project.read("packages/app/package.json").unwrap(), before);
}

#[test]
fn test_materialize_from_nested_directory_with_cwd_flag() {
    let project = project();
    let nested = project.path().join("packages/app");

    condep(&project)
        .current_dir(std::env::temp_dir())
        .arg("--cwd")
        .arg(&nested)
        .args(["materialize", "useNative", "--true", "-q"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    // only the workspace owning the directory is transformed
    assert_eq!(project.manifest("packages/app").unwrap()["dependencies"]["bindings"], "workspace:*");
    assert_eq!(
        project.manifest("").unwrap()["dependencies"]["bindings"],
        "condition:useNative ? 2.1.0 : 1.0.0"
    );
}
