//! Integration tests for `condep pack-manifest`.

use condep_cli::test_utils::{TestProject, TestProjectBuilder};
use predicates::prelude::*;
use serde_json::{Value, json};

use crate::condep;

const MANIFEST: &str = r#"{
  "name": "bindings",
  "version": "1.0.0",
  "dependencies": {"native": "condition:useNative ? 2.1.0 :", "left-pad": "^1.3.0"},
  "optionalDependencies": {"fsevents": "condition:useNative ? 2.3.0 : 1.2.0"},
  "conditions": {"useNative": [{"main": "native.js"}, null]}
}"#;

fn project() -> TestProject {
    TestProjectBuilder::new()
        .unwrap()
        .with_rc("conditions:\n  useNative: {}\n")
        .with_manifest(MANIFEST)
        .build()
        .unwrap()
}

#[test]
fn test_pack_manifest_prints_resolved_manifest() {
    let project = project();

    let output = condep(&project).args(["pack-manifest"]).env("useNative", "true").output().unwrap();
    assert!(output.status.success());

    let printed: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        printed,
        json!({
            "name": "bindings",
            "version": "1.0.0",
            "dependencies": {"native": "2.1.0", "left-pad": "^1.3.0"},
            "optionalDependencies": {"fsevents": "2.3.0"},
            "main": "native.js"
        })
    );
    assert_eq!(project.read("package.json").unwrap(), MANIFEST);
}

#[test]
fn test_pack_manifest_default_and_write() {
    let project = project();

    condep(&project).args(["pack-manifest", "--write"]).assert().success().stdout(predicate::str::is_empty());

    let written = project.manifest("").unwrap();
    assert!(written["dependencies"].get("native").is_none());
    assert_eq!(written["optionalDependencies"]["fsevents"], "1.2.0");
    assert!(written.get("conditions").is_none());
    assert!(written.get("main").is_none());
}

#[test]
fn test_pack_manifest_missing_manifest() {
    let project = TestProjectBuilder::new().unwrap().build().unwrap();

    condep(&project)
        .args(["pack-manifest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("package.json not found"));
}
