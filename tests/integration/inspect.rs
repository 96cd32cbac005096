//! Integration tests for `condep resolve` and `condep fetch`.

use condep_cli::test_utils::{TestProject, TestProjectBuilder};
use predicates::prelude::*;
use serde_json::Value;

use crate::condep;

fn project(strategy: &str) -> TestProject {
    TestProjectBuilder::new()
        .unwrap()
        .with_rc(format!("conditionBranches: {strategy}\nconditions:\n  useNative:\n    default: true\n"))
        .with_manifest("{}")
        .build()
        .unwrap()
}

fn resolve_json(project: &TestProject, descriptor: &str) -> Value {
    let output = condep(project).args(["resolve", descriptor, "--json"]).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_resolve_json() {
    let project = project("qualified");
    let out = resolve_json(&project, "bindings@condition:useNative ? 2.1.0 : 1.0.0");

    assert_eq!(
        out["dependencies"],
        serde_json::json!([
            "bindings-useNative-true@npm:bindings@2.1.0",
            "bindings-useNative-false@npm:bindings@1.0.0"
        ])
    );
    let locator = out["locator"].as_str().unwrap();
    assert!(locator.starts_with("bindings@condition:useNative?2.1.0:1.0.0#"));
    assert!(out["package"]["version"].as_str().unwrap().starts_with("0.0.0-condition-"));
    assert_eq!(out["package"]["origin"]["kind"], "condition");
}

#[test]
fn test_resolve_is_independent_of_environment() {
    let project = project("qualified");
    let descriptor = "bindings@condition:useNative ? 2.1.0 : 1.0.0";

    let a = resolve_json(&project, descriptor);
    let output = condep(&project)
        .args(["resolve", descriptor, "--json"])
        .env("useNative", "false")
        .output()
        .unwrap();
    let b: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_resolve_text_and_errors() {
    let project = project("proxy");

    condep(&project)
        .args(["resolve", "bindings@condition:useNative ? 2.1.0 :"])
        .assert()
        .success()
        .stdout(predicate::str::contains("condition_proxy_internal:bindings:2.1.0"));

    condep(&project)
        .args(["resolve", "bindings@condition:useNative ? 2.1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Expected ':'"));

    condep(&project)
        .args(["resolve", "bindings@^1.0.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a condition or proxy range"));
}

#[test]
fn test_fetch_generates_archive_and_checks_integrity() {
    let project = project("qualified");
    let out = resolve_json(&project, "bindings@condition:useNative ? 2.1.0 : 1.0.0");
    let locator = out["locator"].as_str().unwrap().to_string();

    let output = condep(&project).args(["fetch", &locator, "-q"]).output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let archive = String::from_utf8(output.stdout).unwrap();
    let archive = std::path::Path::new(archive.trim());
    assert!(archive.starts_with(&project.cache_dir));
    assert!(archive.is_file());

    condep(&project)
        .args(["fetch", &locator, "--checksum", "sha256:0000"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Checksum mismatch"));

    condep(&project)
        .args(["fetch", &locator, "--checksum", "sha256:0000", "--skip-integrity-check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("checksum:"));
}

#[test]
fn test_fetch_uses_configured_cache_folder() {
    let project = TestProjectBuilder::new()
        .unwrap()
        .with_rc("cacheFolder: .condep-cache\nconditions:\n  useNative: {}\n")
        .with_manifest("{}")
        .build()
        .unwrap();
    let out = resolve_json(&project, "bindings@condition:useNative ? 2.1.0 :");
    let locator = out["locator"].as_str().unwrap();

    condep(&project).args(["fetch", locator]).assert().success();
    let entries = std::fs::read_dir(project.path().join(".condep-cache")).unwrap().count();
    assert!(entries > 0);
}
