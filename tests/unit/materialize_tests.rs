//! Materialize and pack transforms over whole workspace trees.

use std::sync::Arc;

use condep_cli::config::env_lookup;
use condep_cli::materialize::{materialize, prepare_for_pack, resolve_value};
use condep_cli::project::Project;
use condep_cli::resolver::ResolverRegistry;
use condep_cli::test_utils::{TestProject, TestProjectBuilder, init_test_logging};
use condep_cli::workspace::Workspace;
use serde_json::json;
use serial_test::serial;

const RC: &str = "conditions:\n  useNative:\n    default: false\n  legacy: {}\n";

fn tree() -> TestProject {
    TestProjectBuilder::new()
        .unwrap()
        .with_rc(RC)
        .with_manifest(
            r#"{
  "name": "root",
  "workspaces": ["packages/*"],
  "dependencies": {
    "bindings": "condition:useNative ? 2.1.0 : (workspace:*)",
    "left-pad": "^1.3.0"
  }
}"#,
        )
        .with_workspace(
            "packages/app",
            r#"{
  "name": "app",
  "workspaces": ["nested/*"],
  "devDependencies": {"shim": "condition:useNative ? : 1.0.0"},
  "conditions": {"useNative": [{"main": "native.js"}, {"main": "fallback.js"}]}
}"#,
        )
        .with_workspace(
            "packages/app/nested/lib",
            r#"{
  "name": "lib",
  "peerDependencies": {
    "bindings": "condition:useNative ? 2.1.0 :",
    "old": "condition:legacy ? 1.0.0 : 2.0.0"
  }
}"#,
        )
        .build()
        .unwrap()
}

#[test]
fn test_materialize_whole_tree() {
    init_test_logging(None);
    let project = tree();
    let mut root = Workspace::load(project.path()).unwrap();

    let summary = materialize(&mut root, "useNative", false).unwrap();
    assert_eq!(summary.workspaces, 3);
    assert_eq!(summary.replaced, 2);
    assert_eq!(summary.removed, 1);
    assert_eq!(summary.properties_applied, 1);
    root.persist().unwrap();

    let manifest = project.manifest("").unwrap();
    assert_eq!(manifest["dependencies"]["bindings"], "workspace:*");
    assert_eq!(manifest["dependencies"]["left-pad"], "^1.3.0");

    let app = project.manifest("packages/app").unwrap();
    assert_eq!(app["devDependencies"]["shim"], "1.0.0");
    assert_eq!(app["main"], "fallback.js");
    assert!(app.get("conditions").is_none());

    let lib = project.manifest("packages/app/nested/lib").unwrap();
    assert!(lib["peerDependencies"].get("bindings").is_none());
    assert_eq!(lib["peerDependencies"]["old"], "condition:legacy ? 1.0.0 : 2.0.0");
}

#[test]
fn test_materialize_twice_is_a_no_op() {
    let project = tree();
    let mut root = Workspace::load(project.path()).unwrap();
    materialize(&mut root, "useNative", true).unwrap();
    let after_first = root.clone();

    let second = materialize(&mut root, "useNative", true).unwrap();
    assert!(!second.changed());
    assert_eq!(root, after_first);

    for workspace in root.iter() {
        let text = serde_json::to_string(&workspace.manifest).unwrap();
        assert!(!text.contains("condition:useNative"));
    }
}

#[tokio::test]
async fn test_re_resolution_after_materialize() {
    let project = tree();
    let config = project.config().unwrap();
    let mut loaded = Project::load(project.path(), config).unwrap();
    let registry = Arc::new(ResolverRegistry::with_defaults());

    let before = loaded.resolve_everything(Arc::clone(&registry)).await.unwrap();
    assert_eq!(before.packages.len(), 4);

    materialize(&mut loaded.root, "useNative", true).unwrap();
    let after = loaded.resolve_everything(registry).await.unwrap();
    // only the legacy condition is left
    assert_eq!(after.packages.len(), 1);
}

#[test]
#[serial]
fn test_resolve_value_reads_environment() {
    let project = tree();
    let config = project.config().unwrap();

    unsafe {
        std::env::remove_var("useNative");
    }
    assert!(!resolve_value(&config, "useNative", None, env_lookup).unwrap());

    unsafe {
        std::env::set_var("useNative", "1");
    }
    assert!(resolve_value(&config, "useNative", None, env_lookup).unwrap());
    assert!(!resolve_value(&config, "useNative", Some(false), env_lookup).unwrap());

    unsafe {
        std::env::remove_var("useNative");
    }
    assert!(resolve_value(&config, "missing", Some(true), env_lookup).is_err());
}

#[test]
fn test_pack_manifest_resolves_everything() {
    let project = tree();
    let config = project.config().unwrap();
    let serde_json::Value::Object(mut manifest) = project.manifest("packages/app/nested/lib").unwrap() else {
        panic!("manifest is not an object");
    };
    manifest.insert(
        "optionalDependencies".to_string(),
        json!({"fsevents": "condition:legacy ? 2.3.0 :"}),
    );

    let lookup = |name: &str| (name == "legacy").then(|| "true".to_string());
    let summary = prepare_for_pack(&mut manifest, &config, lookup).unwrap();
    assert_eq!(summary.replaced, 2);
    assert_eq!(summary.removed, 1);
    assert_eq!(
        serde_json::Value::Object(manifest),
        json!({
            "name": "lib",
            "peerDependencies": {"old": "1.0.0"},
            "optionalDependencies": {"fsevents": "2.3.0"}
        })
    );
}

#[test]
fn test_persist_writes_only_changed_workspaces() {
    let project = tree();
    let root_before = project.read("package.json").unwrap();
    let app_before = project.read("packages/app/package.json").unwrap();
    let mut root = Workspace::load(project.path()).unwrap();

    let summary = materialize(&mut root, "legacy", true).unwrap();
    assert_eq!(summary.workspaces, 3);
    assert_eq!(summary.replaced, 1);
    assert_eq!(root.persist().unwrap(), 1);

    assert_eq!(project.read("package.json").unwrap(), root_before);
    assert_eq!(project.read("packages/app/package.json").unwrap(), app_before);
    let lib = project.manifest("packages/app/nested/lib").unwrap();
    assert_eq!(lib["peerDependencies"]["old"], "1.0.0");
}
