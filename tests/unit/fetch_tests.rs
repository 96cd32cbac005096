//! Generated packages written through the zip cache.

use std::collections::BTreeMap;
use std::io::Read;
use std::sync::Mutex;

use condep_cli::cache::FetchReport;
use condep_cli::config::{BranchStrategy, ProjectConfig};
use condep_cli::core::CondepError;
use condep_cli::fetcher::{FetchOptions, FetcherRegistry};
use condep_cli::models::{Descriptor, Ident, Locator};
use condep_cli::project::resolve_descriptor;
use condep_cli::resolver::ResolverRegistry;
use condep_cli::test_utils::{TestProject, TestProjectBuilder};

#[derive(Default)]
struct RecordingReport {
    events: Mutex<Vec<String>>,
}

impl RecordingReport {
    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl FetchReport for RecordingReport {
    fn cache_hit(&self, locator: &Locator) {
        self.events.lock().unwrap().push(format!("hit {locator}"));
    }

    fn cache_miss(&self, locator: &Locator, _message: &str) {
        self.events.lock().unwrap().push(format!("miss {locator}"));
    }
}

fn project(strategy: &str) -> (TestProject, ProjectConfig) {
    let project = TestProjectBuilder::new()
        .unwrap()
        .with_rc(format!("conditionBranches: {strategy}\nconditions:\n  useNative:\n    default: true\n"))
        .with_manifest("{}")
        .build()
        .unwrap();
    let config = project.config().unwrap();
    (project, config)
}

fn candidate(config: &ProjectConfig, range: &str) -> Locator {
    let registry = ResolverRegistry::with_defaults();
    let desc = Descriptor::new(Ident::new(Some("acme"), "bindings"), range);
    resolve_descriptor(&registry, config, &desc).unwrap().unwrap().locator
}

fn read_entry(path: &std::path::Path, name: &str) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut entry = archive.by_name(name).unwrap();
    let mut out = String::new();
    entry.read_to_string(&mut out).unwrap();
    out
}

#[tokio::test]
async fn test_fetch_generates_then_hits() {
    let (project, config) = project("qualified");
    assert_eq!(config.condition_branches, BranchStrategy::Qualified);
    let locator = candidate(&config, "condition:useNative ? 2.1.0 : 1.0.0(esm:default|bind)");

    let cache = project.cache();
    let checksums = BTreeMap::new();
    let report = RecordingReport::default();
    let opts = FetchOptions {
        config: &config,
        cache: &cache,
        checksums: &checksums,
        report: &report,
        skip_integrity_check: false,
    };
    let registry = FetcherRegistry::with_defaults();

    let first = registry.fetch(&locator, &opts).await.unwrap();
    let second = registry.fetch(&locator, &opts).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first.prefix_path, "node_modules/@acme/bindings");
    assert_eq!(report.events(), vec![format!("miss {locator}"), format!("hit {locator}")]);

    let manifest: serde_json::Value =
        serde_json::from_str(&read_entry(&first.archive_path, "node_modules/@acme/bindings/package.json"))
            .unwrap();
    assert_eq!(
        manifest["dependencies"]["@acme/bindings-useNative-true"],
        "npm:@acme/bindings@2.1.0"
    );
    assert_eq!(manifest["exports"]["module"], "./index.mjs");

    let cjs = read_entry(&first.archive_path, "node_modules/@acme/bindings/index.js");
    assert!(cjs.contains("process.env.useNative") || cjs.contains("process.env[\"useNative\"]"));
    let esm = read_entry(&first.archive_path, "node_modules/@acme/bindings/index.mjs");
    assert!(esm.contains("export const { bind } = selected;"));
    assert!(esm.contains("export default selected.default;"));
}

#[tokio::test]
async fn test_fetch_is_byte_identical_across_caches() {
    let (a, config) = project("qualified");
    let (b, _) = project("qualified");
    let locator = candidate(&config, "condition:useNative ? 2.1.0 :");

    let checksums = BTreeMap::new();
    let report = RecordingReport::default();
    let registry = FetcherRegistry::with_defaults();
    let mut results = Vec::new();
    for project in [&a, &b] {
        let cache = project.cache();
        let opts = FetchOptions {
            config: &config,
            cache: &cache,
            checksums: &checksums,
            report: &report,
            skip_integrity_check: false,
        };
        results.push(registry.fetch(&locator, &opts).await.unwrap().checksum);
    }
    assert_eq!(results[0], results[1]);
    assert!(results[0].starts_with("sha256:"));
}

#[tokio::test]
async fn test_checksum_mismatch() {
    let (project, config) = project("proxy");
    let locator = candidate(&config, "condition:useNative ? 2.1.0 : 1.0.0");

    let cache = project.cache();
    let mut checksums = BTreeMap::new();
    checksums.insert(locator.clone(), "sha256:0000".to_string());
    let report = RecordingReport::default();
    let registry = FetcherRegistry::with_defaults();

    let strict = FetchOptions {
        config: &config,
        cache: &cache,
        checksums: &checksums,
        report: &report,
        skip_integrity_check: false,
    };
    let err = registry.fetch(&locator, &strict).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<CondepError>(),
        Some(CondepError::ChecksumMismatch { .. })
    ));
    assert!(!cache.archive_path(&locator).exists());

    let lenient = FetchOptions {
        skip_integrity_check: true,
        ..strict
    };
    assert!(registry.fetch(&locator, &lenient).await.is_ok());
}

#[tokio::test]
async fn test_fetch_proxy_branch() {
    let (project, config) = project("proxy");
    let registry = ResolverRegistry::with_defaults();
    let desc = Descriptor::new(Ident::new(Some("acme"), "bindings"), "condition:useNative ? 2.1.0 :");
    let resolved = resolve_descriptor(&registry, &config, &desc).unwrap().unwrap();
    let proxy = resolve_descriptor(&registry, &config, &resolved.dependencies[0]).unwrap().unwrap();

    let cache = project.cache();
    let checksums = BTreeMap::new();
    let report = RecordingReport::default();
    let opts = FetchOptions {
        config: &config,
        cache: &cache,
        checksums: &checksums,
        report: &report,
        skip_integrity_check: false,
    };
    let result = FetcherRegistry::with_defaults().fetch(&proxy.locator, &opts).await.unwrap();
    assert_eq!(result.prefix_path, "node_modules/@acme/bindings-useNative-true");

    let index = read_entry(
        &result.archive_path,
        "node_modules/@acme/bindings-useNative-true/index.js",
    );
    assert_eq!(index.trim(), r#"module.exports = require("@acme/bindings");"#);
}

#[tokio::test]
async fn test_fetch_unknown_reference() {
    let (project, config) = project("qualified");
    let cache = project.cache();
    let checksums = BTreeMap::new();
    let report = RecordingReport::default();
    let opts = FetchOptions {
        config: &config,
        cache: &cache,
        checksums: &checksums,
        report: &report,
        skip_integrity_check: false,
    };

    let locator = Locator::parse("pkg@npm:1.0.0").unwrap();
    assert!(FetcherRegistry::with_defaults().fetch(&locator, &opts).await.is_err());
}

#[tokio::test]
async fn test_branch_strategy_switch_misses_the_cache() {
    let (project, qualified) = project("qualified");
    let proxied = ProjectConfig {
        condition_branches: BranchStrategy::Proxy,
        ..qualified.clone()
    };
    let range = "condition:useNative ? 2.1.0 : 1.0.0";
    let before = candidate(&qualified, range);
    let after = candidate(&proxied, range);
    assert_ne!(before, after);

    let cache = project.cache();
    let checksums = BTreeMap::new();
    let report = RecordingReport::default();
    let registry = FetcherRegistry::with_defaults();
    let mut archives = Vec::new();
    for (config, locator) in [(&qualified, &before), (&proxied, &after)] {
        let opts = FetchOptions {
            config,
            cache: &cache,
            checksums: &checksums,
            report: &report,
            skip_integrity_check: false,
        };
        archives.push(registry.fetch(locator, &opts).await.unwrap());
    }
    assert_ne!(archives[0].archive_path, archives[1].archive_path);
    assert_eq!(report.events(), vec![format!("miss {before}"), format!("miss {after}")]);

    let manifest: serde_json::Value = serde_json::from_str(&read_entry(
        &archives[1].archive_path,
        "node_modules/@acme/bindings/package.json",
    ))
    .unwrap();
    assert_eq!(
        manifest["dependencies"]["@acme/bindings-useNative-true"],
        "condition_proxy_internal:@acme/bindings:2.1.0"
    );
}
