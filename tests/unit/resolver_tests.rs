//! Resolver state machine across both branch strategies.

use condep_cli::config::{BranchStrategy, ConditionConfig, ProjectConfig};
use condep_cli::constants::CONDITION_VERSION_PREFIX;
use condep_cli::models::{Descriptor, Ident, Locator, PackageOrigin};
use condep_cli::project::resolve_descriptor;
use condep_cli::resolver::{ResolveOptions, ResolverRegistry};
use serial_test::serial;

fn config(strategy: BranchStrategy) -> ProjectConfig {
    ProjectConfig {
        condition_branches: strategy,
        ..ProjectConfig::default()
    }
    .with_condition("useNative", ConditionConfig::env(true))
}

fn descriptor(range: &str) -> Descriptor {
    Descriptor::new(Ident::new(Some("acme"), "bindings"), range)
}

#[test]
fn test_qualified_strategy_walkthrough() {
    let registry = ResolverRegistry::with_defaults();
    let config = config(BranchStrategy::Qualified);
    let desc = descriptor("condition:useNative ? 2.1.0 : (workspace:*)(peer:react)");

    let resolved = resolve_descriptor(&registry, &config, &desc).unwrap().unwrap();
    let deps: Vec<String> = resolved.dependencies.iter().map(ToString::to_string).collect();
    assert_eq!(
        deps,
        vec![
            "@acme/bindings-useNative-true@npm:@acme/bindings@2.1.0",
            "@acme/bindings-useNative-false@npm:@acme/bindings@workspace:*",
        ]
    );

    let package = resolved.package;
    assert!(package.version.starts_with(CONDITION_VERSION_PREFIX));
    assert!(matches!(package.origin, PackageOrigin::Condition { .. }));
    assert_eq!(package.dependencies.len(), 2);
    assert_eq!(package.peer_dependencies.len(), 1);
    assert!(package.peer_dependencies.contains_key(&Ident::new(None, "react")));
}

#[test]
fn test_proxy_strategy_routes_branches_to_proxy_resolver() {
    let registry = ResolverRegistry::with_defaults();
    let config = config(BranchStrategy::Proxy);
    let desc = descriptor("condition:useNative ? 2.1.0 :");

    let resolved = resolve_descriptor(&registry, &config, &desc).unwrap().unwrap();
    assert_eq!(resolved.dependencies.len(), 1);

    let branch = &resolved.dependencies[0];
    assert_eq!(branch.range, "condition_proxy_internal:@acme/bindings:2.1.0");
    assert_eq!(registry.for_descriptor(branch).map(|r| r.name()), Some("condition-proxy"));

    let proxy = resolve_descriptor(&registry, &config, branch).unwrap().unwrap();
    assert_eq!(proxy.dependencies, vec![Descriptor::new(Ident::new(Some("acme"), "bindings"), "2.1.0")]);
    assert!(matches!(proxy.package.origin, PackageOrigin::ConditionProxy { .. }));
}

#[test]
fn test_get_satisfying_keeps_only_the_candidate() {
    let registry = ResolverRegistry::with_defaults();
    let config = config(BranchStrategy::Qualified);
    let opts = ResolveOptions::new(&config);
    let desc = descriptor("condition:useNative ? 1.0.0 : 2.0.0");
    let resolver = registry.require_descriptor(&desc).unwrap();

    let candidate = resolver.candidates(&desc, opts).unwrap().remove(0);
    let stale = Locator::new(desc.ident.clone(), "condition:useNative?1.0.0:2.0.0#000000");
    let other = Locator::new(desc.ident.clone(), "npm:1.0.0");

    let satisfying = resolver.get_satisfying(&desc, &[stale, candidate.clone(), other], opts).unwrap();
    assert_eq!(satisfying.locators, vec![candidate.clone()]);
    assert!(satisfying.sorted);

    assert!(!resolver.should_persist_resolution(&candidate));
    assert_eq!(resolver.bind_descriptor(&desc, &candidate), desc);
}

#[test]
#[serial]
fn test_resolution_ignores_environment() {
    let registry = ResolverRegistry::with_defaults();
    let config = config(BranchStrategy::Qualified);
    let desc = descriptor("condition:useNative ? 1.0.0 : 2.0.0");

    unsafe {
        std::env::remove_var("useNative");
    }
    let unset = resolve_descriptor(&registry, &config, &desc).unwrap().unwrap();

    unsafe {
        std::env::set_var("useNative", "false");
    }
    let set = resolve_descriptor(&registry, &config, &desc).unwrap().unwrap();

    unsafe {
        std::env::remove_var("useNative");
    }

    assert_eq!(unset.locator, set.locator);
    assert_eq!(unset.dependencies, set.dependencies);
    assert_eq!(unset.package, set.package);
}

#[test]
fn test_default_value_changes_the_digest() {
    let registry = ResolverRegistry::with_defaults();
    let desc = descriptor("condition:useNative ? 1.0.0 : 2.0.0");

    let on = config(BranchStrategy::Qualified);
    let off = ProjectConfig::default().with_condition("useNative", ConditionConfig::env(false));

    let a = resolve_descriptor(&registry, &on, &desc).unwrap().unwrap();
    let b = resolve_descriptor(&registry, &off, &desc).unwrap().unwrap();
    assert_ne!(a.locator, b.locator);
    assert_eq!(a.dependencies, b.dependencies);
}

#[test]
fn test_unsupported_descriptor_is_left_alone() {
    let registry = ResolverRegistry::with_defaults();
    let config = config(BranchStrategy::Qualified);
    assert!(resolve_descriptor(&registry, &config, &descriptor("^1.0.0")).unwrap().is_none());
}
