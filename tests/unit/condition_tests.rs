//! Condition grammar, canonical form and digest properties.

use condep_cli::condition::{ConditionExpression, digest, parse, serialize};
use condep_cli::config::ProjectConfig;
use condep_cli::core::CondepError;
use condep_cli::proxy;

#[test]
fn test_serialize_is_idempotent_on_canonical_inputs() {
    let inputs = [
        "condition: foo ? 1.0.0 : 2.0.0",
        "condition:foo?:2.0.0",
        "condition:foo?1.0.0:",
        "condition: foo ? (workspace:*) : ^1.2.3",
        "condition:foo?1.0.0:2.0.0(esm:default|named)(peer:react|react-dom)",
        "condition: a ? (condition: b ? 1.0.0 : 2.0.0) : 3.0.0",
    ];

    for input in inputs {
        let once = serialize(&parse(input).unwrap());
        let twice = serialize(&parse(&once).unwrap());
        assert_eq!(once, twice, "canonical form of {input} is not stable");
    }
}

#[test]
fn test_parse_examples() {
    let expr = parse("condition: foo ? 1.0.0 : 2.0.0").unwrap();
    assert_eq!(expr, ConditionExpression::new("foo", Some("1.0.0"), Some("2.0.0")));
    assert_eq!(expr.hash, None);

    assert!(parse("condition: foo ? : 2.0.0").unwrap().consequent.is_none());
    assert!(parse("condition: foo ? 1.0.0 :").unwrap().alternate.is_none());

    for input in ["condition: foo ? (workspace:*) : 1.0.0", "condition: foo ? ( workspace:* ) : 1.0.0"] {
        let expr = parse(input).unwrap();
        assert_eq!(expr.consequent.as_ref().map(|b| b.as_str()), Some("workspace:*"));
    }

    let nested = parse("condition: foo ? ( condition:bar ? 1.0.0 : 2.0.0 ) : 3.0.0").unwrap();
    assert_eq!(
        nested.consequent.as_ref().map(|b| b.as_str()),
        Some("condition:bar ? 1.0.0 : 2.0.0")
    );
}

#[test]
fn test_grammar_errors_keep_source_text() {
    for input in [
        "condition:",
        "condition:foo",
        "condition:foo?1.0.0",
        "condition:foo?(1.0.0:2.0.0",
        "condition:foo?1.0.0:2.0.0(bogus)",
    ] {
        match parse(input) {
            Err(CondepError::Grammar {
                source_text,
                index,
                ..
            }) => {
                assert_eq!(source_text, input);
                assert!(index <= input.len());
            }
            other => panic!("expected a grammar error for {input}, got {other:?}"),
        }
    }
}

#[test]
fn test_digest_depends_on_every_field() {
    let layout = ProjectConfig::default().branch_layout();
    let base = ConditionExpression::new("foo", Some("1.0.0"), Some("2.0.0"));
    let reference = digest(&base, false, &layout);
    assert_eq!(reference, digest(&base.clone(), false, &layout));

    let variants = [
        digest(&ConditionExpression::new("bar", Some("1.0.0"), Some("2.0.0")), false, &layout),
        digest(&ConditionExpression::new("foo", Some("1.0.1"), Some("2.0.0")), false, &layout),
        digest(&ConditionExpression::new("foo", Some("1.0.0"), Some("2.0.1")), false, &layout),
        digest(&ConditionExpression::new("foo", None, Some("2.0.0")), false, &layout),
        digest(&base.clone().with_esm_exports(["default"]), false, &layout),
        digest(&base.clone().with_peers(["react"]), false, &layout),
        digest(&base, true, &layout),
    ];
    for variant in variants {
        assert_ne!(variant, reference);
    }
}

#[test]
fn test_digest_ignores_stamped_hash() {
    let layout = ProjectConfig::default().branch_layout();
    let expr = ConditionExpression::new("foo", Some("1.0.0"), None);
    assert_eq!(digest(&expr, true, &layout), digest(&expr.clone().with_hash("ffffff"), true, &layout));
}

#[test]
fn test_digests_are_stable_across_builds() {
    // Pinned values: changing any of these invalidates every published locator.
    let expr = ConditionExpression::new("foo", Some("1.0.0"), Some("2.0.0"));
    assert_eq!(digest(&expr, false, "qualified|npm:"), "464228");
    assert_eq!(digest(&expr, true, "qualified|npm:"), "29d9c0");
    assert_eq!(digest(&expr, false, "proxy|npm:"), "62183b");
    assert_eq!(ProjectConfig::default().branch_layout(), "qualified|npm:");

    let spec = proxy::parse("condition_proxy_internal:@acme/pkg:workspace:*").unwrap();
    assert_eq!(proxy::digest(&spec), "3f308d");
    let spec = proxy::parse("condition_proxy_internal:pkg:1.0.0").unwrap();
    assert_eq!(proxy::digest(&spec), "53b188");
}
