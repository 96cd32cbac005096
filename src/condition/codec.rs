//! Canonical serializer for condition expressions.
//!
//! [`serialize`] is the only writer of condition descriptor ranges and locator
//! references. Two logically equal expressions always produce the same string,
//! so the host never ends up with duplicate graph nodes for the same condition.

use std::fmt::Write as _;

use crate::condition::expression::{BranchRange, ConditionExpression};
use crate::condition::parser::parse;
use crate::constants::CONDITION_PROTOCOL;
use crate::core::CondepError;
use crate::models::{Descriptor, Ident, Locator};

/// Whether a range is routed to the condition resolver.
#[must_use]
pub fn has_condition_protocol(range: &str) -> bool {
    range.starts_with(CONDITION_PROTOCOL)
}

/// Write an expression back into its canonical range form.
///
/// ```rust
/// use condep_cli::condition::{ConditionExpression, serialize};
///
/// let expr = ConditionExpression::new("useNative", Some("1.2.0"), Some("workspace:*"));
/// assert_eq!(serialize(&expr), "condition:useNative?1.2.0:(workspace:*)");
/// ```
#[must_use]
pub fn serialize(expr: &ConditionExpression) -> String {
    let mut out = String::with_capacity(64);
    out.push_str(CONDITION_PROTOCOL);
    out.push_str(&expr.test);
    out.push('?');
    write_branch(&mut out, expr.consequent.as_ref());
    out.push(':');
    write_branch(&mut out, expr.alternate.as_ref());
    write_list(&mut out, "esm", expr.esm_exports.as_deref());
    write_list(&mut out, "peer", expr.peers.as_deref());
    if let Some(hash) = &expr.hash {
        out.push('#');
        out.push_str(hash);
    }
    out
}

fn write_branch(out: &mut String, branch: Option<&BranchRange>) {
    match branch {
        Some(branch) if branch.needs_grouping() => {
            let _ = write!(out, "({})", branch.as_str());
        }
        Some(branch) => out.push_str(branch.as_str()),
        None => {}
    }
}

fn write_list(out: &mut String, prefix: &str, items: Option<&[String]>) {
    if let Some(items) = items {
        let _ = write!(out, "({prefix}:{})", items.join("|"));
    }
}

/// Parse the range of a condition descriptor.
pub fn parse_descriptor(descriptor: &Descriptor) -> Result<ConditionExpression, CondepError> {
    parse(&descriptor.range)
}

/// Parse the reference of a condition locator.
pub fn parse_locator(locator: &Locator) -> Result<ConditionExpression, CondepError> {
    parse(&locator.reference)
}

/// Build the canonical descriptor for an expression; any hash is dropped.
#[must_use]
pub fn make_descriptor(ident: &Ident, expr: &ConditionExpression) -> Descriptor {
    Descriptor::new(ident.clone(), serialize(&expr.clone().without_hash()))
}

/// Build the locator for an expression stamped with `hash`.
#[must_use]
pub fn make_locator(ident: &Ident, expr: &ConditionExpression, hash: &str) -> Locator {
    Locator::new(ident.clone(), serialize(&expr.clone().with_hash(hash)))
}
