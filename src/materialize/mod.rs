//! Collapse conditions into plain manifests.
//!
//! Two transforms share the same building blocks:
//!
//! - [`materialize`] rewrites a workspace tree for one condition and a known
//!   value. Matching dependency entries become the chosen branch's literal
//!   range, or disappear when that branch is absent, and the condition's
//!   record in the `conditions` block is applied and removed.
//! - [`prepare_for_pack`] rewrites a single raw manifest before it is
//!   published. Every condition is evaluated against the environment and the
//!   whole `conditions` block is applied and removed.
//!
//! Neither transform can be undone. Running [`materialize`] twice for the same
//! condition is a no-op the second time: no entry of that condition remains.
//!
//! The `conditions` block maps a condition name to a pair of property sets,
//! one applied when the condition holds and one otherwise:
//!
//! ```json
//! "conditions": {
//!   "useNative": [{ "main": "native.js" }, { "main": "fallback.js", "gypfile": null }]
//! }
//! ```
//!
//! A `null` value deletes the top-level key; any other value replaces it.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::condition::{has_condition_protocol, parse};
use crate::config::{ProjectConfig, evaluate_with};
use crate::constants::{CONDITIONS_FIELD, DEPENDENCY_TYPES, OPTIONAL_DEPENDENCIES};
use crate::core::CondepError;
use crate::workspace::Workspace;

/// What a transform changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeSummary {
    /// Workspaces visited
    pub workspaces: usize,
    /// Dependency entries replaced by a literal range
    pub replaced: usize,
    /// Dependency entries removed because their branch was absent
    pub removed: usize,
    /// Condition records applied from the `conditions` block
    pub properties_applied: usize,
}

impl MaterializeSummary {
    /// Whether anything was modified.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.replaced + self.removed + self.properties_applied > 0
    }

    fn add(&mut self, other: Self) {
        self.workspaces += other.workspaces;
        self.replaced += other.replaced;
        self.removed += other.removed;
        self.properties_applied += other.properties_applied;
    }
}

/// Value to materialize `condition` with.
///
/// A forced value wins, then the environment, then the declared default. The
/// condition must be declared even when the value is forced.
pub fn resolve_value<F>(
    config: &ProjectConfig,
    condition: &str,
    forced: Option<bool>,
    lookup: F,
) -> Result<bool, CondepError>
where
    F: Fn(&str) -> Option<String>,
{
    config.condition(condition)?;
    match forced {
        Some(value) => Ok(value),
        None => evaluate_with(config, condition, lookup),
    }
}

/// Materialize `condition` as `value` across `root` and all nested workspaces.
pub fn materialize(
    root: &mut Workspace,
    condition: &str,
    value: bool,
) -> Result<MaterializeSummary, CondepError> {
    let mut summary = MaterializeSummary::default();
    root.try_for_each_mut(&mut |workspace: &mut Workspace| {
        let label = workspace.label();
        let changes = materialize_manifest(&mut workspace.manifest, condition, value, &label)?;
        if changes.changed() {
            info!(
                "Materialized '{condition}' in {label}: {} replaced, {} removed",
                changes.replaced, changes.removed
            );
        }
        summary.add(changes);
        Ok::<(), CondepError>(())
    })?;
    Ok(summary)
}

/// Materialize `condition` as `value` in one raw manifest.
///
/// `label` names the manifest in error messages.
pub fn materialize_manifest(
    manifest: &mut Map<String, Value>,
    condition: &str,
    value: bool,
    label: &str,
) -> Result<MaterializeSummary, CondepError> {
    let mut summary = MaterializeSummary {
        workspaces: 1,
        ..MaterializeSummary::default()
    };

    for field in DEPENDENCY_TYPES {
        rewrite_entries(manifest, field, &mut summary, |test| {
            Ok((test == condition).then_some(value))
        })?;
    }

    if apply_condition_record(manifest, condition, value, label)? {
        summary.properties_applied += 1;
        let remaining = manifest.get(CONDITIONS_FIELD).and_then(Value::as_object).map_or(0, Map::len);
        if remaining <= 1 {
            manifest.shift_remove(CONDITIONS_FIELD);
        } else if let Some(Value::Object(conditions)) = manifest.get_mut(CONDITIONS_FIELD) {
            conditions.shift_remove(condition);
        }
    }

    Ok(summary)
}

/// Resolve every condition in a raw manifest about to be packed.
///
/// Covers `optionalDependencies` too, since packed manifests keep them in
/// their own field.
pub fn prepare_for_pack<F>(
    manifest: &mut Map<String, Value>,
    config: &ProjectConfig,
    lookup: F,
) -> Result<MaterializeSummary, CondepError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut summary = MaterializeSummary {
        workspaces: 1,
        ..MaterializeSummary::default()
    };

    let evaluate = |test: &str| evaluate_with(config, test, &lookup).map(Some);
    for field in DEPENDENCY_TYPES.into_iter().chain([OPTIONAL_DEPENDENCIES]) {
        rewrite_entries(manifest, field, &mut summary, evaluate)?;
    }

    let names: Vec<String> = match manifest.get(CONDITIONS_FIELD) {
        Some(Value::Object(conditions)) => conditions.keys().cloned().collect(),
        Some(_) => return Err(invalid_conditions("pack manifest", "expected an object")),
        None => Vec::new(),
    };
    for name in names {
        let value = evaluate_with(config, &name, &lookup)?;
        apply_condition_record(manifest, &name, value, "pack manifest")?;
        summary.properties_applied += 1;
    }
    manifest.shift_remove(CONDITIONS_FIELD);

    debug!(
        "Prepared manifest for packing: {} replaced, {} removed, {} property sets applied",
        summary.replaced, summary.removed, summary.properties_applied
    );
    Ok(summary)
}

/// Rewrite condition entries of one dependency field.
///
/// `decide` maps a test name to the outcome to apply, or `None` to leave the
/// entry alone.
fn rewrite_entries<D>(
    manifest: &mut Map<String, Value>,
    field: &str,
    summary: &mut MaterializeSummary,
    decide: D,
) -> Result<(), CondepError>
where
    D: Fn(&str) -> Result<Option<bool>, CondepError>,
{
    let Some(Value::Object(entries)) = manifest.get_mut(field) else {
        return Ok(());
    };

    let names: Vec<String> = entries
        .iter()
        .filter(|(_, range)| range.as_str().is_some_and(has_condition_protocol))
        .map(|(name, _)| name.clone())
        .collect();

    for name in names {
        let Some(range) = entries.get(&name).and_then(Value::as_str) else {
            continue;
        };
        let expr = parse(range)?;
        let Some(outcome) = decide(&expr.test)? else {
            continue;
        };

        match expr.branch(outcome) {
            Some(branch) => {
                debug!("{field}.{name}: {range} -> {branch}");
                entries.insert(name, Value::String(branch.as_str().to_string()));
                summary.replaced += 1;
            }
            None => {
                debug!("{field}.{name}: {range} -> removed");
                entries.shift_remove(&name);
                summary.removed += 1;
            }
        }
    }
    Ok(())
}

/// Merge the property set chosen by `value` for `condition` into the manifest.
///
/// Returns whether the `conditions` block had a record for `condition`. The
/// record itself is left in place.
fn apply_condition_record(
    manifest: &mut Map<String, Value>,
    condition: &str,
    value: bool,
    label: &str,
) -> Result<bool, CondepError> {
    let record = match manifest.get(CONDITIONS_FIELD) {
        None => return Ok(false),
        Some(Value::Object(conditions)) => match conditions.get(condition) {
            None => return Ok(false),
            Some(record) => record.clone(),
        },
        Some(_) => return Err(invalid_conditions(label, "expected an object")),
    };

    let Value::Array(pair) = record else {
        return Err(invalid_conditions(
            label,
            &format!("'{condition}' must be a [consequent, alternate] pair"),
        ));
    };

    let chosen = pair.get(usize::from(!value)).cloned().unwrap_or(Value::Null);
    match chosen {
        Value::Null => {}
        Value::Object(props) => {
            for (key, prop) in props {
                if prop.is_null() {
                    manifest.shift_remove(&key);
                } else {
                    manifest.insert(key, prop);
                }
            }
        }
        _ => {
            return Err(invalid_conditions(
                label,
                &format!("'{condition}' properties must be objects or null"),
            ));
        }
    }
    Ok(true)
}

fn invalid_conditions(label: &str, reason: &str) -> CondepError {
    CondepError::ManifestParseError {
        file: label.to_string(),
        reason: format!("invalid '{CONDITIONS_FIELD}' block: {reason}"),
    }
}
