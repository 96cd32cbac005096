//! Evaluation of declared conditions against the environment.
//!
//! Used at materialize and pack time only. Resolution never calls into this
//! module, so a resolved graph does not depend on the environment it was
//! computed in.

use tracing::debug;

use super::ProjectConfig;
use crate::constants::ENV_SOURCE;
use crate::core::CondepError;

/// Coerce an environment value to a boolean.
///
/// `""`, `"0"` and `"false"` are false and any other value is true. An unset
/// variable is not false: it falls back to `default`. The generated selector
/// modules implement the same rule in JavaScript.
///
/// ```rust
/// use condep_cli::config::coerce_bool;
///
/// assert!(!coerce_bool(Some("false"), true));
/// assert!(!coerce_bool(Some(""), true));
/// assert!(coerce_bool(Some("no"), false));
/// assert!(coerce_bool(None, true));
/// ```
#[must_use]
pub fn coerce_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(value) => !(value.is_empty() || value == "false" || value == "0"),
    }
}

/// Evaluate `test` using the process environment.
///
/// Reads exactly one variable, named after the condition.
///
/// # Errors
///
/// [`CondepError::UnknownCondition`] if `test` is not declared and
/// [`CondepError::UnsupportedSource`] if its source is not `env`.
pub fn evaluate(config: &ProjectConfig, test: &str) -> Result<bool, CondepError> {
    evaluate_with(config, test, env_lookup)
}

/// Read a process environment variable, lossily decoding non-UTF-8 values.
#[must_use]
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
}

/// Evaluate `test` with an explicit variable lookup.
pub fn evaluate_with<F>(config: &ProjectConfig, test: &str, lookup: F) -> Result<bool, CondepError>
where
    F: Fn(&str) -> Option<String>,
{
    let condition = config.condition(test)?;

    if condition.source != ENV_SOURCE {
        return Err(CondepError::UnsupportedSource {
            name: test.to_string(),
            source_kind: condition.source.clone(),
        });
    }

    let raw = lookup(test);
    let value = coerce_bool(raw.as_deref(), condition.default);
    debug!("Condition '{test}' evaluated to {value} (env: {raw:?}, default: {})", condition.default);
    Ok(value)
}
