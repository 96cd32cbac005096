//! Branch qualification: turning one branch of a condition into a dependency
//! the host can resolve like any other.

use crate::core::CondepError;
use crate::models::{Descriptor, Ident};

/// A descriptor synthesized for one branch outcome of a condition.
///
/// The ident is `<base>-<test>-<outcome>` in the base package's scope; the
/// range points back at the base package through the host's default protocol.
pub type QualifiedDescriptor = Descriptor;

/// Ident of the dependency standing in for `base` when `test` is `outcome`.
#[must_use]
pub fn qualified_ident(base: &Ident, test: &str, outcome: bool) -> Ident {
    Ident::new(base.scope.as_deref(), format!("{}-{test}-{outcome}", base.name))
}

/// Qualify one branch of a condition.
///
/// Deterministic in its inputs, so re-deriving a qualified descriptor in the
/// fetcher yields exactly what the resolver produced.
///
/// # Errors
///
/// [`CondepError::EmptyBranch`] when `branch_range` is blank. Callers check
/// for absent branches first; an empty range here is a caller bug.
///
/// ```rust
/// use condep_cli::condition::qualify;
/// use condep_cli::models::Ident;
///
/// let base = Ident::new(Some("acme"), "native");
/// let desc = qualify("npm:", &base, "useNative", "1.2.0", true).unwrap();
/// assert_eq!(desc.to_string(), "@acme/native-useNative-true@npm:@acme/native@1.2.0");
/// ```
pub fn qualify(
    default_protocol: &str,
    base: &Ident,
    test: &str,
    branch_range: &str,
    outcome: bool,
) -> Result<QualifiedDescriptor, CondepError> {
    if branch_range.trim().is_empty() {
        return Err(CondepError::EmptyBranch {
            test: test.to_string(),
        });
    }

    Ok(Descriptor::new(
        qualified_ident(base, test, outcome),
        format!("{default_protocol}{base}@{branch_range}"),
    ))
}
