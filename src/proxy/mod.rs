//! Deferred branch ranges through the internal proxy protocol.
//!
//! With `conditionBranches: proxy` the condition resolver does not hand the
//! host an `npm:` descriptor for each branch. It hands back
//! `condition_proxy_internal:<ident>:<range>` instead, on the same
//! `<base>-<test>-<outcome>` identity. The host routes that to
//! [`ConditionProxyResolver`], which resolves to a package with a single
//! dependency on `<ident>@<range>`. The literal range (for example
//! `workspace:*`) is then interpreted by whichever resolver owns it.
//!
//! The grammar has two fields and no nesting. The range is opaque and may
//! itself contain colons; the identity never does, so the first `:` after the
//! protocol tag separates them.

mod fetcher;
mod resolver;

pub use fetcher::ConditionProxyFetcher;
pub use resolver::ConditionProxyResolver;

use crate::condition::fingerprint::make_hash;
use crate::condition::qualified_ident;
use crate::constants::{CACHE_VERSION, CONDITION_PROXY_PROTOCOL};
use crate::core::CondepError;
use crate::models::{Descriptor, Ident};

/// A parsed proxy range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxySpec {
    /// Package the proxy forwards to
    pub ident: Ident,
    /// Range requested for it, uninterpreted
    pub range: String,
}

/// Whether `range` uses the proxy protocol.
#[must_use]
pub fn is_condition_proxy(range: &str) -> bool {
    range.starts_with(CONDITION_PROXY_PROTOCOL)
}

/// Parse `condition_proxy_internal:<ident>:<range>`.
pub fn parse(source: &str) -> Result<ProxySpec, CondepError> {
    let Some(body) = source.strip_prefix(CONDITION_PROXY_PROTOCOL) else {
        return Err(CondepError::grammar(
            format!("Expected '{CONDITION_PROXY_PROTOCOL}'"),
            0,
            source,
        ));
    };

    let Some((ident, range)) = body.split_once(':') else {
        return Err(CondepError::grammar("Expected ':'", source.len(), source));
    };

    if range.is_empty() {
        return Err(CondepError::grammar("Expected a range", source.len(), source));
    }

    Ok(ProxySpec {
        ident: Ident::parse(ident)?,
        range: range.to_string(),
    })
}

/// Canonical proxy range for `spec`.
#[must_use]
pub fn serialize(spec: &ProxySpec) -> String {
    format!("{CONDITION_PROXY_PROTOCOL}{}:{}", spec.ident, spec.range)
}

/// Digest stamped into the proxy package version.
#[must_use]
pub fn digest(spec: &ProxySpec) -> String {
    make_hash(&[
        CACHE_VERSION,
        spec.ident.scope.as_deref().unwrap_or_default(),
        &spec.ident.name,
        &spec.range,
    ])
}

/// Proxy descriptor for one branch outcome of `test` on `base`.
///
/// # Errors
///
/// [`CondepError::EmptyBranch`] when `range` is blank.
pub fn make_virtual_descriptor(
    test: &str,
    outcome: bool,
    base: &Ident,
    range: &str,
) -> Result<Descriptor, CondepError> {
    if range.trim().is_empty() {
        return Err(CondepError::EmptyBranch {
            test: test.to_string(),
        });
    }

    let spec = ProxySpec {
        ident: base.clone(),
        range: range.to_string(),
    };
    Ok(Descriptor::new(qualified_ident(base, test, outcome), serialize(&spec)))
}
