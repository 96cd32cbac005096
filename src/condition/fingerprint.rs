//! Content-addressed digests for synthetic packages.
//!
//! The digest doubles as the synthetic package version and as its cache key,
//! so it must cover every input that can change the generated contents.
//! Hashing too much only costs a rebuild; hashing too little serves stale
//! selector modules from the cache.

use sha2::{Digest as _, Sha512};

use crate::condition::expression::{BranchRange, ConditionExpression};
use crate::constants::{ABSENT_SENTINEL, CACHE_VERSION, DIGEST_LENGTH};

/// Hash `parts` with SHA-512 and keep the first [`DIGEST_LENGTH`] hex characters.
///
/// Parts are NUL-separated so that moving text between adjacent fields always
/// changes the digest.
#[must_use]
pub fn make_hash(parts: &[&str]) -> String {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0u8]);
    }
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(DIGEST_LENGTH);
    digest
}

/// Digest of a condition expression under an explicit cache version.
///
/// `layout` names how branch descriptors are written into the generated
/// package (see [`ProjectConfig::branch_layout`](crate::config::ProjectConfig::branch_layout)).
#[must_use]
#[allow(clippy::too_many_arguments)]
pub fn digest_with_version(
    cache_version: &str,
    layout: &str,
    test: &str,
    consequent: Option<&BranchRange>,
    alternate: Option<&BranchRange>,
    esm_exports: Option<&[String]>,
    peers: Option<&[String]>,
    default_value: bool,
) -> String {
    let esm = esm_exports.map(|items| items.join("|"));
    let peers = peers.map(|items| items.join("|"));
    make_hash(&[
        cache_version,
        layout,
        test,
        consequent.map_or(ABSENT_SENTINEL, BranchRange::as_str),
        alternate.map_or(ABSENT_SENTINEL, BranchRange::as_str),
        esm.as_deref().unwrap_or(ABSENT_SENTINEL),
        peers.as_deref().unwrap_or(ABSENT_SENTINEL),
        if default_value { "1" } else { "0" },
    ])
}

/// Digest of an expression under the current [`CACHE_VERSION`].
///
/// Any hash already present on `expr` is ignored.
#[must_use]
pub fn digest(expr: &ConditionExpression, default_value: bool, layout: &str) -> String {
    digest_with_version(
        CACHE_VERSION,
        layout,
        &expr.test,
        expr.consequent.as_ref(),
        expr.alternate.as_ref(),
        expr.esm_exports.as_deref(),
        expr.peers.as_deref(),
        default_value,
    )
}
