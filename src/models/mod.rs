//! Shared data models for package identities
//!
//! The host's dependency graph speaks in three identities:
//! - [`Ident`] - a package name, optionally scoped (`@scope/name`)
//! - [`Descriptor`] - an ident plus the range a manifest asks for (`name@range`)
//! - [`Locator`] - an ident plus the exact reference a range resolved to
//!
//! A resolved [`Package`] carries a [`PackageOrigin`] tag so code can tell
//! ordinary packages apart from the synthetic ones this crate generates,
//! without inspecting version strings.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

use crate::core::CondepError;

/// A package name with an optional scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Ident {
    /// Scope without the leading `@`
    pub scope: Option<String>,
    /// Local package name
    pub name: String,
}

impl Ident {
    /// Create an ident; an empty scope is treated as no scope.
    pub fn new(scope: Option<&str>, name: impl Into<String>) -> Self {
        Self {
            scope: scope.filter(|s| !s.is_empty()).map(str::to_string),
            name: name.into(),
        }
    }

    /// Parse `name` or `@scope/name`.
    pub fn parse(input: &str) -> Result<Self, CondepError> {
        let invalid = |reason: &str| CondepError::InvalidDescriptor {
            input: input.to_string(),
            reason: reason.to_string(),
        };

        if let Some(scoped) = input.strip_prefix('@') {
            let (scope, name) =
                scoped.split_once('/').ok_or_else(|| invalid("scoped name is missing '/'"))?;
            if scope.is_empty() || name.is_empty() {
                return Err(invalid("scope and name must not be empty"));
            }
            Ok(Self::new(Some(scope), name))
        } else if input.is_empty() {
            Err(invalid("package name must not be empty"))
        } else {
            Ok(Self::new(None, input))
        }
    }

    /// Directory the package lives at inside an archive (`node_modules/<ident>`).
    #[must_use]
    pub fn vendor_path(&self) -> String {
        format!("node_modules/{self}")
    }

    /// File-system safe form, used for cache entry names.
    #[must_use]
    pub fn slug(&self) -> String {
        match &self.scope {
            Some(scope) => format!("@{scope}-{}", self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.scope {
            Some(scope) => write!(f, "@{scope}/{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl Serialize for Ident {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Split `ident@rest` at the `@` that ends the ident.
fn split_ident(input: &str) -> Result<(Ident, &str), CondepError> {
    let search_from = usize::from(input.starts_with('@'));
    let at = input[search_from..].find('@').map(|i| i + search_from).ok_or_else(|| {
        CondepError::InvalidDescriptor {
            input: input.to_string(),
            reason: "expected '<name>@<range>'".to_string(),
        }
    })?;
    Ok((Ident::parse(&input[..at])?, &input[at + 1..]))
}

/// A dependency request: an ident and the range it was declared with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Descriptor {
    /// Requested package
    pub ident: Ident,
    /// Declared range, opaque to everything but the resolver that supports it
    pub range: String,
}

impl Descriptor {
    /// Create a descriptor.
    pub fn new(ident: Ident, range: impl Into<String>) -> Self {
        Self {
            ident,
            range: range.into(),
        }
    }

    /// Parse `name@range` or `@scope/name@range`.
    pub fn parse(input: &str) -> Result<Self, CondepError> {
        let (ident, range) = split_ident(input)?;
        Ok(Self::new(ident, range))
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.ident, self.range)
    }
}

impl Serialize for Descriptor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved identity: an ident and the exact reference it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Locator {
    /// Resolved package
    pub ident: Ident,
    /// Exact reference
    pub reference: String,
}

impl Locator {
    /// Create a locator.
    pub fn new(ident: Ident, reference: impl Into<String>) -> Self {
        Self {
            ident,
            reference: reference.into(),
        }
    }

    /// Parse `name@reference` or `@scope/name@reference`.
    pub fn parse(input: &str) -> Result<Self, CondepError> {
        let (ident, reference) = split_ident(input)?;
        Ok(Self::new(ident, reference))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.ident, self.reference)
    }
}

impl Serialize for Locator {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// How the host links a package into `node_modules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    /// Contents are copied out of the package archive.
    Hard,
}

/// Where a resolved package's contents come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum PackageOrigin {
    /// A generated runtime selector for a condition expression.
    Condition {
        /// Digest stamped into the version
        digest: String,
    },
    /// A generated pass-through for a deferred branch range.
    ConditionProxy {
        /// Digest stamped into the version
        digest: String,
    },
}

/// A resolved package record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Package {
    /// The locator this package was resolved from
    pub locator: Locator,
    /// Package version
    pub version: String,
    /// Link strategy
    pub link_type: LinkType,
    /// Origin tag
    pub origin: PackageOrigin,
    /// Regular dependencies keyed by ident
    pub dependencies: BTreeMap<Ident, Descriptor>,
    /// Peer dependencies keyed by ident
    pub peer_dependencies: BTreeMap<Ident, Descriptor>,
    /// Per-dependency metadata
    pub dependencies_meta: BTreeMap<Ident, serde_json::Value>,
    /// Per-peer-dependency metadata
    pub peer_dependencies_meta: BTreeMap<Ident, serde_json::Value>,
    /// Binaries exposed by the package
    pub bin: Option<BTreeMap<String, String>>,
}
