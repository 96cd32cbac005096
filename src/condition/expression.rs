//! The parsed form of a `condition:` range.

use std::fmt;

use crate::constants::CONDITION_PROTOCOL;

/// The text of one branch of a condition expression.
///
/// A branch is either a literal version range (`1.2.0`, `^4.0.0`) or a range
/// that carries its own protocol (`workspace:*`, a nested `condition:` range).
/// The latter contains a `:`, `?` or `#` and must be parenthesized whenever it
/// is written back into a condition range, otherwise the grammar becomes
/// ambiguous.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BranchRange {
    /// Plain range, written verbatim.
    Literal(String),
    /// Range containing grammar characters, written inside parentheses.
    Grouped(String),
}

impl BranchRange {
    /// Classify branch text by the characters it contains.
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.contains([':', '?', '#']) {
            Self::Grouped(text)
        } else {
            Self::Literal(text)
        }
    }

    /// Branch text without any grouping parentheses.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Literal(text) | Self::Grouped(text) => text,
        }
    }

    /// Whether serialization must wrap this branch in parentheses.
    #[must_use]
    pub const fn needs_grouping(&self) -> bool {
        matches!(self, Self::Grouped(_))
    }

    /// Whether the branch is itself a condition range.
    ///
    /// The parser never expands nested conditions; the host re-enters the
    /// condition resolver when it resolves the branch descriptor.
    #[must_use]
    pub fn is_nested_condition(&self) -> bool {
        self.as_str().starts_with(CONDITION_PROTOCOL)
    }
}

impl fmt::Display for BranchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<str> for BranchRange {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for BranchRange {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A parsed `condition:<test> ? <consequent> : <alternate>` range.
///
/// Bare descriptors have `hash == None`; locators produced by the resolver
/// always carry the digest. An absent branch means "no dependency at all" for
/// that outcome.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConditionExpression {
    /// Name of the boolean condition
    pub test: String,
    /// Range used when the condition is true
    pub consequent: Option<BranchRange>,
    /// Range used when the condition is false
    pub alternate: Option<BranchRange>,
    /// Named exports re-exported by the ES module selector, in order
    pub esm_exports: Option<Vec<String>>,
    /// Extra peer dependencies injected into the synthetic package
    pub peers: Option<Vec<String>>,
    /// Digest stamped by the resolver
    pub hash: Option<String>,
}

impl ConditionExpression {
    /// Create an expression without lists or hash; empty branches become `None`.
    pub fn new(test: impl Into<String>, consequent: Option<&str>, alternate: Option<&str>) -> Self {
        let branch = |text: Option<&str>| {
            text.map(str::trim).filter(|t| !t.is_empty()).map(BranchRange::new)
        };
        Self {
            test: test.into(),
            consequent: branch(consequent),
            alternate: branch(alternate),
            esm_exports: None,
            peers: None,
            hash: None,
        }
    }

    /// Set the ES module export list.
    #[must_use]
    pub fn with_esm_exports<I, S>(mut self, exports: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.esm_exports = ordered_unique(exports);
        self
    }

    /// Set the injected peer list.
    #[must_use]
    pub fn with_peers<I, S>(mut self, peers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.peers = ordered_unique(peers);
        self
    }

    /// Stamp a digest, turning the expression into a locator reference.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    /// Drop the digest, turning the expression back into a descriptor range.
    #[must_use]
    pub fn without_hash(mut self) -> Self {
        self.hash = None;
        self
    }

    /// The branch selected by `outcome`.
    #[must_use]
    pub const fn branch(&self, outcome: bool) -> Option<&BranchRange> {
        if outcome { self.consequent.as_ref() } else { self.alternate.as_ref() }
    }

    /// Both branches paired with their outcome, skipping absent ones.
    pub fn present_branches(&self) -> impl Iterator<Item = (bool, &BranchRange)> {
        [(true, self.consequent.as_ref()), (false, self.alternate.as_ref())]
            .into_iter()
            .filter_map(|(outcome, branch)| branch.map(|b| (outcome, b)))
    }
}

/// Keep first occurrences in order; an empty result is `None`.
pub(crate) fn ordered_unique<I, S>(items: I) -> Option<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        let item = item.into();
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    if out.is_empty() { None } else { Some(out) }
}
