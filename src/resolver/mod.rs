//! Resolver capability contract and routing.
//!
//! The host walks its dependency graph through a list of [`Resolver`]s. Every
//! descriptor is routed to the first resolver whose
//! [`supports_descriptor`](Resolver::supports_descriptor) accepts it, and every
//! locator to the first whose [`supports_locator`](Resolver::supports_locator)
//! does. A descriptor moves through four states:
//!
//! 1. **Descriptor** as written in a manifest
//! 2. **Resolution dependencies** handed back to the host, which resolves them
//!    first and in any order
//! 3. **Candidate** locators, of which conditions produce exactly one
//! 4. **Resolved** [`Package`] record with dependencies wired to the branches
//!
//! Resolvers are synchronous and hold no mutable state. Every operation is a
//! pure function of its input plus the [`ProjectConfig`] passed alongside, so
//! the host may call them concurrently for unrelated descriptors.

mod condition;

pub use condition::{ConditionResolver, branch_descriptors};

use tracing::debug;

use crate::config::ProjectConfig;
use crate::core::CondepError;
use crate::models::{Descriptor, Locator, Package};
use crate::proxy::ConditionProxyResolver;

/// Read-only inputs shared by every resolver call.
#[derive(Debug, Clone, Copy)]
pub struct ResolveOptions<'a> {
    /// Declared conditions and branch settings
    pub config: &'a ProjectConfig,
}

impl<'a> ResolveOptions<'a> {
    /// Wrap a project configuration.
    #[must_use]
    pub const fn new(config: &'a ProjectConfig) -> Self {
        Self { config }
    }
}

/// Locators accepted by [`Resolver::get_satisfying`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Satisfying {
    /// Locators that satisfy the descriptor
    pub locators: Vec<Locator>,
    /// Whether `locators` is already in preference order
    pub sorted: bool,
}

/// A dependency protocol handler.
pub trait Resolver: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this resolver handles `descriptor`.
    fn supports_descriptor(&self, descriptor: &Descriptor) -> bool;

    /// Whether this resolver handles `locator`.
    fn supports_locator(&self, locator: &Locator) -> bool;

    /// Whether the host should keep this resolution in its lockfile across
    /// runs instead of recomputing it.
    fn should_persist_resolution(&self, _locator: &Locator) -> bool {
        false
    }

    /// Bind a descriptor to its parent package before resolution.
    fn bind_descriptor(&self, descriptor: &Descriptor, _parent: &Locator) -> Descriptor {
        descriptor.clone()
    }

    /// Descriptors the host must resolve before [`resolve`](Self::resolve).
    fn resolution_dependencies(
        &self,
        descriptor: &Descriptor,
        opts: ResolveOptions<'_>,
    ) -> Result<Vec<Descriptor>, CondepError>;

    /// Locators `descriptor` may resolve to, best first.
    fn candidates(
        &self,
        descriptor: &Descriptor,
        opts: ResolveOptions<'_>,
    ) -> Result<Vec<Locator>, CondepError>;

    /// Filter already-known `locators` down to those satisfying `descriptor`.
    fn get_satisfying(
        &self,
        descriptor: &Descriptor,
        locators: &[Locator],
        opts: ResolveOptions<'_>,
    ) -> Result<Satisfying, CondepError>;

    /// Build the package record for `locator`.
    fn resolve(&self, locator: &Locator, opts: ResolveOptions<'_>) -> Result<Package, CondepError>;
}

/// Keep only the locators equal to a resolver's single candidate.
pub(crate) fn filter_single_candidate(candidate: &Locator, locators: &[Locator]) -> Satisfying {
    Satisfying {
        locators: locators.iter().filter(|locator| *locator == candidate).cloned().collect(),
        sorted: true,
    }
}

/// Ordered collection of resolvers with `supports`-based routing.
#[derive(Default)]
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn Resolver>>,
}

impl ResolverRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the condition and proxy resolvers.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new().register(ConditionResolver).register(ConditionProxyResolver)
    }

    /// Append a resolver; earlier registrations win routing ties.
    #[must_use]
    pub fn register(mut self, resolver: impl Resolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    /// Resolver responsible for `descriptor`, if any.
    pub fn for_descriptor(&self, descriptor: &Descriptor) -> Option<&dyn Resolver> {
        let found = self.resolvers.iter().find(|r| r.supports_descriptor(descriptor));
        if let Some(resolver) = found {
            debug!("Routing descriptor {descriptor} to {}", resolver.name());
        }
        found.map(|resolver| &**resolver)
    }

    /// Resolver responsible for `locator`, if any.
    pub fn for_locator(&self, locator: &Locator) -> Option<&dyn Resolver> {
        let found = self.resolvers.iter().find(|r| r.supports_locator(locator));
        if let Some(resolver) = found {
            debug!("Routing locator {locator} to {}", resolver.name());
        }
        found.map(|resolver| &**resolver)
    }

    /// Like [`for_descriptor`](Self::for_descriptor) but failing when nothing matches.
    pub fn require_descriptor(&self, descriptor: &Descriptor) -> Result<&dyn Resolver, CondepError> {
        self.for_descriptor(descriptor).ok_or_else(|| CondepError::ResolutionFailed {
            descriptor: descriptor.to_string(),
            reason: "no resolver supports this range".to_string(),
        })
    }

    /// Like [`for_locator`](Self::for_locator) but failing when nothing matches.
    pub fn require_locator(&self, locator: &Locator) -> Result<&dyn Resolver, CondepError> {
        self.for_locator(locator).ok_or_else(|| CondepError::ResolutionFailed {
            descriptor: locator.to_string(),
            reason: "no resolver supports this reference".to_string(),
        })
    }
}
