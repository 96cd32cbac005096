use std::collections::BTreeMap;

use super::{digest, is_condition_proxy, parse, serialize};
use crate::constants::CONDITION_PROXY_VERSION_PREFIX;
use crate::core::CondepError;
use crate::models::{Descriptor, LinkType, Locator, Package, PackageOrigin};
use crate::resolver::{ResolveOptions, Resolver, Satisfying, filter_single_candidate};

/// Resolves proxy descriptors to a one-dependency pass-through package.
///
/// Never re-enters branch expansion: the wrapped range is handed to the host
/// as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionProxyResolver;

impl Resolver for ConditionProxyResolver {
    fn name(&self) -> &'static str {
        "condition-proxy"
    }

    fn supports_descriptor(&self, descriptor: &Descriptor) -> bool {
        is_condition_proxy(&descriptor.range)
    }

    fn supports_locator(&self, locator: &Locator) -> bool {
        is_condition_proxy(&locator.reference)
    }

    fn resolution_dependencies(
        &self,
        descriptor: &Descriptor,
        _opts: ResolveOptions<'_>,
    ) -> Result<Vec<Descriptor>, CondepError> {
        let spec = parse(&descriptor.range)?;
        Ok(vec![Descriptor::new(spec.ident, spec.range)])
    }

    fn candidates(
        &self,
        descriptor: &Descriptor,
        _opts: ResolveOptions<'_>,
    ) -> Result<Vec<Locator>, CondepError> {
        let spec = parse(&descriptor.range)?;
        Ok(vec![Locator::new(descriptor.ident.clone(), serialize(&spec))])
    }

    fn get_satisfying(
        &self,
        descriptor: &Descriptor,
        locators: &[Locator],
        opts: ResolveOptions<'_>,
    ) -> Result<Satisfying, CondepError> {
        let candidates = self.candidates(descriptor, opts)?;
        Ok(match candidates.first() {
            Some(candidate) => filter_single_candidate(candidate, locators),
            None => Satisfying::default(),
        })
    }

    fn resolve(&self, locator: &Locator, _opts: ResolveOptions<'_>) -> Result<Package, CondepError> {
        let spec = parse(&locator.reference)?;
        let digest = digest(&spec);

        let mut dependencies = BTreeMap::new();
        dependencies.insert(spec.ident.clone(), Descriptor::new(spec.ident, spec.range));

        Ok(Package {
            locator: locator.clone(),
            version: format!("{CONDITION_PROXY_VERSION_PREFIX}{digest}"),
            link_type: LinkType::Hard,
            origin: PackageOrigin::ConditionProxy { digest },
            dependencies,
            peer_dependencies: BTreeMap::new(),
            dependencies_meta: BTreeMap::new(),
            peer_dependencies_meta: BTreeMap::new(),
            bin: None,
        })
    }
}
