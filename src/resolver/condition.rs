//! Resolver for `condition:` ranges.

use std::collections::BTreeMap;

use tracing::debug;

use super::{ResolveOptions, Resolver, Satisfying, filter_single_candidate};
use crate::condition::{
    ConditionExpression, digest, has_condition_protocol, make_locator, parse_descriptor,
    parse_locator, qualify,
};
use crate::config::{BranchStrategy, ProjectConfig};
use crate::constants::CONDITION_VERSION_PREFIX;
use crate::core::CondepError;
use crate::models::{Descriptor, Ident, LinkType, Locator, Package, PackageOrigin};
use crate::proxy;

/// Descriptors standing in for each present branch of `expr`, paired with
/// their outcome.
///
/// The descriptor shape follows [`ProjectConfig::condition_branches`]. The
/// ident is the same under both strategies, so selector modules can require
/// the branch by name without knowing which one was used.
pub fn branch_descriptors(
    base: &Ident,
    expr: &ConditionExpression,
    config: &ProjectConfig,
) -> Result<Vec<(bool, Descriptor)>, CondepError> {
    expr.present_branches()
        .map(|(outcome, range)| {
            let descriptor = match config.condition_branches {
                BranchStrategy::Qualified => qualify(
                    &config.default_protocol,
                    base,
                    &expr.test,
                    range.as_str(),
                    outcome,
                )?,
                BranchStrategy::Proxy => {
                    proxy::make_virtual_descriptor(&expr.test, outcome, base, range.as_str())?
                }
            };
            Ok((outcome, descriptor))
        })
        .collect()
}

/// Resolves `condition:` descriptors into synthetic selector packages.
///
/// Candidates are stamped with a digest of the expression and the condition's
/// static default. The live environment value is never read here, so two
/// resolutions with the same configuration always agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionResolver;

impl ConditionResolver {
    /// Validate the test name and compute the digest for `expr`.
    ///
    /// The default is looked up first so an undeclared condition fails before
    /// anything is hashed.
    fn digest_for(expr: &ConditionExpression, config: &ProjectConfig) -> Result<String, CondepError> {
        let default_value = config.default_value(&expr.test)?;
        let digest = digest(expr, default_value, &config.branch_layout());
        debug!("Condition '{}' (default {default_value}) digests to {digest}", expr.test);
        Ok(digest)
    }
}

impl Resolver for ConditionResolver {
    fn name(&self) -> &'static str {
        "condition"
    }

    fn supports_descriptor(&self, descriptor: &Descriptor) -> bool {
        has_condition_protocol(&descriptor.range)
    }

    fn supports_locator(&self, locator: &Locator) -> bool {
        has_condition_protocol(&locator.reference)
    }

    fn resolution_dependencies(
        &self,
        descriptor: &Descriptor,
        opts: ResolveOptions<'_>,
    ) -> Result<Vec<Descriptor>, CondepError> {
        let expr = parse_descriptor(descriptor)?;
        Ok(branch_descriptors(&descriptor.ident, &expr, opts.config)?
            .into_iter()
            .map(|(_, descriptor)| descriptor)
            .collect())
    }

    fn candidates(
        &self,
        descriptor: &Descriptor,
        opts: ResolveOptions<'_>,
    ) -> Result<Vec<Locator>, CondepError> {
        let expr = parse_descriptor(descriptor)?;
        let digest = Self::digest_for(&expr, opts.config)?;
        Ok(vec![make_locator(&descriptor.ident, &expr, &digest)])
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

    fn resolve(&self, locator: &Locator, opts: ResolveOptions<'_>) -> Result<Package, CondepError> {
        let expr = parse_locator(locator)?;
        let digest = Self::digest_for(&expr, opts.config)?;

        if let Some(stamped) = &expr.hash {
            if *stamped != digest {
                debug!("Locator {locator} was stamped {stamped}, recomputed {digest}");
            }
        }

        let dependencies: BTreeMap<Ident, Descriptor> =
            branch_descriptors(&locator.ident, &expr, opts.config)?
                .into_iter()
                .map(|(_, descriptor)| (descriptor.ident.clone(), descriptor))
                .collect();

        let mut peer_dependencies = BTreeMap::new();
        for peer in expr.peers.iter().flatten() {
            let ident = Ident::parse(peer)?;
            peer_dependencies.insert(ident.clone(), Descriptor::new(ident, "*"));
        }

        Ok(Package {
            locator: locator.clone(),
            version: format!("{CONDITION_VERSION_PREFIX}{digest}"),
            link_type: LinkType::Hard,
            origin: PackageOrigin::Condition { digest },
            dependencies,
            peer_dependencies,
            dependencies_meta: BTreeMap::new(),
            peer_dependencies_meta: BTreeMap::new(),
            bin: None,
        })
    }
}
