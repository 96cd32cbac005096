//! Whole-project resolution.
//!
//! [`Project::resolve_everything`] collects every condition and proxy
//! descriptor declared across the workspace tree and resolves them in waves.
//! Each wave resolves its descriptors concurrently on the blocking pool, then
//! queues the branch descriptors they expose. Branches that no registered
//! resolver supports (plain `npm:` ranges, for instance) are recorded as
//! external: the host package manager resolves those.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::try_join_all;
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ProjectConfig;
use crate::core::CondepError;
use crate::models::{Descriptor, Locator, Package};
use crate::resolver::{ResolveOptions, ResolverRegistry};
use crate::workspace::Workspace;

/// A workspace tree with its configuration.
#[derive(Debug, Clone)]
pub struct Project {
    /// Root of the tree being operated on
    pub root: Workspace,
    /// Project configuration
    pub config: Arc<ProjectConfig>,
}

/// Output of a resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    /// Descriptor to the locator it resolved to
    pub resolutions: BTreeMap<Descriptor, Locator>,
    /// Synthetic packages by locator
    pub packages: BTreeMap<Locator, Package>,
    /// Descriptors left to the host's own resolvers
    pub external: BTreeSet<Descriptor>,
}

/// Everything one descriptor resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDescriptor {
    /// Input descriptor
    pub descriptor: Descriptor,
    /// Descriptors the host resolves first
    pub dependencies: Vec<Descriptor>,
    /// The single candidate
    pub locator: Locator,
    /// Resolved record
    pub package: Package,
}

/// Walk `descriptor` through the resolver state machine.
///
/// Returns `None` when no registered resolver supports it.
pub fn resolve_descriptor(
    registry: &ResolverRegistry,
    config: &ProjectConfig,
    descriptor: &Descriptor,
) -> Result<Option<ResolvedDescriptor>, CondepError> {
    let Some(resolver) = registry.for_descriptor(descriptor) else {
        return Ok(None);
    };
    let opts = ResolveOptions::new(config);

    let dependencies = resolver.resolution_dependencies(descriptor, opts)?;
    let locator = resolver.candidates(descriptor, opts)?.into_iter().next().ok_or_else(|| {
        CondepError::ResolutionFailed {
            descriptor: descriptor.to_string(),
            reason: "no candidates".to_string(),
        }
    })?;
    let package = registry.require_locator(&locator)?.resolve(&locator, opts)?;

    Ok(Some(ResolvedDescriptor {
        descriptor: descriptor.clone(),
        dependencies,
        locator,
        package,
    }))
}

impl Project {
    /// Load the workspace owning `cwd` with `config`.
    pub fn load(cwd: &Path, config: ProjectConfig) -> Result<Self> {
        Ok(Self {
            root: Workspace::find(cwd)?,
            config: Arc::new(config),
        })
    }

    /// Condition and proxy descriptors declared anywhere in the tree.
    pub fn declared_descriptors(&self) -> Result<BTreeSet<Descriptor>, CondepError> {
        let mut out = BTreeSet::new();
        for workspace in self.root.iter() {
            out.extend(workspace.protocol_descriptors()?);
        }
        Ok(out)
    }

    /// Resolve every declared descriptor and the branches they expose.
    pub async fn resolve_everything(&self, registry: Arc<ResolverRegistry>) -> Result<Resolution> {
        let mut resolution = Resolution::default();
        let mut seen: BTreeSet<Descriptor> = BTreeSet::new();
        let mut wave: Vec<Descriptor> = self.declared_descriptors()?.into_iter().collect();
        seen.extend(wave.iter().cloned());

        while !wave.is_empty() {
            debug!("Resolving wave of {} descriptors", wave.len());
            let tasks = wave.drain(..).map(|descriptor| {
                let registry = Arc::clone(&registry);
                let config = Arc::clone(&self.config);
                async move {
                    let label = descriptor.to_string();
                    let resolved = tokio::task::spawn_blocking(move || {
                        resolve_descriptor(&registry, &config, &descriptor)
                            .map(|resolved| resolved.ok_or(descriptor))
                    })
                    .await
                    .context("Resolution task panicked")?
                    .with_context(|| format!("Failed to resolve {label}"))?;
                    Ok::<_, anyhow::Error>(resolved)
                }
            });
            let results = try_join_all(tasks).await?;

            for result in results {
                match result {
                    Ok(resolved) => {
                        for dependency in &resolved.dependencies {
                            if seen.insert(dependency.clone()) {
                                wave.push(dependency.clone());
                            }
                        }
                        resolution.resolutions.insert(resolved.descriptor, resolved.locator.clone());
                        resolution.packages.insert(resolved.locator, resolved.package);
                    }
                    Err(external) => {
                        resolution.external.insert(external);
                    }
                }
            }
        }

        info!(
            "Resolved {} descriptors into {} synthetic packages ({} left to the host)",
            resolution.resolutions.len(),
            resolution.packages.len(),
            resolution.external.len()
        );
        Ok(resolution)
    }
}
