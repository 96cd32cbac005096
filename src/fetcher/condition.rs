use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value, json};
use tracing::debug;

use super::templates::Selector;
use super::{FetchOptions, FetchResult, Fetcher, fetch_generated};
use crate::archive::{ArtifactFile, PackageArtifact};
use crate::condition::{digest, has_condition_protocol, parse_locator};
use crate::config::ProjectConfig;
use crate::constants::CONDITION_VERSION_PREFIX;
use crate::core::CondepError;
use crate::models::Locator;
use crate::resolver::branch_descriptors;

/// Generates the selector package for a `condition:` locator.
///
/// The package depends on both branch packages and picks one at load time by
/// reading the environment variable named after the condition.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionFetcher;

impl ConditionFetcher {
    /// Build the package contents for `locator`.
    ///
    /// Produces `package.json`, `index.js` and, when ESM exports are declared,
    /// `index.mjs`.
    pub fn generate(locator: &Locator, config: &ProjectConfig) -> Result<PackageArtifact, CondepError> {
        let expr = parse_locator(locator)?;
        let default_value = config.default_value(&expr.test)?;
        let digest = digest(&expr, default_value, &config.branch_layout());
        debug!("Generating selector package for {locator} (digest {digest})");

        let branches = branch_descriptors(&locator.ident, &expr, config)?;
        let module_for = |outcome: bool| {
            branches
                .iter()
                .find(|(branch_outcome, _)| *branch_outcome == outcome)
                .map(|(_, descriptor)| descriptor.ident.to_string())
        };
        let consequent = module_for(true);
        let alternate = module_for(false);

        let dependencies: Map<String, Value> = branches
            .iter()
            .map(|(_, descriptor)| (descriptor.ident.to_string(), Value::String(descriptor.range.clone())))
            .collect();

        let mut manifest = json!({
            "version": format!("{CONDITION_VERSION_PREFIX}{digest}"),
            "dependencies": dependencies,
        });
        if expr.esm_exports.is_some() {
            manifest["exports"] = json!({
                "module": "./index.mjs",
                "default": "./index.js",
            });
        }

        let selector = Selector {
            test: &expr.test,
            default_value,
            consequent: consequent.as_deref(),
            alternate: alternate.as_deref(),
        };

        let mut files = vec![
            ArtifactFile::text("package.json", format!("{}\n", serde_json::to_string_pretty(&manifest)?)),
            ArtifactFile::text("index.js", selector.render_commonjs()?),
        ];
        if let Some(exports) = &expr.esm_exports {
            files.push(ArtifactFile::text("index.mjs", selector.render_esm(exports)?));
        }

        Ok(PackageArtifact {
            prefix_path: locator.ident.vendor_path(),
            files,
        })
    }
}

impl Fetcher for ConditionFetcher {
    fn name(&self) -> &'static str {
        "condition"
    }

    fn supports(&self, locator: &Locator) -> bool {
        has_condition_protocol(&locator.reference)
    }

    fn fetch<'a>(
        &'a self,
        locator: &'a Locator,
        opts: &'a FetchOptions<'a>,
    ) -> BoxFuture<'a, anyhow::Result<FetchResult>> {
        async move { fetch_generated(locator, opts, || Self::generate(locator, opts.config)).await }
            .boxed()
    }
}
