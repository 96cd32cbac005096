use futures::FutureExt;
use futures::future::BoxFuture;
use serde_json::{Map, Value, json};

use super::{digest, is_condition_proxy, parse};
use crate::archive::{ArtifactFile, PackageArtifact};
use crate::constants::CONDITION_PROXY_VERSION_PREFIX;
use crate::core::CondepError;
use crate::fetcher::templates::render_proxy_module;
use crate::fetcher::{FetchOptions, FetchResult, Fetcher, fetch_generated};
use crate::models::Locator;

/// Generates the pass-through package for a proxy locator.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionProxyFetcher;

impl ConditionProxyFetcher {
    /// Build `package.json` and an `index.js` that re-exports the wrapped package.
    pub fn generate(locator: &Locator) -> Result<PackageArtifact, CondepError> {
        let spec = parse(&locator.reference)?;
        let target = spec.ident.to_string();

        let mut dependencies = Map::new();
        dependencies.insert(target.clone(), Value::String(spec.range.clone()));
        let manifest = json!({
            "version": format!("{CONDITION_PROXY_VERSION_PREFIX}{}", digest(&spec)),
            "dependencies": dependencies,
        });

        Ok(PackageArtifact {
            prefix_path: locator.ident.vendor_path(),
            files: vec![
                ArtifactFile::text(
                    "package.json",
                    format!("{}\n", serde_json::to_string_pretty(&manifest)?),
                ),
                ArtifactFile::text("index.js", render_proxy_module(&target)?),
            ],
        })
    }
}

impl Fetcher for ConditionProxyFetcher {
    fn name(&self) -> &'static str {
        "condition-proxy"
    }

    fn supports(&self, locator: &Locator) -> bool {
        is_condition_proxy(&locator.reference)
    }

    fn fetch<'a>(
        &'a self,
        locator: &'a Locator,
        opts: &'a FetchOptions<'a>,
    ) -> BoxFuture<'a, anyhow::Result<FetchResult>> {
        async move { fetch_generated(locator, opts, || Self::generate(locator)).await }.boxed()
    }
}
