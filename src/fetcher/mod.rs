//! Fetcher capability contract and routing.
//!
//! A [`Fetcher`] turns a resolved locator into a package archive on disk.
//! Fetchers in this crate generate their packages: the contents are a pure
//! function of the locator and the [`ProjectConfig`], and the shared
//! [`ZipCache`] takes care of locking, checksums and atomic writes. Fetchers
//! hold no locks of their own and never retry; a failure here is a disk or
//! archive failure and is returned as-is.

mod condition;
pub(crate) mod templates;

pub use condition::ConditionFetcher;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use futures::future::BoxFuture;
use tracing::debug;

use crate::archive::PackageArtifact;
use crate::cache::{CacheOptions, FetchReport, ZipCache};
use crate::config::ProjectConfig;
use crate::core::CondepError;
use crate::models::Locator;
use crate::proxy::ConditionProxyFetcher;

/// Inputs shared by every fetch.
#[derive(Clone, Copy)]
pub struct FetchOptions<'a> {
    /// Declared conditions and branch settings
    pub config: &'a ProjectConfig,
    /// Archive cache
    pub cache: &'a ZipCache,
    /// Known checksums, typically from the host lockfile
    pub checksums: &'a BTreeMap<Locator, String>,
    /// Hit/miss sink
    pub report: &'a dyn FetchReport,
    /// Accept archives whose checksum differs from `checksums`
    pub skip_integrity_check: bool,
}

/// Where a fetched package lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    /// The fetched locator
    pub locator: Locator,
    /// Zip archive holding the package
    pub archive_path: PathBuf,
    /// Package root inside the archive
    pub prefix_path: String,
    /// Archive checksum
    pub checksum: String,
}

/// A package source.
pub trait Fetcher: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Whether this fetcher handles `locator`.
    fn supports(&self, locator: &Locator) -> bool;

    /// On-disk location of the package if it is not archived.
    fn get_local_path(&self, _locator: &Locator, _opts: &FetchOptions<'_>) -> Option<PathBuf> {
        None
    }

    /// Fetch `locator` into the cache.
    fn fetch<'a>(
        &'a self,
        locator: &'a Locator,
        opts: &'a FetchOptions<'a>,
    ) -> BoxFuture<'a, Result<FetchResult>>;
}

/// Run `generate` through the cache and describe the resulting archive.
pub(crate) async fn fetch_generated<F>(
    locator: &Locator,
    opts: &FetchOptions<'_>,
    generate: F,
) -> Result<FetchResult>
where
    F: FnOnce() -> Result<PackageArtifact, CondepError> + Send,
{
    let expected = opts.checksums.get(locator).map(String::as_str);
    let cached = opts
        .cache
        .fetch_package_from_cache(locator, expected, CacheOptions {
            report: opts.report,
            loader: generate,
            skip_integrity_check: opts.skip_integrity_check,
        })
        .await?;

    Ok(FetchResult {
        locator: locator.clone(),
        archive_path: cached.path,
        prefix_path: locator.ident.vendor_path(),
        checksum: cached.checksum,
    })
}

/// Ordered collection of fetchers with `supports`-based routing.
#[derive(Default)]
pub struct FetcherRegistry {
    fetchers: Vec<Box<dyn Fetcher>>,
}

impl FetcherRegistry {
    /// Empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the condition and proxy fetchers.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new().register(ConditionFetcher).register(ConditionProxyFetcher)
    }

    /// Append a fetcher.
    #[must_use]
    pub fn register(mut self, fetcher: impl Fetcher + 'static) -> Self {
        self.fetchers.push(Box::new(fetcher));
        self
    }

    /// Fetcher responsible for `locator`, if any.
    pub fn for_locator(&self, locator: &Locator) -> Option<&dyn Fetcher> {
        let found = self.fetchers.iter().find(|f| f.supports(locator));
        if let Some(fetcher) = found {
            debug!("Routing fetch of {locator} to {}", fetcher.name());
        }
        found.map(|fetcher| &**fetcher)
    }

    /// Fetch `locator` with whichever fetcher supports it.
    pub async fn fetch(&self, locator: &Locator, opts: &FetchOptions<'_>) -> Result<FetchResult> {
        let fetcher = self.for_locator(locator).ok_or_else(|| CondepError::ResolutionFailed {
            descriptor: locator.to_string(),
            reason: "no fetcher supports this reference".to_string(),
        })?;
        fetcher.fetch(locator, opts).await
    }
}
