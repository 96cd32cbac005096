//! Content-addressed cache of generated package archives.
//!
//! Each locator maps to one zip file in the cache directory:
//!
//! ```text
//! {cache_dir}/
//! ├── .locks/                      # one lock file per entry being written
//! ├── acme-pkg-3f9a1c2b7d4e.zip
//! └── pkg-0b51d27ce1a8.zip
//! ```
//!
//! The file name combines the package slug with a hash of
//! [`CACHE_VERSION`] and the full locator. Proxy locators carry no digest of
//! their own, so a template change that bumps the cache version still moves
//! every entry to a new file. Entries are never invalidated in place.
//!
//! [`ZipCache::fetch_package_from_cache`] takes the entry lock, returns the
//! archive if it exists, and otherwise calls the loader, writes the archive to
//! a temporary file in the cache directory and renames it into place. Readers
//! therefore never see a half-written archive.

pub mod lock;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use crate::archive::{PackageArtifact, build_archive};
use crate::constants::CACHE_VERSION;
use crate::core::CondepError;
use crate::models::Locator;
use lock::CacheLock;

/// Receives cache hit and miss notifications.
pub trait FetchReport: Send + Sync {
    /// The archive for `locator` was already cached.
    fn cache_hit(&self, locator: &Locator);

    /// The archive for `locator` is about to be generated.
    fn cache_miss(&self, locator: &Locator, message: &str);
}

/// [`FetchReport`] that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReport;

impl FetchReport for TracingReport {
    fn cache_hit(&self, locator: &Locator) {
        debug!("Cache hit for {locator}");
    }

    fn cache_miss(&self, _locator: &Locator, message: &str) {
        info!("{message}");
    }
}

/// Options for one [`ZipCache::fetch_package_from_cache`] call.
pub struct CacheOptions<'a, F> {
    /// Hit/miss sink
    pub report: &'a dyn FetchReport,
    /// Produces the package contents on a miss
    pub loader: F,
    /// Accept an archive whose checksum differs from the expected one
    pub skip_integrity_check: bool,
}

/// A cached archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPackage {
    /// Archive location
    pub path: PathBuf,
    /// `sha256:<hex>` of the archive bytes
    pub checksum: String,
    /// Whether the archive was already present
    pub hit: bool,
}

/// Zip-file package cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct ZipCache {
    dir: PathBuf,
}

impl ZipCache {
    /// Cache rooted at `dir`; the directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name stem of the entry for `locator`.
    #[must_use]
    pub fn entry_name(locator: &Locator) -> String {
        Self::entry_name_with_version(CACHE_VERSION, locator)
    }

    /// File name stem of the entry for `locator` under an explicit cache version.
    #[must_use]
    pub fn entry_name_with_version(cache_version: &str, locator: &Locator) -> String {
        let mut hasher = Sha256::new();
        hasher.update(cache_version.as_bytes());
        hasher.update([0u8]);
        hasher.update(locator.to_string().as_bytes());
        let hash = hex::encode(hasher.finalize());
        format!("{}-{}", locator.ident.slug().trim_start_matches('@'), &hash[..12])
    }

    /// Archive path for `locator`.
    #[must_use]
    pub fn archive_path(&self, locator: &Locator) -> PathBuf {
        self.dir.join(format!("{}.zip", Self::entry_name(locator)))
    }

    /// Return the archive for `locator`, generating it on a miss.
    ///
    /// # Errors
    ///
    /// Loader errors and I/O errors are returned unchanged. A checksum that
    /// differs from `expected_checksum` is [`CondepError::ChecksumMismatch`]
    /// unless `skip_integrity_check` is set; a freshly written archive that
    /// fails the check is removed again.
    pub async fn fetch_package_from_cache<F>(
        &self,
        locator: &Locator,
        expected_checksum: Option<&str>,
        opts: CacheOptions<'_, F>,
    ) -> Result<CachedPackage>
    where
        F: FnOnce() -> Result<PackageArtifact, CondepError> + Send,
    {
        tokio::fs::create_dir_all(&self.dir).await.with_context(|| {
            format!("Failed to create cache directory: {}", self.dir.display())
        })?;

        let entry = Self::entry_name(locator);
        let path = self.dir.join(format!("{entry}.zip"));
        let _lock = CacheLock::acquire(&self.dir, &entry).await?;

        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            let checksum = checksum_file(&path).await?;
            verify(locator, expected_checksum, &checksum, opts.skip_integrity_check)?;
            opts.report.cache_hit(locator);
            return Ok(CachedPackage {
                path,
                checksum,
                hit: true,
            });
        }

        opts.report.cache_miss(locator, &format!("{locator} can't be found in the cache and will be generated"));

        let artifact = (opts.loader)()?;
        let dir = self.dir.clone();
        let target = path.clone();
        let checksum = tokio::task::spawn_blocking(move || write_archive(&dir, &target, &artifact))
            .await
            .context("Failed to spawn blocking task for archive write")??;

        if let Err(e) = verify(locator, expected_checksum, &checksum, opts.skip_integrity_check) {
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }

        Ok(CachedPackage {
            path,
            checksum,
            hit: false,
        })
    }
}

fn write_archive(dir: &Path, target: &Path, artifact: &PackageArtifact) -> Result<String> {
    let bytes = build_archive(artifact)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
    std::io::Write::write_all(&mut temp, &bytes)
        .with_context(|| format!("Failed to write archive for {}", target.display()))?;
    temp.persist(target)
        .map_err(|e| e.error)
        .with_context(|| format!("Failed to move archive into place: {}", target.display()))?;

    debug!("Wrote {} bytes to {}", bytes.len(), target.display());
    Ok(checksum_bytes(&bytes))
}

/// `sha256:<hex>` of `bytes`.
#[must_use]
pub fn checksum_bytes(bytes: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(bytes)))
}

async fn checksum_file(path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read cached archive: {}", path.display()))?;
    Ok(checksum_bytes(&bytes))
}

fn verify(
    locator: &Locator,
    expected: Option<&str>,
    actual: &str,
    skip_integrity_check: bool,
) -> Result<(), CondepError> {
    match expected {
        Some(expected) if expected != actual && !skip_integrity_check => {
            Err(CondepError::ChecksumMismatch {
                name: locator.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        }
        _ => Ok(()),
    }
}
