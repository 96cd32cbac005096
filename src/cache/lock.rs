//! Per-entry file locking for the package cache.
//!
//! Locks are process-safe (OS file locks via [`fs4`]) and released when the
//! [`CacheLock`] is dropped. Two fetches of the same locator, in this process
//! or another one, serialize on the same lock file, so an archive is only ever
//! written once.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::warn;

/// An exclusive lock on one cache entry.
pub struct CacheLock {
    file: File,
    path: PathBuf,
}

impl CacheLock {
    /// Acquire the exclusive lock for `entry` in `cache_dir`.
    ///
    /// The lock file lives at `{cache_dir}/.locks/{entry}.lock`. Acquisition
    /// blocks inside `spawn_blocking` until any other holder releases it; there
    /// is no timeout.
    ///
    /// ```rust,no_run
    /// use condep_cli::cache::lock::CacheLock;
    /// use std::path::Path;
    ///
    /// # async fn example() -> anyhow::Result<()> {
    /// let lock = CacheLock::acquire(Path::new("/tmp/condep-cache"), "pkg-abc123").await?;
    /// // ... write the archive ...
    /// drop(lock);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn acquire(cache_dir: &Path, entry: &str) -> Result<Self> {
        let locks_dir = cache_dir.join(".locks");
        tokio::fs::create_dir_all(&locks_dir).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                anyhow::anyhow!(
                    "Permission denied: cannot create locks directory at {}",
                    locks_dir.display()
                )
            } else {
                anyhow::anyhow!("Failed to create directory {}: {}", locks_dir.display(), e)
            }
        })?;

        let lock_path = locks_dir.join(format!("{entry}.lock"));
        let open_path = lock_path.clone();
        let entry = entry.to_string();

        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(true)
                .open(&open_path)
                .with_context(|| format!("Failed to open lock file: {}", open_path.display()))?;

            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire cache lock for: {entry}"))?;

            Ok(file)
        })
        .await
        .context("Failed to spawn blocking task for lock acquisition")??;

        Ok(Self {
            file,
            path: lock_path,
        })
    }

    /// Path of the lock file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CacheLock {
    fn drop(&mut self) {
        #[allow(unstable_name_collisions)]
        if let Err(e) = self.file.unlock() {
            warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}
