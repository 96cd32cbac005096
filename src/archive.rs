//! Zip archives for generated packages.
//!
//! Every entry gets the same fixed modification time, so two archives built
//! from the same files are byte-identical and their checksums match across
//! machines.

use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::constants::ARCHIVE_MTIME;

/// One file of a generated package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactFile {
    /// Path relative to the package root
    pub path: String,
    /// File contents
    pub contents: Vec<u8>,
}

impl ArtifactFile {
    /// Text file helper.
    pub fn text(path: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into().into_bytes(),
        }
    }

    /// Contents as UTF-8, if they are.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.contents).ok()
    }
}

/// The full contents of a generated package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageArtifact {
    /// Directory the files live under inside the archive (`node_modules/<ident>`)
    pub prefix_path: String,
    /// Files in archive order
    pub files: Vec<ArtifactFile>,
}

impl PackageArtifact {
    /// Look up a file by its package-relative path.
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&ArtifactFile> {
        self.files.iter().find(|file| file.path == path)
    }
}

/// Build the zip bytes for `artifact`.
///
/// Parent directories of the prefix get their own entries, in order, followed
/// by the files.
pub fn build_archive(artifact: &PackageArtifact) -> Result<Vec<u8>> {
    let (year, month, day, hour, minute, second) = ARCHIVE_MTIME;
    let mtime = DateTime::from_date_and_time(year, month, day, hour, minute, second)
        .map_err(|e| anyhow::anyhow!("Invalid archive timestamp: {e}"))?;

    let dir_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Stored)
        .last_modified_time(mtime)
        .unix_permissions(0o755);
    let file_options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(mtime)
        .unix_permissions(0o644);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    let mut dir = String::new();
    for segment in artifact.prefix_path.split('/').filter(|s| !s.is_empty()) {
        dir.push_str(segment);
        dir.push('/');
        writer
            .add_directory(dir.clone(), dir_options)
            .with_context(|| format!("Failed to add directory entry {dir}"))?;
    }

    for file in &artifact.files {
        let name = format!("{dir}{}", file.path);
        writer
            .start_file(name.clone(), file_options)
            .with_context(|| format!("Failed to add file entry {name}"))?;
        writer.write_all(&file.contents).with_context(|| format!("Failed to write {name}"))?;
    }

    let cursor = writer.finish().context("Failed to finalize package archive")?;
    Ok(cursor.into_inner())
}
