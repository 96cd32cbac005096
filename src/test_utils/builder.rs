//! Test project builder for simplified test setup
//!
//! Lays out a workspace tree, a `.yarnrc.yml` and a private cache directory in
//! a temporary directory with a fluent API.

use anyhow::Result;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::cache::ZipCache;
use crate::config::ProjectConfig;
use crate::constants::{MANIFEST_FILENAME, RC_FILENAME};
use crate::utils::read_json_file;

/// A builder for creating test projects with a fluent API
pub struct TestProjectBuilder {
    temp_dir: TempDir,
    rc: Option<String>,
    files: Vec<(String, String)>,
}

impl TestProjectBuilder {
    /// Create a new test project builder
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp_dir: TempDir::new()?,
            rc: None,
            files: Vec::new(),
        })
    }

    /// Write `.yarnrc.yml` with the given YAML
    pub fn with_rc(mut self, yaml: impl Into<String>) -> Self {
        self.rc = Some(yaml.into());
        self
    }

    /// Write the root `package.json`
    pub fn with_manifest(self, manifest: impl Into<String>) -> Self {
        self.with_file(MANIFEST_FILENAME, manifest)
    }

    /// Write a nested workspace's `package.json` under `dir`
    pub fn with_workspace(self, dir: &str, manifest: impl Into<String>) -> Self {
        self.with_file(format!("{dir}/{MANIFEST_FILENAME}"), manifest)
    }

    /// Add a file to be created in the project
    pub fn with_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.files.push((path.into(), content.into()));
        self
    }

    /// Build the test project
    pub fn build(self) -> Result<TestProject> {
        let project_dir = self.temp_dir.path().join("project");
        let cache_dir = self.temp_dir.path().join("cache");
        std::fs::create_dir_all(&project_dir)?;
        std::fs::create_dir_all(&cache_dir)?;

        if let Some(rc) = &self.rc {
            std::fs::write(project_dir.join(RC_FILENAME), rc)?;
        }

        for (path, content) in &self.files {
            let full_path = project_dir.join(path);
            if let Some(parent) = full_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(full_path, content)?;
        }

        Ok(TestProject {
            _temp_dir: self.temp_dir,
            project_dir,
            cache_dir,
        })
    }
}

/// A built test project
pub struct TestProject {
    _temp_dir: TempDir, // Keep temp dir alive
    /// Project root
    pub project_dir: PathBuf,
    /// Cache directory outside the project
    pub cache_dir: PathBuf,
}

impl TestProject {
    /// Root of the project
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.project_dir
    }

    /// Parse the manifest of the workspace at `dir` (relative, `""` for the root)
    pub fn manifest(&self, dir: &str) -> Result<Value> {
        read_json_file(&self.project_dir.join(dir).join(MANIFEST_FILENAME))
    }

    /// Raw text of a project file
    pub fn read(&self, path: &str) -> Result<String> {
        Ok(std::fs::read_to_string(self.project_dir.join(path))?)
    }

    /// Load the project's `.yarnrc.yml`, or defaults when none was written
    pub fn config(&self) -> Result<ProjectConfig> {
        let rc = self.project_dir.join(RC_FILENAME);
        if rc.is_file() { ProjectConfig::load_from(&rc) } else { Ok(ProjectConfig::default()) }
    }

    /// Cache rooted in this project's private cache directory
    #[must_use]
    pub fn cache(&self) -> ZipCache {
        ZipCache::new(self.cache_dir.clone())
    }
}
