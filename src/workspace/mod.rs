//! `package.json` workspace trees.
//!
//! A [`Workspace`] is a directory with a `package.json`. Its `workspaces` field
//! (either an array of glob patterns or `{ "packages": [...] }`) names child
//! workspaces, which are loaded recursively. Manifests are kept as raw JSON
//! objects with their original key order. Persisting a tree only rewrites the
//! manifests a transform actually changed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::condition::has_condition_protocol;
use crate::constants::{DEPENDENCY_TYPES, MANIFEST_FILENAME};
use crate::core::CondepError;
use crate::models::{Descriptor, Ident};
use crate::proxy::is_condition_proxy;
use crate::utils::fs::write_json_file;

/// One workspace and its nested workspaces.
#[derive(Debug, Clone, PartialEq)]
pub struct Workspace {
    /// Workspace directory
    pub cwd: PathBuf,
    /// Raw manifest
    pub manifest: Map<String, Value>,
    /// Nested workspaces in discovery order
    pub children: Vec<Workspace>,
    /// Manifest as last read from or written to disk
    on_disk: Map<String, Value>,
}

impl Workspace {
    /// Load the workspace at `cwd` and every workspace nested below it.
    pub fn load(cwd: &Path) -> Result<Self> {
        let mut visited = Vec::new();
        Self::load_inner(cwd, &mut visited)
    }

    /// Load the workspace owning `start`: the nearest ancestor with a `package.json`.
    pub fn find(start: &Path) -> Result<Self> {
        let cwd = start
            .ancestors()
            .find(|dir| dir.join(MANIFEST_FILENAME).is_file())
            .ok_or_else(|| CondepError::ManifestNotFound {
                path: start.display().to_string(),
            })?;
        Self::load(cwd)
    }

    fn load_inner(cwd: &Path, visited: &mut Vec<PathBuf>) -> Result<Self> {
        let cwd = cwd.canonicalize().unwrap_or_else(|_| cwd.to_path_buf());
        visited.push(cwd.clone());

        let manifest = read_manifest(&cwd)?;
        let mut children = Vec::new();

        for pattern in workspace_patterns(&manifest) {
            for child in expand_pattern(&cwd, &pattern)? {
                if visited.contains(&child) {
                    continue;
                }
                if !child.join(MANIFEST_FILENAME).is_file() {
                    warn!("Skipping workspace {} (no {MANIFEST_FILENAME})", child.display());
                    continue;
                }
                children.push(Self::load_inner(&child, visited)?);
            }
        }

        debug!("Loaded workspace {} with {} children", cwd.display(), children.len());
        Ok(Self {
            cwd,
            on_disk: manifest.clone(),
            manifest,
            children,
        })
    }

    /// Path of this workspace's `package.json`.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.cwd.join(MANIFEST_FILENAME)
    }

    /// Package name, if the manifest has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.manifest.get("name").and_then(Value::as_str)
    }

    /// Label for logs: the package name, or the directory.
    #[must_use]
    pub fn label(&self) -> String {
        self.name().map_or_else(|| self.cwd.display().to_string(), str::to_string)
    }

    /// This workspace and every nested one, depth-first, parents before children.
    #[must_use]
    pub fn iter(&self) -> Vec<&Workspace> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.iter());
        }
        out
    }

    /// Visit this workspace and every nested one, depth-first, parents first.
    pub fn try_for_each_mut<E, F>(&mut self, f: &mut F) -> Result<(), E>
    where
        F: FnMut(&mut Workspace) -> Result<(), E>,
    {
        f(self)?;
        for child in &mut self.children {
            child.try_for_each_mut(f)?;
        }
        Ok(())
    }

    /// Condition and proxy descriptors declared in this workspace's dependency fields.
    pub fn protocol_descriptors(&self) -> Result<Vec<Descriptor>, CondepError> {
        let mut out = Vec::new();
        for field in DEPENDENCY_TYPES {
            let Some(entries) = self.manifest.get(field).and_then(Value::as_object) else {
                continue;
            };
            for (name, range) in entries {
                let Some(range) = range.as_str() else {
                    continue;
                };
                if has_condition_protocol(range) || is_condition_proxy(range) {
                    out.push(Descriptor::new(Ident::parse(name)?, range));
                }
            }
        }
        Ok(out)
    }

    /// Whether the manifest differs from what is on disk.
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.manifest != self.on_disk
    }

    /// Write every modified manifest in the tree and return how many were written.
    pub fn persist(&mut self) -> Result<usize> {
        let mut written = 0;
        self.try_for_each_mut(&mut |workspace: &mut Workspace| {
            if !workspace.is_modified() {
                return Ok::<(), anyhow::Error>(());
            }
            let path = workspace.manifest_path();
            write_json_file(&path, &Value::Object(workspace.manifest.clone()))?;
            workspace.on_disk = workspace.manifest.clone();
            written += 1;
            debug!("Persisted {}", path.display());
            Ok(())
        })?;
        Ok(written)
    }
}

fn read_manifest(cwd: &Path) -> Result<Map<String, Value>> {
    let path = cwd.join(MANIFEST_FILENAME);
    if !path.is_file() {
        return Err(CondepError::ManifestNotFound {
            path: cwd.display().to_string(),
        }
        .into());
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(CondepError::ManifestParseError {
            file: path.display().to_string(),
            reason: "expected a JSON object".to_string(),
        }
        .into()),
        Err(e) => Err(CondepError::ManifestParseError {
            file: path.display().to_string(),
            reason: e.to_string(),
        }
        .into()),
    }
}

fn workspace_patterns(manifest: &Map<String, Value>) -> Vec<String> {
    let list = match manifest.get("workspaces") {
        Some(Value::Array(items)) => items,
        Some(Value::Object(obj)) => match obj.get("packages") {
            Some(Value::Array(items)) => items,
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };
    list.iter().filter_map(Value::as_str).map(str::to_string).collect()
}

fn expand_pattern(cwd: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    if pattern.starts_with('!') {
        debug!("Ignoring negated workspace pattern {pattern}");
        return Ok(Vec::new());
    }

    let full = cwd.join(pattern);
    let full = full.to_string_lossy();
    let mut dirs: Vec<PathBuf> = glob::glob(&full)
        .with_context(|| format!("Invalid workspace pattern: {pattern}"))?
        .filter_map(std::result::Result::ok)
        .filter(|path| path.is_dir())
        .map(|path| path.canonicalize().unwrap_or(path))
        .collect();
    dirs.sort();
    Ok(dirs)
}
