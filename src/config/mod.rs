//! Project configuration for condep.
//!
//! Conditions are declared in the project's `.yarnrc.yml`, next to the rest of
//! the package manager settings:
//!
//! ```yaml
//! defaultProtocol: "npm:"
//! conditions:
//!   useNative:
//!     source: env
//!     default: true
//!   legacyBuild: {}
//! ```
//!
//! Each condition has an evaluation `source` (only `env` is supported, and it
//! is the default) and a static `default` (defaults to `false`). The static
//! default is what the resolver hashes; the live environment value is only
//! consulted at materialize and pack time (see [`evaluator`]).
//!
//! The loaded [`ProjectConfig`] is passed explicitly to every resolver,
//! fetcher and evaluator call. Nothing in this crate reads configuration from
//! ambient process state, except the one environment variable per condition
//! that [`evaluator::evaluate`] consults.
//!
//! Unknown keys are ignored so the same file can carry unrelated settings.

pub mod evaluator;
mod parser;

pub use evaluator::{coerce_bool, env_lookup, evaluate, evaluate_with};
pub use parser::{parse_config, parse_config_str};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{CACHE_DIR_ENV, DEFAULT_PROTOCOL, ENV_SOURCE, RC_FILENAME};
use crate::core::CondepError;

/// Declaration of one named condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionConfig {
    /// Where the live value comes from; only `env` is supported
    #[serde(default = "default_source")]
    pub source: String,
    /// Value used when the source provides none, and the value resolution hashes
    #[serde(default)]
    pub default: bool,
}

fn default_source() -> String {
    ENV_SOURCE.to_string()
}

impl Default for ConditionConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            default: false,
        }
    }
}

impl ConditionConfig {
    /// Convenience constructor for an `env` condition with the given default.
    #[must_use]
    pub fn env(default: bool) -> Self {
        Self {
            source: default_source(),
            default,
        }
    }
}

/// How the resolver exposes branch dependencies to the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchStrategy {
    /// `npm:<base>@<range>` descriptors the host resolves directly.
    #[default]
    Qualified,
    /// `condition_proxy_internal:<base>:<range>` descriptors, resolved one
    /// indirection later through the proxy resolver.
    Proxy,
}

impl BranchStrategy {
    /// Name as written in `conditionBranches`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qualified => "qualified",
            Self::Proxy => "proxy",
        }
    }
}

/// Project-level settings consumed by the condition resolver, fetcher and evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    /// Declared conditions by name
    #[serde(default)]
    pub conditions: BTreeMap<String, ConditionConfig>,

    /// Protocol prepended to qualified branch ranges
    #[serde(default = "default_protocol")]
    pub default_protocol: String,

    /// Branch descriptor strategy
    #[serde(default)]
    pub condition_branches: BranchStrategy,

    /// Cache directory; relative paths are resolved against the project root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_folder: Option<PathBuf>,
}

fn default_protocol() -> String {
    DEFAULT_PROTOCOL.to_string()
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            conditions: BTreeMap::new(),
            default_protocol: default_protocol(),
            condition_branches: BranchStrategy::default(),
            cache_folder: None,
        }
    }
}

impl ProjectConfig {
    /// Load configuration from an explicit `.yarnrc.yml` path.
    ///
    /// Read and syntax failures surface as [`CondepError::ConfigError`] naming
    /// the file.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading project configuration from {}", path.display());
        parse_config(path).map_err(|e| {
            CondepError::ConfigError {
                message: format!("{}: {}", path.display(), e.root_cause()),
            }
            .into()
        })
    }

    /// Load the nearest `.yarnrc.yml` at or above `start`, or defaults if none exists.
    pub fn discover(start: &Path) -> Result<Self> {
        match find_rc_file(start) {
            Some(path) => Self::load_from(&path),
            None => {
                debug!("No {RC_FILENAME} found above {}, using defaults", start.display());
                Ok(Self::default())
            }
        }
    }

    /// Load from `explicit` when given, otherwise discover from `start`.
    pub fn load_with_optional(explicit: Option<&Path>, start: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Self::discover(start),
        }
    }

    /// Declare a condition, replacing any previous declaration.
    pub fn with_condition(mut self, name: impl Into<String>, condition: ConditionConfig) -> Self {
        self.conditions.insert(name.into(), condition);
        self
    }

    /// Look up a declared condition.
    ///
    /// # Errors
    ///
    /// [`CondepError::UnknownCondition`] when `name` is not declared, with the
    /// closest declared name as a suggestion.
    pub fn condition(&self, name: &str) -> Result<&ConditionConfig, CondepError> {
        self.conditions.get(name).ok_or_else(|| CondepError::UnknownCondition {
            name: name.to_string(),
            suggestion: self.closest_condition(name),
        })
    }

    /// Static default of a declared condition.
    ///
    /// This is the value digests are computed with, which keeps resolution
    /// independent of the environment it runs in.
    pub fn default_value(&self, name: &str) -> Result<bool, CondepError> {
        self.condition(name).map(|c| c.default)
    }

    /// Settings that change how branch descriptors are written into a
    /// generated package. Folded into every condition digest.
    #[must_use]
    pub fn branch_layout(&self) -> String {
        format!("{}|{}", self.condition_branches.as_str(), self.default_protocol)
    }

    fn closest_condition(&self, name: &str) -> Option<String> {
        self.conditions
            .keys()
            .map(|candidate| (strsim::jaro_winkler(name, candidate), candidate))
            .filter(|(score, _)| *score >= 0.8)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, candidate)| candidate.clone())
    }

    /// Directory holding generated package archives.
    pub fn cache_dir(&self, project_root: &Path) -> Result<PathBuf> {
        match &self.cache_folder {
            Some(folder) => Ok(project_root.join(folder)),
            None => get_cache_dir(),
        }
    }
}

/// Find the nearest `.yarnrc.yml` walking up from `start`.
#[must_use]
pub fn find_rc_file(start: &Path) -> Option<PathBuf> {
    start.ancestors().map(|dir| dir.join(RC_FILENAME)).find(|candidate| candidate.is_file())
}

/// Get the global cache directory.
///
/// `CONDEP_CACHE_DIR` wins when set; otherwise `~/.condep/cache` (or the local
/// data directory on Windows). The directory is created if missing.
pub fn get_cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(CACHE_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }

    let cache_dir = if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
            .join("condep")
            .join("cache")
    } else {
        dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?
            .join(".condep")
            .join("cache")
    };

    if !cache_dir.exists() {
        std::fs::create_dir_all(&cache_dir).with_context(|| {
            format!("Failed to create cache directory: {}", cache_dir.display())
        })?;
    }

    Ok(cache_dir)
}
