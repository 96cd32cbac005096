//! Generic configuration parsing utilities.
//!
//! Reads a YAML file into any `DeserializeOwned` type, attaching the file path
//! to both read and parse failures.
//!
//! ```rust,no_run
//! use condep_cli::config::{ProjectConfig, parse_config};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config: ProjectConfig = parse_config(Path::new(".yarnrc.yml"))?;
//! println!("{} conditions declared", config.conditions.len());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use std::path::Path;

use crate::core::CondepError;

/// Parse a YAML configuration file.
///
/// An empty file deserializes as an empty mapping, so every field falls back
/// to its serde default.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    parse_config_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Parse YAML configuration text.
pub fn parse_config_str<T>(content: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = if content.trim().is_empty() { "{}" } else { content };
    Ok(serde_yaml::from_str(content).map_err(CondepError::YamlError)?)
}
