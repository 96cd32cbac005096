//! Command-line interface for condep.
//!
//! # Available Commands
//!
//! - `materialize` - Collapse one condition to a literal branch across the workspace tree
//! - `pack-manifest` - Print a workspace manifest with every condition resolved
//! - `resolve` - Show how a condition or proxy descriptor resolves
//! - `fetch` - Generate the package archive for a resolved locator
//!
//! # Example
//!
//! ```bash
//! # Bake the current value of $useNative into every package.json
//! condep materialize useNative
//!
//! # Force a value regardless of the environment
//! condep materialize useNative --false
//!
//! # Inspect a descriptor
//! condep resolve 'pkg@condition:useNative ? 1.0.0 : 2.0.0' --json
//! ```
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only print errors
//! - `--cwd` - Run as if started in another directory
//! - `--rc-path` - Explicit `.yarnrc.yml` instead of discovery

mod fetch;
mod materialize;
mod pack_manifest;
mod resolve;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{ProjectConfig, find_rc_file};

/// Main CLI application structure for condep.
#[derive(Parser)]
#[command(
    name = "condep",
    about = "Conditional dependency ranges for package.json workspaces",
    version,
    author,
    long_about = "condep resolves `condition:<test> ? <consequent> : <alternate>` dependency ranges into runtime-selecting packages, and can bake a condition's value into the manifests for publishing."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (equivalent to `RUST_LOG=debug`)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Working directory to run in
    #[arg(long, global = true, value_name = "DIR")]
    cwd: Option<PathBuf>,

    /// Path to the project configuration file
    ///
    /// By default the nearest `.yarnrc.yml` at or above the working directory
    /// is used.
    #[arg(long, global = true, value_name = "FILE")]
    rc_path: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replace a condition's ranges with the branch it evaluates to
    Materialize(materialize::MaterializeCommand),

    /// Print a manifest with every condition resolved for publishing
    PackManifest(pack_manifest::PackManifestCommand),

    /// Show how a descriptor resolves
    Resolve(resolve::ResolveCommand),

    /// Generate the package archive for a locator
    Fetch(fetch::FetchCommand),
}

/// Shared state every command starts from.
pub(crate) struct CommandContext {
    /// Directory the command runs in
    pub cwd: PathBuf,
    /// Directory holding the configuration file, or `cwd` when none exists
    pub project_root: PathBuf,
    /// Loaded project configuration
    pub config: ProjectConfig,
    /// Suppress informational output
    pub quiet: bool,
}

impl CommandContext {
    fn load(cwd: Option<&Path>, rc_path: Option<&Path>, quiet: bool) -> Result<Self> {
        let cwd = match cwd {
            Some(dir) => dir.to_path_buf(),
            None => std::env::current_dir().context("Failed to determine working directory")?,
        };
        let rc_file = rc_path.map(Path::to_path_buf).or_else(|| find_rc_file(&cwd));
        let project_root = rc_file
            .as_deref()
            .and_then(Path::parent)
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| cwd.clone(), Path::to_path_buf);
        let config = ProjectConfig::load_with_optional(rc_path, &cwd)?;
        debug!(
            "Running in {} with {} declared conditions",
            cwd.display(),
            config.conditions.len()
        );

        Ok(Self {
            cwd,
            project_root,
            config,
            quiet,
        })
    }
}

impl Cli {
    /// Log filter implied by `--verbose` / `--quiet`, if any.
    #[must_use]
    pub const fn log_filter(&self) -> Option<&'static str> {
        if self.verbose {
            Some("debug")
        } else if self.quiet {
            Some("error")
        } else {
            None
        }
    }

    /// Run the selected command.
    pub async fn execute(self) -> Result<()> {
        let ctx = CommandContext::load(self.cwd.as_deref(), self.rc_path.as_deref(), self.quiet)?;
        match self.command {
            Commands::Materialize(cmd) => cmd.execute(&ctx).await,
            Commands::PackManifest(cmd) => cmd.execute(&ctx),
            Commands::Resolve(cmd) => cmd.execute(&ctx),
            Commands::Fetch(cmd) => cmd.execute(&ctx).await,
        }
    }
}
