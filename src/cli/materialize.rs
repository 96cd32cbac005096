//! Bake a condition's value into the workspace manifests.
//!
//! ```bash
//! condep materialize useNative          # value from $useNative, or the declared default
//! condep materialize useNative --true   # force the consequent
//! condep materialize useNative --dry-run
//! ```
//!
//! Every `condition:useNative ? a : b` range in the workspace tree is replaced
//! by `a` or `b` (or removed when that branch is empty), the `conditions`
//! block is applied, and the project is re-resolved before anything is
//! written. There is no way back: keep the manifests under version control.

use std::sync::Arc;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::config::env_lookup;
use crate::core::CondepError;
use crate::materialize::{materialize, resolve_value};
use crate::project::Project;
use crate::resolver::ResolverRegistry;

/// Arguments of `condep materialize`.
#[derive(Debug, Args)]
pub struct MaterializeCommand {
    /// Condition to materialize
    condition: String,

    /// Materialize as if the condition were true
    #[arg(long = "true")]
    force_true: bool,

    /// Materialize as if the condition were false
    #[arg(long = "false")]
    force_false: bool,

    /// Show what would change without writing any manifest
    #[arg(long)]
    dry_run: bool,
}

impl MaterializeCommand {
    fn forced_value(&self) -> Result<Option<bool>, CondepError> {
        match (self.force_true, self.force_false) {
            (true, true) => Err(CondepError::ConflictingOptions),
            (true, false) => Ok(Some(true)),
            (false, true) => Ok(Some(false)),
            (false, false) => Ok(None),
        }
    }

    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let forced = self.forced_value()?;
        let value = resolve_value(&ctx.config, &self.condition, forced, env_lookup)?;

        let mut project = Project::load(&ctx.cwd, ctx.config.clone())?;
        let summary = materialize(&mut project.root, &self.condition, value)?;

        // The new ranges must resolve before they are written
        let resolution = project.resolve_everything(Arc::new(ResolverRegistry::with_defaults())).await?;

        if !self.dry_run && summary.changed() {
            project.root.persist()?;
        }

        if !ctx.quiet {
            let verb = if self.dry_run { "Would materialize" } else { "Materialized" };
            println!(
                "{} {} as {}",
                verb.green().bold(),
                self.condition.bold(),
                value.to_string().cyan()
            );
            println!("  {} workspaces", summary.workspaces);
            println!("  {} ranges replaced", summary.replaced);
            println!("  {} ranges removed", summary.removed);
            if summary.properties_applied > 0 {
                println!("  {} property sets applied", summary.properties_applied);
            }
            if !resolution.packages.is_empty() {
                println!("  {} conditional packages remain", resolution.packages.len());
            }
            if !summary.changed() {
                println!("{}", "Nothing to change".yellow());
            }
        }
        Ok(())
    }
}
