//! Show how one descriptor resolves.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;

use super::CommandContext;
use crate::core::CondepError;
use crate::models::Descriptor;
use crate::project::resolve_descriptor;
use crate::resolver::ResolverRegistry;

/// Arguments of `condep resolve`.
#[derive(Debug, Args)]
pub struct ResolveCommand {
    /// Descriptor to resolve, e.g. `pkg@condition:useNative ? 1.0.0 : 2.0.0`
    descriptor: String,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,
}

impl ResolveCommand {
    pub(crate) fn execute(self, ctx: &CommandContext) -> Result<()> {
        let descriptor = Descriptor::parse(&self.descriptor)?;
        let registry = ResolverRegistry::with_defaults();
        let resolved = resolve_descriptor(&registry, &ctx.config, &descriptor)?.ok_or_else(|| {
            CondepError::ResolutionFailed {
                descriptor: descriptor.to_string(),
                reason: "not a condition or proxy range".to_string(),
            }
        })?;

        if self.json {
            let out = json!({
                "descriptor": resolved.descriptor,
                "dependencies": resolved.dependencies,
                "locator": resolved.locator,
                "package": resolved.package,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
            return Ok(());
        }

        println!("{} {}", "Descriptor:".bold(), resolved.descriptor);
        println!("{} {}", "Locator:".bold(), resolved.locator.to_string().green());
        println!("{} {}", "Version:".bold(), resolved.package.version);
        println!("{}", "Resolution dependencies:".bold());
        for dependency in &resolved.dependencies {
            println!("  {dependency}");
        }
        if !resolved.package.peer_dependencies.is_empty() {
            println!("{}", "Peer dependencies:".bold());
            for peer in resolved.package.peer_dependencies.values() {
                println!("  {peer}");
            }
        }
        Ok(())
    }
}
