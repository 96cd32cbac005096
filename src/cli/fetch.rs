//! Generate a synthetic package archive into the cache.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use super::CommandContext;
use crate::cache::{TracingReport, ZipCache};
use crate::fetcher::{FetchOptions, FetcherRegistry};
use crate::models::Locator;

/// Arguments of `condep fetch`.
#[derive(Debug, Args)]
pub struct FetchCommand {
    /// Locator to fetch, e.g. `pkg@condition:useNative?1.0.0:2.0.0#abc123`
    locator: String,

    /// Expected archive checksum (`sha256:<hex>`)
    #[arg(long)]
    checksum: Option<String>,

    /// Keep a cached archive even if its checksum differs
    #[arg(long)]
    skip_integrity_check: bool,
}

impl FetchCommand {
    pub(crate) async fn execute(self, ctx: &CommandContext) -> Result<()> {
        let locator = Locator::parse(&self.locator)?;
        let cache = ZipCache::new(ctx.config.cache_dir(&ctx.project_root)?);

        let mut checksums = BTreeMap::new();
        if let Some(checksum) = self.checksum {
            checksums.insert(locator.clone(), checksum);
        }
        let report = TracingReport;
        let opts = FetchOptions {
            config: &ctx.config,
            cache: &cache,
            checksums: &checksums,
            report: &report,
            skip_integrity_check: self.skip_integrity_check,
        };

        let result = FetcherRegistry::with_defaults().fetch(&locator, &opts).await?;

        if ctx.quiet {
            println!("{}", result.archive_path.display());
        } else {
            println!("{} {}", "Fetched".green().bold(), result.locator);
            println!("  {} {}", "archive:".bold(), result.archive_path.display());
            println!("  {} {}", "prefix:".bold(), result.prefix_path);
            println!("  {} {}", "checksum:".bold(), result.checksum);
        }
        Ok(())
    }
}
