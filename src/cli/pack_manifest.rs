//! Print the manifest a workspace would be published with.
//!
//! Every condition range is replaced by the branch its test currently
//! evaluates to, and the `conditions` block is applied and dropped. The
//! workspace on disk is left untouched unless `--write` is given.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde_json::Value;
use tracing::info;

use super::CommandContext;
use crate::config::env_lookup;
use crate::constants::MANIFEST_FILENAME;
use crate::core::CondepError;
use crate::materialize::prepare_for_pack;
use crate::utils::{read_json_file, write_json_file};

/// Arguments of `condep pack-manifest`.
#[derive(Debug, Args)]
pub struct PackManifestCommand {
    /// Manifest to transform (defaults to `package.json` in the working directory)
    #[arg(long, value_name = "FILE")]
    manifest: Option<PathBuf>,

    /// Overwrite the manifest instead of printing it
    #[arg(long)]
    write: bool,
}

impl PackManifestCommand {
    pub(crate) fn execute(self, ctx: &CommandContext) -> Result<()> {
        let path = self.manifest.unwrap_or_else(|| ctx.cwd.join(MANIFEST_FILENAME));
        if !path.is_file() {
            return Err(CondepError::ManifestNotFound {
                path: ctx.cwd.display().to_string(),
            }
            .into());
        }

        let mut manifest = match read_json_file::<Value>(&path)? {
            Value::Object(map) => map,
            _ => {
                return Err(CondepError::ManifestParseError {
                    file: path.display().to_string(),
                    reason: "expected a JSON object".to_string(),
                }
                .into());
            }
        };

        let summary = prepare_for_pack(&mut manifest, &ctx.config, env_lookup)?;
        let manifest = Value::Object(manifest);

        if self.write {
            write_json_file(&path, &manifest)?;
            info!(
                "Wrote {} ({} replaced, {} removed)",
                path.display(),
                summary.replaced,
                summary.removed
            );
        } else {
            println!("{}", serde_json::to_string_pretty(&manifest)?);
        }
        Ok(())
    }
}
