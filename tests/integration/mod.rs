//! Integration test suite for condep
//!
//! End-to-end tests that drive the `condep` binary against throwaway
//! projects.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **materialize**: `condep materialize` across workspace trees
//! - **pack_manifest**: `condep pack-manifest`
//! - **inspect**: `condep resolve` and `condep fetch`

mod inspect;
mod materialize;
mod pack_manifest;

use assert_cmd::Command;
use condep_cli::test_utils::TestProject;

/// `condep` running inside `project` with a private cache and a clean environment.
pub fn condep(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("condep").unwrap();
    cmd.current_dir(project.path())
        .env("CONDEP_CACHE_DIR", &project.cache_dir)
        .env_remove("RUST_LOG")
        .env_remove("useNative")
        .env_remove("legacy");
    cmd
}
