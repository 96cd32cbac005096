//! Test utilities for condep
//!
//! Helpers for writing tests: one-time logging setup and a builder that lays
//! out a throwaway project (workspace manifests, `.yarnrc.yml`, cache
//! directory) in a temporary directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use condep_cli::test_utils::TestProjectBuilder;
//!
//! let project = TestProjectBuilder::new()
//!     .unwrap()
//!     .with_rc("conditions:\n  useNative: {}\n")
//!     .with_manifest(r#"{"dependencies": {"a": "condition:useNative ? 1.0.0 : 2.0.0"}}"#)
//!     .build()
//!     .unwrap();
//! assert!(project.path().join("package.json").exists());
//! ```

pub mod builder;

pub use builder::{TestProject, TestProjectBuilder};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Installs the tracing subscriber once, however many tests call this. Uses
/// `level` when given, otherwise `RUST_LOG`; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=condep_cli=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .try_init();
    });
}
