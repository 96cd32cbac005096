//! condep - conditional dependency ranges for `package.json` workspaces
//!
//! A dependency range such as
//!
//! ```text
//! "native-bindings": "condition:useNative ? 2.1.0 : (workspace:*)"
//! ```
//!
//! installs *both* branches and lets the installed package pick one at
//! runtime by reading the `useNative` environment variable. Before
//! publishing, `condep materialize useNative` (or the pack-time transform)
//! bakes the chosen branch back into the manifest.
//!
//! # Architecture Overview
//!
//! A condition range flows through the same stages a package manager applies
//! to any other protocol:
//!
//! 1. [`condition`] parses the range and computes its digest from the
//!    declared static default, never from the live environment.
//! 2. [`resolver`] turns a condition descriptor into one synthetic locator and
//!    exposes the branch descriptors the host resolves next. Branches are
//!    either qualified directly (`npm:base@range`) or wrapped by the
//!    [`proxy`] protocol.
//! 3. [`fetcher`] generates the synthetic package (a manifest plus CommonJS
//!    and ES-module selectors) and stores it as a zip in the [`cache`].
//! 4. [`materialize`] rewrites manifests in a [`workspace`] tree once a
//!    condition's value is final.
//!
//! # Core Modules
//!
//! - [`constants`] - protocol prefixes, cache version and manifest field names
//! - [`core`] - the [`core::CondepError`] taxonomy and CLI error presentation
//! - [`models`] - idents, descriptors, locators and package records
//! - [`config`] - `.yarnrc.yml` project configuration and condition evaluation
//! - [`archive`] - deterministic zip archives
//! - [`project`] - whole-project resolution
//! - [`cli`] - the `condep` command surface
//! - [`utils`] - atomic file writes and JSON helpers
//!
//! # Configuration
//!
//! ```yaml
//! # .yarnrc.yml
//! conditions:
//!   useNative:
//!     default: true
//! conditionBranches: proxy
//! ```

pub mod archive;
pub mod cache;
pub mod cli;
pub mod condition;
pub mod config;
pub mod constants;
pub mod core;
pub mod fetcher;
pub mod materialize;
pub mod models;
pub mod project;
pub mod proxy;
pub mod resolver;
pub mod utils;
pub mod workspace;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
