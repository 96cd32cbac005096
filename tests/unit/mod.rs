//! Unit test suite for condep
//!
//! Library-level tests that exercise several modules together without going
//! through the binary.
//!
//! ```bash
//! cargo test --test unit
//! ```
//!
//! # Test Organization
//!
//! - **condition_tests**: grammar, canonical serialization and digests
//! - **resolver_tests**: the resolver state machine and registry routing
//! - **fetch_tests**: generated packages written through the zip cache
//! - **materialize_tests**: manifest transforms over workspace trees

mod condition_tests;
mod fetch_tests;
mod materialize_tests;
mod resolver_tests;
