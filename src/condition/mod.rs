//! The `condition:` dependency protocol.
//!
//! A dependency range such as `condition:useNative ? 1.2.0 : (workspace:*)`
//! picks one of two ranges based on a named boolean condition. This module
//! holds the pieces every other layer builds on:
//!
//! - [`expression`] - the parsed [`ConditionExpression`] and its [`BranchRange`]s
//! - [`parser`] - [`parse`], the grammar
//! - [`codec`] - [`serialize`], the canonical writer, and descriptor/locator builders
//! - [`fingerprint`] - [`digest`], the content-addressed version stamp
//! - [`qualify`](mod@qualify) - [`qualify()`], branch descriptors the host resolves first

pub mod codec;
pub mod expression;
pub mod fingerprint;
pub mod parser;
pub mod qualify;

pub use codec::{
    has_condition_protocol, make_descriptor, make_locator, parse_descriptor, parse_locator,
    serialize,
};
pub use expression::{BranchRange, ConditionExpression};
pub use fingerprint::digest;
pub use parser::parse;
pub use qualify::{QualifiedDescriptor, qualified_ident, qualify};
