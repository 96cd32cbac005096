//! Core types and error handling for condep.
//!
//! This module hosts the crate-wide error taxonomy ([`CondepError`]) and the
//! CLI presentation helpers ([`ErrorContext`], [`user_friendly_error`]).
//! Pure operations (parsing, serialization, resolution) return
//! `Result<T, CondepError>`; orchestration code that touches the filesystem
//! uses `anyhow::Result` and attaches context as it propagates.

pub mod error;

pub use error::{CondepError, ErrorContext, user_friendly_error};
