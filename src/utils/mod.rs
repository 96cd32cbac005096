//! Shared helpers.
//!
//! - [`fs`] - atomic writes and JSON file I/O

pub mod fs;

pub use fs::{atomic_write, read_json_file, write_json_file};
