//! Error handling for condep
//!
//! This module provides the strongly-typed error taxonomy used across the crate
//! and the user-facing presentation layer for the CLI. The split mirrors how the
//! library is used:
//! 1. **Strongly-typed errors** ([`CondepError`]) returned by the pure grammar,
//!    resolution and configuration operations
//! 2. **User-friendly messages** ([`ErrorContext`]) with actionable suggestions,
//!    produced by [`user_friendly_error`] at the CLI boundary
//!
//! # Error Categories
//!
//! - **Grammar**: [`CondepError::Grammar`] for malformed condition or proxy ranges
//! - **Configuration**: [`CondepError::UnknownCondition`], [`CondepError::UnsupportedSource`],
//!   [`CondepError::ConfigError`]
//! - **Command surface**: [`CondepError::ConflictingOptions`]
//! - **Workspace**: [`CondepError::ManifestNotFound`], [`CondepError::ManifestParseError`]
//! - **Cache**: [`CondepError::ChecksumMismatch`]
//!
//! Archive and cache I/O errors are passed through from [`std::io::Error`] and
//! [`zip::result::ZipError`] without being re-wrapped.
//!
//! # Examples
//!
//! ```rust,no_run
//! use condep_cli::core::{CondepError, ErrorContext, user_friendly_error};
//!
//! let error = CondepError::UnknownCondition {
//!     name: "useNative".to_string(),
//!     suggestion: None,
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

use crate::constants::RC_FILENAME;

/// The main error type for condep operations
///
/// Each variant names one specific failure mode. Grammar errors keep the
/// offending index and the original text so the user can locate the problem
/// inside a long range string.
#[derive(Error, Debug)]
pub enum CondepError {
    /// A condition or proxy range does not match the grammar.
    ///
    /// # Fields
    /// - `message`: What the parser expected or found
    /// - `index`: Byte offset into `source_text` where parsing stopped
    /// - `source_text`: The complete range being parsed
    #[error("{message} at index {index} ({source_text})")]
    Grammar {
        /// What the parser expected or found
        message: String,
        /// Byte offset where parsing stopped
        index: usize,
        /// The complete range being parsed
        source_text: String,
    },

    /// A condition test name is not declared in the project configuration.
    #[error("Unknown condition: {name}. You must add it to your .yarnrc.yml file.")]
    UnknownCondition {
        /// The undeclared test name
        name: String,
        /// Closest declared name, when one is similar enough
        suggestion: Option<String>,
    },

    /// A condition declares an evaluation source other than `env`.
    #[error("The only supported configuration source is 'env' (condition '{name}' uses '{source_kind}')")]
    UnsupportedSource {
        /// The condition name
        name: String,
        /// The declared source kind
        source_kind: String,
    },

    /// Both `--true` and `--false` were requested at once.
    #[error("The --true and --false options are mutually exclusive")]
    ConflictingOptions,

    /// A descriptor or locator string could not be split into ident and range.
    #[error("Invalid descriptor '{input}': {reason}")]
    InvalidDescriptor {
        /// The offending text
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// A branch qualifier was asked to qualify an empty range.
    #[error("Cannot qualify an empty branch of condition '{test}'")]
    EmptyBranch {
        /// The condition whose branch was empty
        test: String,
    },

    /// No `package.json` could be found.
    #[error("Manifest file package.json not found from {path}")]
    ManifestNotFound {
        /// Directory the search started from
        path: String,
    },

    /// A workspace manifest is not a JSON object or failed to parse.
    #[error("Invalid manifest file syntax in {file}: {reason}")]
    ManifestParseError {
        /// Path to the manifest
        file: String,
        /// Parser or shape error
        reason: String,
    },

    /// A cached archive does not match the expected checksum.
    #[error("Checksum mismatch for package '{name}': expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Locator of the package
        name: String,
        /// Checksum recorded by the host
        expected: String,
        /// Checksum of the cached archive
        actual: String,
    },

    /// No registered resolver could handle a descriptor.
    #[error("Cannot resolve '{descriptor}': {reason}")]
    ResolutionFailed {
        /// The descriptor being resolved
        descriptor: String,
        /// Why it failed
        reason: String,
    },

    /// Project configuration is malformed.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// Generic error
    #[error("{message}")]
    Other {
        /// Error message
        message: String,
    },
}

impl Clone for CondepError {
    fn clone(&self) -> Self {
        match self {
            Self::Grammar {
                message,
                index,
                source_text,
            } => Self::Grammar {
                message: message.clone(),
                index: *index,
                source_text: source_text.clone(),
            },
            Self::UnknownCondition {
                name,
                suggestion,
            } => Self::UnknownCondition {
                name: name.clone(),
                suggestion: suggestion.clone(),
            },
            Self::UnsupportedSource {
                name,
                source_kind,
            } => Self::UnsupportedSource {
                name: name.clone(),
                source_kind: source_kind.clone(),
            },
            Self::ConflictingOptions => Self::ConflictingOptions,
            Self::InvalidDescriptor {
                input,
                reason,
            } => Self::InvalidDescriptor {
                input: input.clone(),
                reason: reason.clone(),
            },
            Self::EmptyBranch {
                test,
            } => Self::EmptyBranch {
                test: test.clone(),
            },
            Self::ManifestNotFound {
                path,
            } => Self::ManifestNotFound {
                path: path.clone(),
            },
            Self::ManifestParseError {
                file,
                reason,
            } => Self::ManifestParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ChecksumMismatch {
                name,
                expected,
                actual,
            } => Self::ChecksumMismatch {
                name: name.clone(),
                expected: expected.clone(),
                actual: actual.clone(),
            },
            Self::ResolutionFailed {
                descriptor,
                reason,
            } => Self::ResolutionFailed {
                descriptor: descriptor.clone(),
                reason: reason.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // For errors that don't implement Clone, convert to Other
            Self::IoError(e) => Self::Other {
                message: format!("IO error: {e}"),
            },
            Self::JsonError(e) => Self::Other {
                message: format!("JSON error: {e}"),
            },
            Self::YamlError(e) => Self::Other {
                message: format!("YAML error: {e}"),
            },
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

impl CondepError {
    /// Build a grammar error pointing at `index` inside `source_text`.
    pub(crate) fn grammar(message: impl Into<String>, index: usize, source_text: &str) -> Self {
        Self::Grammar {
            message: message.into(),
            index,
            source_text: source_text.to_string(),
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Wraps a [`CondepError`] with an optional suggestion (printed in green) and
/// optional details (printed in yellow).
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying condep error
    pub error: CondepError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: CondepError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`CondepError`] anywhere in the chain, then [`std::io::Error`],
/// and falls back to the full error chain for everything else.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(condep_error) = error.chain().find_map(|e| e.downcast_ref::<CondepError>()) {
        return create_error_context(condep_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        if io_error.kind() == std::io::ErrorKind::PermissionDenied {
            return ErrorContext::new(CondepError::Other {
                message: error.to_string(),
            })
            .with_suggestion("Check file ownership and permissions of the project and cache directories");
        }
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(CondepError::Other {
        message,
    })
}

fn create_error_context(error: CondepError) -> ErrorContext {
    match &error {
        CondepError::Grammar {
            ..
        } => ErrorContext::new(error).with_details(
            "Condition ranges look like 'condition:<test> ? <range> : <range>'. \
             Wrap branches containing ':', '?' or '#' in parentheses",
        ),
        CondepError::UnknownCondition {
            name,
            suggestion,
        } => {
            let hint = match suggestion {
                Some(similar) => format!("Did you mean '{similar}'?"),
                None => format!(
                    "Declare it under 'conditions:' in {RC_FILENAME}, e.g.\n  conditions:\n    {name}:\n      default: false"
                ),
            };
            ErrorContext::new(error).with_suggestion(hint)
        }
        CondepError::UnsupportedSource {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Set 'source: env' or remove the 'source' key from the condition"),
        CondepError::ConflictingOptions => {
            ErrorContext::new(error).with_suggestion("Pass only one of --true or --false")
        }
        CondepError::ManifestNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Run the command from inside a project containing a package.json"),
        CondepError::ConfigError {
            ..
        } => ErrorContext::new(error)
            .with_suggestion(format!("Check the syntax of {RC_FILENAME} or pass another file with --rc-path")),
        CondepError::ChecksumMismatch {
            ..
        } => ErrorContext::new(error).with_suggestion(
            "Remove the cached archive or pass --skip-integrity-check to regenerate it",
        ),
        _ => ErrorContext::new(error),
    }
}
