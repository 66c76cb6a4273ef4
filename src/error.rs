//! Unified error handling for the transcite crate
//!
//! The extraction pipeline itself never fails: malformed rules are skipped and
//! empty input produces an empty list. Errors only surface while building
//! configuration, loading rule tables or talking to optional collaborators
//! (candidate sources, enrichers, the on-disk cache).
//!
//! # Usage
//!
//! ```rust,ignore
//! use transcite::error::{Error, ErrorCategory};
//!
//! fn handle_error(err: Error) {
//!     if err.is_recoverable() {
//!         tracing::warn!(error = %err, "collaborator failed, continuing");
//!     } else {
//!         eprintln!("fatal: {err}");
//!     }
//! }
//! ```

use std::io;
use thiserror::Error;

/// Classification of errors for handling strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration and rule-table errors
    Config,
    /// Malformed input documents (JSON transcripts, profiles)
    Input,
    /// External candidate source failures
    Source,
    /// Verification/enrichment failures
    Enrichment,
    /// Filesystem errors
    Io,
}

impl ErrorCategory {
    /// Short label used in log fields
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Input => "input",
            Self::Source => "source",
            Self::Enrichment => "enrichment",
            Self::Io => "io",
        }
    }
}

/// Unified error type for the transcite crate
#[derive(Error, Debug)]
pub enum Error {
    /// A pattern rule failed to compile
    #[error("Invalid pattern rule '{id}': {source}")]
    InvalidRule {
        id: String,
        #[source]
        source: regex::Error,
    },

    /// Invalid configuration value
    #[error("Invalid config value for '{field}' ({value}): {reason}")]
    InvalidConfig {
        field: String,
        value: String,
        reason: String,
    },

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// External candidate source failed
    #[error("Candidate source '{name}' failed: {reason}")]
    Source { name: String, reason: String },

    /// Enrichment collaborator failed
    #[error("Enricher '{name}' failed: {reason}")]
    Enrichment { name: String, reason: String },
}

impl Error {
    /// Create an invalid config error
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a candidate source error
    pub fn candidate_source(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Source {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an enrichment error
    pub fn enrichment(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::Enrichment {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Check if this error is recoverable (the pipeline can continue without the failing part)
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Source { .. } | Self::Enrichment { .. } => true,
            Self::InvalidRule { .. } => true, // the rule is skipped
            Self::Io(_) => true,
            Self::InvalidConfig { .. } | Self::Json(_) => false,
        }
    }

    /// Get the error category for handling strategies
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidRule { .. } | Self::InvalidConfig { .. } => ErrorCategory::Config,
            Self::Json(_) => ErrorCategory::Input,
            Self::Source { .. } => ErrorCategory::Source,
            Self::Enrichment { .. } => ErrorCategory::Enrichment,
            Self::Io(_) => ErrorCategory::Io,
        }
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
