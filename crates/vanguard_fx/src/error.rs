//! # Effect Error Types
//!
//! Errors surface only at configuration time. Nothing in the frame loop
//! returns an error: invalid per-frame values are clamped or dropped.

use thiserror::Error;

/// Errors that can occur while configuring effects.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FxError {
    /// A config value failed validation.
    #[error("invalid config `{field}`: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field.
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The config file could not be parsed.
    #[error("config parse error: {0}")]
    Parse(String),

    /// The config file could not be read.
    #[error("config io error: {0}")]
    Io(String),

    /// A variant key from the embedding page is not recognised.
    #[error("unknown {kind} variant `{key}`")]
    UnknownVariant {
        /// Which variant family (cursor, button, card).
        kind: &'static str,
        /// The key that was supplied.
        key: String,
    },
}

impl FxError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for effect configuration.
pub type FxResult<T> = Result<T, FxError>;
