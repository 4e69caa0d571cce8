//! # Content Error Types
//!
//! All errors that can occur while loading or validating site content.

use thiserror::Error;

/// Errors that can occur in the content layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContentError {
    /// The catalog document is not valid TOML or has unknown keys.
    #[error("catalog parse error: {0}")]
    Parse(String),

    /// The catalog file could not be read.
    #[error("catalog io error: {0}")]
    Io(String),

    /// Two records in one table share an id.
    #[error("duplicate id `{id}` in table `{table}`")]
    DuplicateId {
        /// Table name.
        table: &'static str,
        /// The repeated id.
        id: String,
    },

    /// A record violates a field constraint.
    #[error("invalid record `{id}` in table `{table}`: {reason}")]
    InvalidRecord {
        /// Table name.
        table: &'static str,
        /// Offending record id (may be empty).
        id: String,
        /// What is wrong with it.
        reason: String,
    },
}

/// Result type for content operations.
pub type ContentResult<T> = Result<T, ContentError>;
