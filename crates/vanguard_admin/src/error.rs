//! # Admin Error Types
//!
//! Everything that can go wrong talking to the hosted backend. Screens
//! catch these and turn them into a visible message; nothing here is ever
//! allowed to reach the frame loop.

use thiserror::Error;
use vanguard_content::ContentError;

/// Errors that can occur in the admin back office.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdminError {
    /// The request never got a response (DNS, TLS, timeout, offline).
    #[error("backend unreachable: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {message}")]
    Backend {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// A response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),

    /// The addressed row or object does not exist.
    #[error("`{id}` not found in `{table}`")]
    NotFound {
        /// Table or bucket name.
        table: String,
        /// Row id or object path.
        id: String,
    },

    /// Backend settings are missing or malformed.
    #[error("backend config: {0}")]
    Config(String),

    /// A record failed validation before it was sent.
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl AdminError {
    /// True for failures worth retrying later (transport and 5xx).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Backend { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for AdminError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for AdminError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e.to_string())
    }
}

/// Result type for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(AdminError::Transport("offline".into()).is_transient());
        assert!(AdminError::Backend {
            status: 503,
            message: "busy".into()
        }
        .is_transient());
        assert!(!AdminError::Backend {
            status: 409,
            message: "conflict".into()
        }
        .is_transient());
        assert!(!AdminError::Decode("bad".into()).is_transient());
    }

    #[test]
    fn test_messages_are_readable() {
        let err = AdminError::NotFound {
            table: "heroes".into(),
            id: "ghost".into(),
        };
        assert_eq!(err.to_string(), "`ghost` not found in `heroes`");
    }
}
