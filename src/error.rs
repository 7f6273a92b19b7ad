//! Error types for tether.
//!
//! Uses thiserror for derive macros and provides caller-actionable error messages.
//! Ownership conflicts are not errors: they come back as typed outcomes from
//! the lock operations (see `locks::outcome`).

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for tether operations.
#[derive(Error, Debug)]
pub enum TetherError {
    /// A caller-supplied argument is malformed (bad session id, empty issue id).
    #[error("{0}")]
    InvalidArgument(String),

    /// The directory is not a recognized project root.
    #[error("{0}")]
    NotAProject(String),

    /// A lock file exists but cannot be read as a lock record.
    #[error("corrupt lock file '{}': {reason}", path.display())]
    Corruption { path: PathBuf, reason: String },

    /// Filesystem operation failed.
    #[error("{0}")]
    Io(String),

    /// Configuration file could not be loaded or failed validation.
    #[error("{0}")]
    Config(String),
}

impl TetherError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            TetherError::InvalidArgument(_) => exit_codes::USER_ERROR,
            TetherError::Config(_) => exit_codes::USER_ERROR,
            TetherError::Io(_) => exit_codes::USER_ERROR,
            TetherError::NotAProject(_) => exit_codes::NOT_A_PROJECT,
            TetherError::Corruption { .. } => exit_codes::CORRUPT_LOCK,
        }
    }

    pub(crate) fn corruption(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        TetherError::Corruption {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for tether operations.
pub type Result<T> = std::result::Result<T, TetherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_argument_has_user_error_exit_code() {
        let err = TetherError::InvalidArgument("bad session id".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
    }

    #[test]
    fn not_a_project_has_dedicated_exit_code() {
        let err = TetherError::NotAProject("no .tether".to_string());
        assert_eq!(err.exit_code(), exit_codes::NOT_A_PROJECT);
    }

    #[test]
    fn corruption_has_dedicated_exit_code() {
        let err = TetherError::corruption("/tmp/x.lock", "missing field `session_id`");
        assert_eq!(err.exit_code(), exit_codes::CORRUPT_LOCK);
    }

    #[test]
    fn corruption_message_names_the_file() {
        let err = TetherError::corruption("/tmp/task-1.lock", "expected value at line 1");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/task-1.lock"));
        assert!(msg.contains("expected value"));
    }
}
