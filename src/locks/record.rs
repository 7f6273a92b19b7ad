//! The on-disk lock record.

use super::naming;
use crate::error::{Result, TetherError};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Lock record stored as JSON in `<locks>/<key>.lock`.
///
/// Every field is required when parsing; a file missing one is corrupt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    /// The issue id as given by the caller (informational; the file name is the key).
    pub issue: String,

    /// UUID of the owning session.
    pub session_id: String,

    /// Worktree the session is using for this issue (may be empty).
    pub worktree: String,

    /// Unix timestamp (seconds) of the original acquisition.
    pub created_at: i64,

    /// The same instant as RFC 3339.
    pub created_iso: String,
}

impl LockRecord {
    /// Create a record stamped with the current time.
    pub fn new(issue: &str, session_id: &str, worktree: &str) -> Self {
        Self::created_at(issue, session_id, worktree, Utc::now())
    }

    /// Create a record with an explicit creation time.
    pub fn created_at(issue: &str, session_id: &str, worktree: &str, at: DateTime<Utc>) -> Self {
        Self {
            issue: issue.to_string(),
            session_id: session_id.to_string(),
            worktree: worktree.to_string(),
            created_at: at.timestamp(),
            created_iso: at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Parse a record from JSON text.
    pub fn from_json(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }

    /// Serialize the record to a JSON string.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TetherError::Io(format!("failed to serialize lock record: {}", e)))
    }

    /// Whether `session_id` owns this lock, whatever spelling of the UUID it uses.
    pub fn is_owned_by(&self, session_id: &str) -> bool {
        naming::same_session(&self.session_id, session_id)
    }

    /// Seconds since acquisition, never negative.
    pub fn age_seconds(&self) -> i64 {
        (Utc::now().timestamp() - self.created_at).max(0)
    }

    /// Whether the lock is older than `threshold`.
    pub fn is_stale(&self, threshold: chrono::Duration) -> bool {
        self.age_seconds() > threshold.num_seconds()
    }
}
