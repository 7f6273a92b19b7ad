//! Result payloads returned by the lock operations.
//!
//! Each outcome serializes to a JSON object with a `status` discriminator so
//! a hook can decide its next step without parsing prose. Ownership
//! conflicts are ordinary variants here, not errors.

use crate::exit_codes;
use serde::Serialize;

/// Anything the CLI can print as a result payload.
pub trait Outcome: Serialize {
    /// Process exit code for this outcome.
    fn exit_code(&self) -> i32;
}

/// What a caller denied a lock should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NextAction {
    FindAnotherIssue,
}

/// Whether `acquire` created the lock or found it already held by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AcquireMode {
    #[serde(rename = "new")]
    New,
    #[serde(rename = "already held")]
    AlreadyHeld,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AcquireOutcome {
    Acquired {
        issue: String,
        mode: AcquireMode,
        message: String,
    },
    Locked {
        issue: String,
        owner: String,
        worktree: String,
        action: NextAction,
        guidance: String,
    },
}

impl AcquireOutcome {
    pub(crate) fn acquired(issue: &str, mode: AcquireMode) -> Self {
        let message = match mode {
            AcquireMode::New => format!("Lock acquired for issue '{}'", issue),
            AcquireMode::AlreadyHeld => {
                format!("Lock for issue '{}' is already held by this session", issue)
            }
        };
        AcquireOutcome::Acquired {
            issue: issue.to_string(),
            mode,
            message,
        }
    }

    pub(crate) fn locked(issue: &str, owner: &str, worktree: &str) -> Self {
        let location = if worktree.is_empty() {
            String::new()
        } else {
            format!(" (worktree: {})", worktree)
        };
        let guidance = format!(
            "Issue '{}' is being worked on by session {}{}. \
             Stop investigating or modifying that session's files and pick a different issue. \
             Do not wait for this lock to be released.",
            issue, owner, location
        );
        AcquireOutcome::Locked {
            issue: issue.to_string(),
            owner: owner.to_string(),
            worktree: worktree.to_string(),
            action: NextAction::FindAnotherIssue,
            guidance,
        }
    }

    pub fn is_acquired(&self) -> bool {
        matches!(self, AcquireOutcome::Acquired { .. })
    }
}

impl Outcome for AcquireOutcome {
    fn exit_code(&self) -> i32 {
        match self {
            AcquireOutcome::Acquired { .. } => exit_codes::SUCCESS,
            AcquireOutcome::Locked { .. } => exit_codes::LOCK_CONFLICT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateOutcome {
    Updated {
        issue: String,
        worktree: String,
        message: String,
    },
    Error {
        issue: String,
        message: String,
    },
}

impl Outcome for UpdateOutcome {
    fn exit_code(&self) -> i32 {
        match self {
            UpdateOutcome::Updated { .. } => exit_codes::SUCCESS,
            UpdateOutcome::Error { .. } => exit_codes::LOCK_CONFLICT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    Released {
        issue: String,
        message: String,
        /// Owner before a forced release, for the audit trail.
        #[serde(skip_serializing_if = "Option::is_none")]
        previous_owner: Option<String>,
    },
    Error {
        issue: String,
        owner: String,
        message: String,
    },
}

impl ReleaseOutcome {
    pub(crate) fn released(issue: &str, message: impl Into<String>) -> Self {
        ReleaseOutcome::Released {
            issue: issue.to_string(),
            message: message.into(),
            previous_owner: None,
        }
    }

    pub fn is_released(&self) -> bool {
        matches!(self, ReleaseOutcome::Released { .. })
    }
}

impl Outcome for ReleaseOutcome {
    fn exit_code(&self) -> i32 {
        match self {
            ReleaseOutcome::Released { .. } => exit_codes::SUCCESS,
            ReleaseOutcome::Error { .. } => exit_codes::LOCK_CONFLICT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckOutcome {
    Locked {
        issue: String,
        owner: String,
        worktree: String,
        age_seconds: i64,
        created_iso: String,
        /// Older than the stale threshold: the next session teardown removes it.
        stale: bool,
    },
    Unlocked {
        issue: String,
        message: String,
    },
}

impl CheckOutcome {
    pub fn is_locked(&self) -> bool {
        matches!(self, CheckOutcome::Locked { .. })
    }
}

impl Outcome for CheckOutcome {
    fn exit_code(&self) -> i32 {
        exit_codes::SUCCESS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn acquired_serializes_with_status_and_mode() {
        let outcome = AcquireOutcome::acquired("task-1", AcquireMode::New);
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["status"], "acquired");
        assert_eq!(value["mode"], "new");
        assert_eq!(value["issue"], "task-1");

        let again = AcquireOutcome::acquired("task-1", AcquireMode::AlreadyHeld);
        assert_eq!(serde_json::to_value(&again).unwrap()["mode"], "already held");
    }

    #[test]
    fn locked_carries_action_and_guidance() {
        let outcome = AcquireOutcome::locked("task-1", "owner-id", "/wt/a");
        let value = serde_json::to_value(&outcome).unwrap();

        assert_eq!(value["status"], "locked");
        assert_eq!(value["owner"], "owner-id");
        assert_eq!(value["action"], "FIND_ANOTHER_ISSUE");
        let guidance = value["guidance"].as_str().unwrap();
        assert!(guidance.contains("different issue"));
        assert!(guidance.contains("/wt/a"));
        assert_eq!(outcome.exit_code(), exit_codes::LOCK_CONFLICT);
    }

    #[test]
    fn release_omits_previous_owner_when_absent() {
        let value = serde_json::to_value(ReleaseOutcome::released("t", "success")).unwrap();
        assert_eq!(value, json!({"status": "released", "issue": "t", "message": "success"}));
    }

    #[test]
    fn update_error_is_lock_conflict() {
        let outcome = UpdateOutcome::Error {
            issue: "t".to_string(),
            message: "No lock exists".to_string(),
        };
        assert_eq!(serde_json::to_value(&outcome).unwrap()["status"], "error");
        assert_eq!(outcome.exit_code(), exit_codes::LOCK_CONFLICT);
    }

    #[test]
    fn check_unlocked_status() {
        let outcome = CheckOutcome::Unlocked {
            issue: "t".to_string(),
            message: "not locked".to_string(),
        };
        assert_eq!(serde_json::to_value(&outcome).unwrap()["status"], "unlocked");
        assert!(!outcome.is_locked());
    }
}
