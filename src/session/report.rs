//! Summary of a teardown run.

use crate::exit_codes;
use crate::locks::Outcome;
use serde::Serialize;

/// What a teardown run removed, and what it could not handle.
///
/// File names are relative to the directory they were found in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnlockReport {
    /// The session that ended, if one was given.
    pub session_id: Option<String>,

    /// Whether the project-level lock file was removed.
    pub project_lock_removed: bool,

    /// Issue locks removed because the session owned them.
    pub released: Vec<String>,

    /// Legacy worktree locks removed because the session owned them.
    pub legacy_released: Vec<String>,

    /// Lock files removed because they were older than the stale threshold.
    pub stale_removed: Vec<String>,

    /// One line per file operation that failed and was skipped.
    pub failures: Vec<String>,
}

impl UnlockReport {
    pub(crate) fn new(session_id: Option<&str>) -> Self {
        Self {
            session_id: session_id.map(str::to_string),
            ..Self::default()
        }
    }

    /// Total number of files removed.
    pub fn removed_count(&self) -> usize {
        usize::from(self.project_lock_removed)
            + self.released.len()
            + self.legacy_released.len()
            + self.stale_removed.len()
    }

    pub(crate) fn fail(&mut self, message: String) {
        tracing::warn!("{}", message);
        self.failures.push(message);
    }
}

impl Outcome for UnlockReport {
    /// Teardown always succeeds from the caller's point of view.
    fn exit_code(&self) -> i32 {
        exit_codes::SUCCESS
    }
}
