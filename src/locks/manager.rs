//! The issue lock manager.

use super::naming;
use super::outcome::{AcquireMode, AcquireOutcome, CheckOutcome, ReleaseOutcome, UpdateOutcome};
use super::record::LockRecord;
use super::store::{self, LockEntry, Removal};
use crate::config::Config;
use crate::context::ProjectContext;
use crate::error::{Result, TetherError};
use crate::events::{self, Event, EventAction};
use crate::fs::{self as tfs, Publish};
use filetime::FileTime;
use serde_json::json;
use std::fs;
use std::path::Path;

/// How many times `acquire` retries when the lock vanishes between a lost
/// publish and the read of the winner's record.
const MAX_ACQUIRE_ATTEMPTS: usize = 3;

/// Admission control for issues, backed by one file per issue.
///
/// Holds no lock state in memory: every call reads the lock directory afresh.
#[derive(Debug, Clone)]
pub struct IssueLock {
    ctx: ProjectContext,
    config: Config,
}

impl IssueLock {
    /// Open the lock manager for a project, loading `.tether/config.yaml` if present.
    ///
    /// Fails with `NotAProject` when the state root is missing.
    pub fn new(ctx: ProjectContext) -> Result<Self> {
        ctx.ensure_initialized()?;
        let config = Config::load_or_default(ctx.config_path())?;
        Ok(Self { ctx, config })
    }

    /// Open the lock manager with an explicit configuration.
    pub fn with_config(ctx: ProjectContext, config: Config) -> Result<Self> {
        ctx.ensure_initialized()?;
        config.validate()?;
        Ok(Self { ctx, config })
    }

    /// Open the lock manager for the project rooted at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        Self::new(ProjectContext::resolve_from(root))
    }

    pub fn context(&self) -> &ProjectContext {
        &self.ctx
    }

    /// Claim `issue_id` for `session_id`.
    ///
    /// Never waits: a lock held by another session comes back as
    /// [`AcquireOutcome::Locked`] straight away.
    pub fn acquire(
        &self,
        issue_id: &str,
        session_id: &str,
        worktree: &str,
    ) -> Result<AcquireOutcome> {
        let session_id = &naming::validate_session_id(issue_id, session_id)?;
        let path = self.ctx.lock_path(&naming::lock_key(issue_id)?);
        let record = LockRecord::new(issue_id, session_id, worktree);
        let json = record.to_json()?;

        for _ in 0..MAX_ACQUIRE_ATTEMPTS {
            if tfs::publish_new(&path, json.as_bytes())? == Publish::Created {
                tracing::info!(issue = issue_id, session = %session_id, "lock acquired");
                self.record_event(
                    Event::new(EventAction::Acquire)
                        .with_issue(issue_id)
                        .with_session(session_id)
                        .with_details(json!({ "worktree": worktree })),
                );
                return Ok(AcquireOutcome::acquired(issue_id, AcquireMode::New));
            }

            match store::read_record(&path)? {
                Some(existing) if existing.is_owned_by(session_id) => {
                    return Ok(AcquireOutcome::acquired(issue_id, AcquireMode::AlreadyHeld));
                }
                Some(existing) => {
                    tracing::debug!(
                        issue = issue_id,
                        owner = %existing.session_id,
                        "issue locked by another session"
                    );
                    return Ok(AcquireOutcome::locked(
                        issue_id,
                        &existing.session_id,
                        &existing.worktree,
                    ));
                }
                // Released between the failed publish and the read; try again.
                None => continue,
            }
        }

        Err(TetherError::Io(format!(
            "lock file '{}' kept changing while acquiring; try again",
            path.display()
        )))
    }

    /// Claim the project-level lock (the lock named after the project directory).
    pub fn acquire_project(&self, session_id: &str, worktree: &str) -> Result<AcquireOutcome> {
        self.acquire(&self.ctx.project_name(), session_id, worktree)
    }

    /// Point an existing lock at a different worktree.
    ///
    /// Only the owner may update, and the lock must already exist. The
    /// creation time and the file's mtime are kept, so the lock still ages
    /// from its original acquisition.
    pub fn update(
        &self,
        issue_id: &str,
        session_id: &str,
        worktree: &str,
    ) -> Result<UpdateOutcome> {
        let session_id = &naming::validate_session_id(issue_id, session_id)?;
        let path = self.ctx.lock_path(&naming::lock_key(issue_id)?);

        let Some(mut record) = store::read_record(&path)? else {
            return Ok(UpdateOutcome::Error {
                issue: issue_id.to_string(),
                message: format!(
                    "No lock exists for issue '{}'; acquire it before updating",
                    issue_id
                ),
            });
        };

        if !record.is_owned_by(session_id) {
            return Ok(UpdateOutcome::Error {
                issue: issue_id.to_string(),
                message: format!(
                    "Lock for issue '{}' is held by a different session ({})",
                    issue_id, record.session_id
                ),
            });
        }

        let original_mtime = fs::metadata(&path)
            .ok()
            .map(|m| FileTime::from_last_modification_time(&m));

        record.worktree = worktree.to_string();
        tfs::atomic_write(&path, record.to_json()?.as_bytes())?;

        if let Some(mtime) = original_mtime
            && let Err(e) = filetime::set_file_mtime(&path, mtime)
        {
            tracing::warn!(path = %path.display(), error = %e, "failed to restore lock mtime");
        }

        tracing::info!(issue = issue_id, session = %session_id, worktree, "lock updated");
        Ok(UpdateOutcome::Updated {
            issue: issue_id.to_string(),
            worktree: worktree.to_string(),
            message: format!("Lock for issue '{}' updated", issue_id),
        })
    }

    /// Release a lock held by `session_id`.
    ///
    /// Releasing a lock that does not exist succeeds.
    pub fn release(&self, issue_id: &str, session_id: &str) -> Result<ReleaseOutcome> {
        let session_id = &naming::validate_session_id(issue_id, session_id)?;
        let path = self.ctx.lock_path(&naming::lock_key(issue_id)?);

        match store::remove_if_owned(&path, session_id)? {
            Removal::Missing => Ok(ReleaseOutcome::released(issue_id, "No lock exists")),
            Removal::OwnedBy(owner) => Ok(ReleaseOutcome::Error {
                issue: issue_id.to_string(),
                message: format!(
                    "Lock for issue '{}' is owned by a different session ({})",
                    issue_id, owner
                ),
                owner,
            }),
            Removal::Removed => {
                tracing::info!(issue = issue_id, session = %session_id, "lock released");
                self.record_event(
                    Event::new(EventAction::Release)
                        .with_issue(issue_id)
                        .with_session(session_id),
                );
                Ok(ReleaseOutcome::released(issue_id, "success"))
            }
        }
    }

    /// Remove a lock regardless of who owns it.
    ///
    /// The previous owner is reported (and logged) when the record is readable.
    pub fn force_release(&self, issue_id: &str) -> Result<ReleaseOutcome> {
        let path = self.ctx.lock_path(&naming::lock_key(issue_id)?);

        let previous = match store::read_record(&path) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(issue = issue_id, error = %e, "force-releasing unreadable lock");
                None
            }
        };

        if !tfs::remove_if_exists(&path)? {
            return Ok(ReleaseOutcome::released(issue_id, "No lock exists"));
        }

        let previous_owner = previous.map(|r| r.session_id);
        let message = match &previous_owner {
            Some(owner) => format!("Lock force-released (previous owner: {})", owner),
            None => "Lock force-released (previous owner unknown)".to_string(),
        };

        tracing::info!(issue = issue_id, previous_owner = ?previous_owner, "lock force-released");
        self.record_event(
            Event::new(EventAction::ForceRelease)
                .with_issue(issue_id)
                .with_details(json!({ "previous_owner": previous_owner })),
        );

        Ok(ReleaseOutcome::Released {
            issue: issue_id.to_string(),
            message,
            previous_owner,
        })
    }

    /// Report who holds `issue_id`, if anyone.
    ///
    /// A corrupt lock file is an error here: the caller asked about this issue.
    pub fn check(&self, issue_id: &str) -> Result<CheckOutcome> {
        let path = self.ctx.lock_path(&naming::lock_key(issue_id)?);

        Ok(match store::read_record(&path)? {
            Some(record) => CheckOutcome::Locked {
                issue: issue_id.to_string(),
                age_seconds: record.age_seconds(),
                stale: record.is_stale(self.config.stale_after()),
                owner: record.session_id,
                worktree: record.worktree,
                created_iso: record.created_iso,
            },
            None => CheckOutcome::Unlocked {
                issue: issue_id.to_string(),
                message: format!("Issue '{}' is not locked", issue_id),
            },
        })
    }

    /// Every readable lock in the project, sorted by key.
    ///
    /// Corrupt files are skipped so they cannot hide the other locks.
    pub fn list(&self) -> Result<Vec<LockEntry>> {
        store::scan_records(&self.ctx.locks_dir)
    }

    fn record_event(&self, event: Event) {
        if self.config.record_events {
            events::record(&self.ctx, event);
        }
    }
}
