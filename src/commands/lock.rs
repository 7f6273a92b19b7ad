//! Lock commands: thin wrappers over `IssueLock`.

use super::{emit, open_locks};
use crate::cli::{AcquireArgs, IssueArgs, ProjectClaimArgs, ReleaseArgs, UpdateArgs};
use serde::Serialize;
use std::path::Path;
use tether::error::Result;
use tether::exit_codes;
use tether::locks::{LockEntry, Outcome};

/// Payload for `tether list`.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename = "ok")]
struct LockList {
    count: usize,
    locks: Vec<LockEntry>,
}

impl Outcome for LockList {
    fn exit_code(&self) -> i32 {
        exit_codes::SUCCESS
    }
}

pub(super) fn cmd_acquire(project_dir: Option<&Path>, args: AcquireArgs) -> Result<i32> {
    let locks = open_locks(project_dir)?;
    emit(&locks.acquire(&args.issue_id, &args.session_id, &args.worktree)?)
}

pub(super) fn cmd_update(project_dir: Option<&Path>, args: UpdateArgs) -> Result<i32> {
    let locks = open_locks(project_dir)?;
    emit(&locks.update(&args.issue_id, &args.session_id, &args.worktree)?)
}

pub(super) fn cmd_release(project_dir: Option<&Path>, args: ReleaseArgs) -> Result<i32> {
    let locks = open_locks(project_dir)?;
    emit(&locks.release(&args.issue_id, &args.session_id)?)
}

pub(super) fn cmd_force_release(project_dir: Option<&Path>, args: IssueArgs) -> Result<i32> {
    let locks = open_locks(project_dir)?;
    emit(&locks.force_release(&args.issue_id)?)
}

pub(super) fn cmd_check(project_dir: Option<&Path>, args: IssueArgs) -> Result<i32> {
    let locks = open_locks(project_dir)?;
    emit(&locks.check(&args.issue_id)?)
}

pub(super) fn cmd_list(project_dir: Option<&Path>) -> Result<i32> {
    let locks = open_locks(project_dir)?.list()?;
    emit(&LockList {
        count: locks.len(),
        locks,
    })
}

pub(super) fn cmd_project_claim(project_dir: Option<&Path>, args: ProjectClaimArgs) -> Result<i32> {
    let locks = open_locks(project_dir)?;
    emit(&locks.acquire_project(&args.session_id, &args.worktree)?)
}
