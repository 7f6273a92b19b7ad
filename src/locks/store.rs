//! Reading lock records back from the lock directory.
//!
//! There are two readers with deliberately different corruption policies:
//! - [`read_record`] is for a single named issue and fails loudly on a
//!   corrupt file.
//! - [`scan_records`] walks the whole directory and drops any entry it
//!   cannot parse, so one bad file never hides the others.

use super::record::LockRecord;
use crate::context::LOCK_EXTENSION;
use crate::error::{Result, TetherError};
use serde::Serialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// One lock as reported by `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockEntry {
    /// Lock file name without the `.lock` extension.
    pub key: String,
    pub issue: String,
    pub session_id: String,
    pub worktree: String,
    pub created_at: i64,
    pub created_iso: String,
    pub age_seconds: i64,
}

impl LockEntry {
    fn new(key: String, record: LockRecord) -> Self {
        let age_seconds = record.age_seconds();
        Self {
            key,
            issue: record.issue,
            session_id: record.session_id,
            worktree: record.worktree,
            created_at: record.created_at,
            created_iso: record.created_iso,
            age_seconds,
        }
    }
}

/// Read the record at `path`.
///
/// Returns `Ok(None)` when there is no lock. A file that exists but cannot
/// be parsed, or lacks a field, is `Corruption`.
pub fn read_record(path: &Path) -> Result<Option<LockRecord>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(TetherError::Io(format!(
                "failed to read lock file '{}': {}",
                path.display(),
                e
            )));
        }
    };

    LockRecord::from_json(&content)
        .map(Some)
        .map_err(|e| TetherError::corruption(path, e))
}

/// Result of [`remove_if_owned`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Removal {
    Removed,
    Missing,
    /// The lock belongs to someone else (the recorded session id).
    OwnedBy(String),
}

/// Delete the lock at `path` only if `session_id` owns it right now.
///
/// The record is read immediately before the unlink, so a lock that was
/// force-released and re-acquired by another session since the caller last
/// looked survives. The gap between this read and the unlink remains, as it
/// does in acquire.
pub(crate) fn remove_if_owned(path: &Path, session_id: &str) -> Result<Removal> {
    let Some(record) = read_record(path)? else {
        return Ok(Removal::Missing);
    };
    if !record.is_owned_by(session_id) {
        return Ok(Removal::OwnedBy(record.session_id));
    }

    Ok(if crate::fs::remove_if_exists(path)? {
        Removal::Removed
    } else {
        Removal::Missing
    })
}

/// Parse every `*.lock` file in `locks_dir`, skipping any that fail.
///
/// A missing directory yields an empty list. Entries are sorted by key.
pub fn scan_records(locks_dir: &Path) -> Result<Vec<LockEntry>> {
    let mut entries = Vec::new();

    let dir = match fs::read_dir(locks_dir) {
        Ok(dir) => dir,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(entries),
        Err(e) => {
            return Err(TetherError::Io(format!(
                "failed to read locks directory '{}': {}",
                locks_dir.display(),
                e
            )));
        }
    };

    for path in dir.filter_map(|entry| entry.ok()).map(|entry| entry.path()) {
        let Some(key) = lock_key_of(&path) else {
            continue;
        };

        let record = match fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|content| LockRecord::from_json(&content).map_err(|e| e.to_string()))
        {
            Ok(record) => record,
            Err(reason) => {
                tracing::debug!(path = %path.display(), %reason, "skipping unreadable lock file");
                continue;
            }
        };

        entries.push(LockEntry::new(key, record));
    }

    entries.sort_by(|a, b| a.key.cmp(&b.key));
    Ok(entries)
}

/// The lock key for a `*.lock` path, or `None` for anything else.
fn lock_key_of(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(LOCK_EXTENSION) {
        return None;
    }
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}
