//! Ownership-independent removal of stale lock files.

use super::report::UnlockReport;
use crate::context::LOCK_EXTENSION;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::{Duration, SystemTime};

/// Remove every lock file in `locks_dir` last modified more than
/// `stale_after` before `now`, whoever owns it.
///
/// Temporary files left behind by an interrupted write are swept by the same
/// rule. A missing directory is a no-op. Failures are recorded per file in
/// `report` and never stop the sweep.
pub fn remove_stale_locks(
    locks_dir: &Path,
    stale_after: Duration,
    now: SystemTime,
    report: &mut UnlockReport,
) {
    let entries = match fs::read_dir(locks_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return,
        Err(e) => {
            report.fail(format!(
                "failed to read locks directory '{}': {}",
                locks_dir.display(),
                e
            ));
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                report.fail(format!("failed to read locks directory entry: {}", e));
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().to_string();
        if !is_sweepable(&name) {
            continue;
        }

        let modified = match entry.metadata().and_then(|m| m.modified()) {
            Ok(modified) => modified,
            Err(e) => {
                report.fail(format!("failed to stat '{}': {}", name, e));
                continue;
            }
        };

        // A timestamp in the future means the file is not stale.
        let Ok(age) = now.duration_since(modified) else {
            continue;
        };
        if age <= stale_after {
            continue;
        }

        match fs::remove_file(entry.path()) {
            Ok(()) => {
                tracing::info!(file = %name, age_secs = age.as_secs(), "removed stale lock");
                report.stale_removed.push(name);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => report.fail(format!("failed to remove stale lock '{}': {}", name, e)),
        }
    }
}

fn is_sweepable(name: &str) -> bool {
    let is_lock = Path::new(name)
        .extension()
        .is_some_and(|ext| ext == LOCK_EXTENSION);
    let is_leftover_temp = name.starts_with('.') && name.ends_with(".tmp");
    is_lock || is_leftover_temp
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sweepable_names() {
        assert!(is_sweepable("task-1.lock"));
        assert!(is_sweepable(".task-1.lock.0123abcd.tmp"));
        assert!(!is_sweepable("notes.txt"));
        assert!(!is_sweepable("config.yaml"));
        assert!(!is_sweepable("lock"));
    }
}
