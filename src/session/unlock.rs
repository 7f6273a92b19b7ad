//! The session-end teardown routine.

use super::report::UnlockReport;
use super::sweep::remove_stale_locks;
use crate::config::{Config, DEFAULT_STALE_LOCK_HOURS};
use crate::context::{LOCK_EXTENSION, ProjectContext};
use crate::events::{self, Event, EventAction};
use crate::locks::naming;
use serde_json::json;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

const SECONDS_PER_HOUR: u64 = 60 * 60;

/// Releases a terminating session's locks and purges stale ones.
///
/// Safe to run more than once, and safe to run against a directory that is
/// not (or no longer) a project: missing directories are simply skipped.
#[derive(Debug, Clone)]
pub struct SessionUnlock {
    ctx: ProjectContext,
    stale_after: Duration,
    record_events: bool,
}

impl SessionUnlock {
    /// Build a teardown for a project, reading `.tether/config.yaml` if it is usable.
    pub fn new(ctx: ProjectContext) -> Self {
        let config = Config::load_or_default(ctx.config_path()).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring unusable config during session teardown");
            Config::default()
        });
        Self::with_config(ctx, &config)
    }

    /// Build a teardown with an explicit configuration.
    ///
    /// An invalid config falls back to the default stale threshold rather
    /// than sweeping with a zero threshold.
    pub fn with_config(ctx: ProjectContext, config: &Config) -> Self {
        let stale_after = config
            .validate()
            .ok()
            .and_then(|()| config.stale_after().to_std().ok())
            .unwrap_or(Duration::from_secs(
                u64::from(DEFAULT_STALE_LOCK_HOURS) * SECONDS_PER_HOUR,
            ));

        Self {
            ctx,
            stale_after,
            record_events: config.record_events,
        }
    }

    /// Build a teardown for the project rooted at `root`.
    pub fn for_project<P: AsRef<Path>>(root: P) -> Self {
        Self::new(ProjectContext::resolve_from(root))
    }

    pub fn stale_after(&self) -> Duration {
        self.stale_after
    }

    /// Run the teardown for `session_id` (blank or `None` skips the
    /// session-scoped steps; the project lock and the stale sweep still run).
    pub fn run(&self, session_id: Option<&str>) -> UnlockReport {
        self.run_at(session_id, SystemTime::now())
    }

    /// [`run`](Self::run) with an explicit clock for the stale sweep.
    pub fn run_at(&self, session_id: Option<&str>, now: SystemTime) -> UnlockReport {
        let session_id = session_id.map(str::trim).filter(|s| !s.is_empty());
        let mut report = UnlockReport::new(session_id);

        self.remove_project_lock(&mut report);

        if let Some(session_id) = session_id {
            self.release_session_locks(session_id, &mut report);
            self.release_legacy_locks(session_id, &mut report);
        }

        remove_stale_locks(&self.ctx.locks_dir, self.stale_after, now, &mut report);

        tracing::info!(
            session = ?session_id,
            removed = report.removed_count(),
            failures = report.failures.len(),
            "session teardown finished"
        );
        self.record_event(&report);
        report
    }

    fn remove_project_lock(&self, report: &mut UnlockReport) {
        let path = self.ctx.project_lock_path();
        match fs::remove_file(&path) {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed project lock");
                report.project_lock_removed = true;
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => report.fail(format!(
                "failed to remove project lock '{}': {}",
                path.display(),
                e
            )),
        }
    }

    /// Remove every JSON lock whose `session_id` names `session_id`.
    fn release_session_locks(&self, session_id: &str, report: &mut UnlockReport) {
        for path in lock_files(&self.ctx.locks_dir, report) {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    report.fail(format!("failed to read '{}': {}", path.display(), e));
                    continue;
                }
            };

            let owner = serde_json::from_str::<serde_json::Value>(&content)
                .ok()
                .and_then(|v| v.get("session_id")?.as_str().map(str::to_string));
            let Some(owner) = owner else {
                tracing::debug!(path = %path.display(), "skipping unparseable lock file");
                continue;
            };
            if !naming::same_session(&owner, session_id) {
                continue;
            }

            // The owner was read just above; a re-acquire by another session
            // landing in between is accepted, as in acquire.
            remove_into(&path, &mut report.released, &mut report.failures);
        }
    }

    /// Remove every legacy plain-text lock whose trimmed content names `session_id`.
    fn release_legacy_locks(&self, session_id: &str, report: &mut UnlockReport) {
        for path in lock_files(&self.ctx.worktree_locks_dir, report) {
            match fs::read_to_string(&path) {
                Ok(content) if naming::same_session(content.trim(), session_id) => {
                    remove_into(&path, &mut report.legacy_released, &mut report.failures);
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => report.fail(format!("failed to read '{}': {}", path.display(), e)),
            }
        }
    }

    fn record_event(&self, report: &UnlockReport) {
        // Teardown must not create a state root where there is none.
        if !self.record_events || !self.ctx.is_initialized() {
            return;
        }

        let mut event = Event::new(EventAction::SessionEnd).with_details(json!({
            "project_lock_removed": report.project_lock_removed,
            "released": report.released,
            "legacy_released": report.legacy_released,
            "stale_removed": report.stale_removed,
            "failures": report.failures.len(),
        }));
        if let Some(session_id) = &report.session_id {
            event = event.with_session(session_id.clone());
        }
        events::record(&self.ctx, event);
    }
}

/// `*.lock` paths in `dir`; a missing directory yields nothing.
fn lock_files(dir: &Path, report: &mut UnlockReport) -> Vec<PathBuf> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            report.fail(format!("failed to read directory '{}': {}", dir.display(), e));
            return Vec::new();
        }
    };

    entries
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry.path()),
            Err(e) => {
                report.fail(format!("failed to read directory entry: {}", e));
                None
            }
        })
        .filter(|path| path.extension().is_some_and(|ext| ext == LOCK_EXTENSION))
        .collect()
}

/// Delete `path`, recording its file name in `removed` or the error in `failures`.
fn remove_into(path: &Path, removed: &mut Vec<String>, failures: &mut Vec<String>) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    match fs::remove_file(path) {
        Ok(()) => {
            tracing::info!(file = %name, "released session lock");
            removed.push(name);
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            let message = format!("failed to remove '{}': {}", path.display(), e);
            tracing::warn!("{}", message);
            failures.push(message);
        }
    }
}
