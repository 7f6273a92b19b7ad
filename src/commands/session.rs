//! Implementation of `tether session-end`.

use super::emit;
use crate::cli::SessionEndArgs;
use std::path::{Path, PathBuf};
use tether::context::ProjectContext;
use tether::error::Result;
use tether::exit_codes;
use tether::session::SessionUnlock;

/// Run session teardown. Always succeeds: a directory that is not a
/// project simply has nothing to clean up.
pub(super) fn cmd_session_end(project_dir: Option<&Path>, args: SessionEndArgs) -> Result<i32> {
    let ctx = teardown_context(project_dir);
    let report = SessionUnlock::new(ctx).run(args.session_id.as_deref());

    Ok(emit(&report).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to print teardown report");
        exit_codes::SUCCESS
    }))
}

fn teardown_context(project_dir: Option<&Path>) -> ProjectContext {
    if let Some(dir) = project_dir {
        return ProjectContext::resolve_from(dir);
    }

    ProjectContext::resolve().unwrap_or_else(|e| {
        tracing::debug!(error = %e, "no project found; teardown runs against the cwd");
        ProjectContext::resolve_from(std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tether::context::init_project;

    const SESSION_A: &str = "6f1c2a4e-8d3b-4c5a-9e7f-0a1b2c3d4e5f";

    #[test]
    fn test_session_end_releases_locks() {
        let temp = TempDir::new().unwrap();
        let ctx = init_project(temp.path()).unwrap();
        let locks = tether::locks::IssueLock::new(ctx.clone()).unwrap();
        locks.acquire("task-1", SESSION_A, "").unwrap();

        let args = SessionEndArgs {
            session_id: Some(SESSION_A.to_string()),
        };
        let code = cmd_session_end(Some(temp.path()), args).unwrap();

        assert_eq!(code, exit_codes::SUCCESS);
        assert!(!ctx.lock_path("task-1").exists());
    }

    #[test]
    fn test_session_end_outside_a_project_succeeds() {
        let temp = TempDir::new().unwrap();

        let code = cmd_session_end(Some(temp.path()), SessionEndArgs { session_id: None }).unwrap();

        assert_eq!(code, exit_codes::SUCCESS);
        assert!(!temp.path().join(".tether").exists());
    }
}
