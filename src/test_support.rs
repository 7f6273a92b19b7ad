use crate::context::ProjectContext;
use filetime::FileTime;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub(crate) const SESSION_A: &str = "6f1c2a4e-8d3b-4c5a-9e7f-0a1b2c3d4e5f";
pub(crate) const SESSION_B: &str = "0b9e8d7c-6a5f-4e3d-8c2b-1a0f9e8d7c6b";
pub(crate) const SESSION_C: &str = "3c4d5e6f-7a8b-4c9d-8e0f-1a2b3c4d5e6f";

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// Create a temporary project with an initialized `.tether/locks` directory.
pub(crate) fn create_test_project() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    std::fs::create_dir_all(temp_dir.path().join(".tether").join("locks")).unwrap();
    temp_dir
}

pub(crate) fn test_context(temp_dir: &TempDir) -> ProjectContext {
    ProjectContext::resolve_from(temp_dir.path())
}

/// Backdate a file's modification time by `age`.
pub(crate) fn set_file_age(path: &Path, age: Duration) {
    let mtime = SystemTime::now() - age;
    filetime::set_file_mtime(path, FileTime::from_system_time(mtime)).unwrap();
}

/// Write a lock record by hand, bypassing the manager.
pub(crate) fn write_raw_lock(ctx: &ProjectContext, key: &str, session_id: &str) -> PathBuf {
    std::fs::create_dir_all(&ctx.locks_dir).unwrap();
    let path = ctx.lock_path(key);
    let json = serde_json::json!({
        "issue": key,
        "session_id": session_id,
        "worktree": "",
        "created_at": chrono::Utc::now().timestamp(),
        "created_iso": chrono::Utc::now().to_rfc3339(),
    });
    std::fs::write(&path, json.to_string()).unwrap();
    path
}
