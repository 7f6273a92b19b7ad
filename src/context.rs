//! Project context resolution for tether.
//!
//! A project is any directory containing the `.tether/` state root. This
//! module finds that directory and derives every path the lock store uses,
//! so the rest of the crate never joins path segments by hand:
//!
//! ```text
//! <project>/.tether/
//!     config.yaml
//!     locks/<issue-key>.lock
//!     locks/<project-basename>.lock
//!     worktree-locks/<name>.lock
//!     events/events.ndjson
//! ```

use crate::error::{Result, TetherError};
use crate::locks::naming;
use std::env;
use std::path::{Path, PathBuf};

/// Name of the state root directory, relative to the project root.
pub const STATE_DIR: &str = ".tether";

/// Per-issue (and project) lock directory inside the state root.
pub const LOCKS_DIR: &str = "locks";

/// Legacy plain-text worktree lock directory inside the state root.
pub const WORKTREE_LOCKS_DIR: &str = "worktree-locks";

/// Extension shared by every lock file.
pub const LOCK_EXTENSION: &str = "lock";

/// Resolved paths for a tether project. All paths are absolute.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// The project root (the directory that contains `.tether/`).
    pub project_root: PathBuf,

    /// The state root (`{project_root}/.tether/`).
    pub state_dir: PathBuf,

    /// Lock directory (`{project_root}/.tether/locks/`).
    pub locks_dir: PathBuf,

    /// Legacy worktree lock directory (`{project_root}/.tether/worktree-locks/`).
    pub worktree_locks_dir: PathBuf,
}

impl ProjectContext {
    /// Discover the project from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            TetherError::Io(format!("failed to get current working directory: {}", e))
        })?;

        Self::discover(&cwd)
    }

    /// Walk up from `start` to the nearest directory containing `.tether/`.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = absolute(start.as_ref());

        start
            .ancestors()
            .find(|dir| dir.join(STATE_DIR).is_dir())
            .map(Self::resolve_from)
            .ok_or_else(|| not_a_project(&start))
    }

    /// Build the context for a known project root without checking it.
    ///
    /// Teardown uses this directly: it must work (as a no-op) even when the
    /// state root is missing.
    pub fn resolve_from<P: AsRef<Path>>(root: P) -> Self {
        let project_root = absolute(root.as_ref());
        let state_dir = project_root.join(STATE_DIR);
        let locks_dir = state_dir.join(LOCKS_DIR);
        let worktree_locks_dir = state_dir.join(WORKTREE_LOCKS_DIR);

        Self {
            project_root,
            state_dir,
            locks_dir,
            worktree_locks_dir,
        }
    }

    /// Check whether the state root exists.
    pub fn is_initialized(&self) -> bool {
        self.state_dir.is_dir()
    }

    /// Ensure this is a recognized project, returning `NotAProject` if not.
    pub fn ensure_initialized(&self) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(not_a_project(&self.project_root))
        }
    }

    /// Get the path to the config file.
    pub fn config_path(&self) -> PathBuf {
        self.state_dir.join("config.yaml")
    }

    /// Get the path to the events directory.
    pub fn events_dir(&self) -> PathBuf {
        self.state_dir.join("events")
    }

    /// Get the path to the main events log file.
    pub fn events_file(&self) -> PathBuf {
        self.events_dir().join("events.ndjson")
    }

    /// Get the lock file path for an already-sanitized lock key.
    pub fn lock_path(&self, key: &str) -> PathBuf {
        self.locks_dir.join(format!("{}.{}", key, LOCK_EXTENSION))
    }

    /// Name used for the project-level lock: the project directory's basename.
    pub fn project_name(&self) -> String {
        self.project_root
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "project".to_string())
    }

    /// Get the path to the project-level lock file.
    pub fn project_lock_path(&self) -> PathBuf {
        self.lock_path(&naming::sanitize(&self.project_name()))
    }
}

fn absolute(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

fn not_a_project(dir: &Path) -> TetherError {
    TetherError::NotAProject(format!(
        "not a tether project: no {}/ directory found at or above {}\n\n\
         Run `tether init` in the project root to create it.",
        STATE_DIR,
        dir.display()
    ))
}

/// Create the state root and lock directory for a project.
///
/// Idempotent: an existing state root is left as is.
pub fn init_project<P: AsRef<Path>>(root: P) -> Result<ProjectContext> {
    let ctx = ProjectContext::resolve_from(root);
    std::fs::create_dir_all(&ctx.locks_dir).map_err(|e| {
        TetherError::Io(format!(
            "failed to create locks directory '{}': {}",
            ctx.locks_dir.display(),
            e
        ))
    })?;
    Ok(ctx)
}
