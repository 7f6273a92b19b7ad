//! CLI argument parsing for tether.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tether: file-based issue locks for concurrent agent sessions.
///
/// Sessions claim issues before working on them; a claim is a lock file
/// under `.tether/locks/`. Every command prints its result as JSON.
#[derive(Parser, Debug)]
#[command(name = "tether")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project root. Defaults to the nearest directory at or above the
    /// current one that contains `.tether/`.
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for tether.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize tether in the project directory.
    ///
    /// Creates `.tether/locks/`. Running it again is harmless.
    Init,

    /// Claim an issue for a session.
    ///
    /// Never waits: if another session holds the issue, reports who and
    /// exits with the lock-conflict code.
    Acquire(AcquireArgs),

    /// Change the worktree recorded on a lock the session holds.
    Update(UpdateArgs),

    /// Release a lock the session holds.
    Release(ReleaseArgs),

    /// Remove a lock whoever holds it.
    ForceRelease(IssueArgs),

    /// Show who holds an issue, if anyone.
    Check(IssueArgs),

    /// List every active lock.
    List,

    /// Claim the project-level lock for a session.
    ProjectClaim(ProjectClaimArgs),

    /// Tear down a session: release its locks and purge stale ones.
    ///
    /// Always exits successfully; problems are reported in the output.
    SessionEnd(SessionEndArgs),
}

/// Arguments for the `acquire` command.
#[derive(Parser, Debug)]
pub struct AcquireArgs {
    /// Issue id to claim (e.g., `2.1/fix-bug`).
    pub issue_id: String,

    /// UUID of the claiming session.
    pub session_id: String,

    /// Worktree the session will work in.
    #[arg(long, default_value = "")]
    pub worktree: String,
}

/// Arguments for the `update` command.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// Issue id whose lock should change.
    pub issue_id: String,

    /// UUID of the owning session.
    pub session_id: String,

    /// New worktree path.
    #[arg(long)]
    pub worktree: String,
}

/// Arguments for the `release` command.
#[derive(Parser, Debug)]
pub struct ReleaseArgs {
    /// Issue id to release.
    pub issue_id: String,

    /// UUID of the owning session.
    pub session_id: String,
}

/// A single issue id.
#[derive(Parser, Debug)]
pub struct IssueArgs {
    /// Issue id.
    pub issue_id: String,
}

/// Arguments for the `project-claim` command.
#[derive(Parser, Debug)]
pub struct ProjectClaimArgs {
    /// UUID of the claiming session.
    pub session_id: String,

    /// Worktree the session will work in.
    #[arg(long, default_value = "")]
    pub worktree: String,
}

/// Arguments for the `session-end` command.
#[derive(Parser, Debug)]
pub struct SessionEndArgs {
    /// Session whose locks should be released. Without it only the
    /// project lock and stale locks are removed.
    #[arg(long)]
    pub session_id: Option<String>,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    const SESSION: &str = "6f1c2a4e-8d3b-4c5a-9e7f-0a1b2c3d4e5f";

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["tether", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init));
        assert!(cli.project_dir.is_none());
    }

    #[test]
    fn parse_global_project_dir_after_subcommand() {
        let cli = Cli::try_parse_from(["tether", "list", "--project-dir", "/tmp/proj"]).unwrap();
        assert!(matches!(cli.command, Command::List));
        assert_eq!(cli.project_dir, Some(PathBuf::from("/tmp/proj")));
    }

    #[test]
    fn parse_acquire_minimal() {
        let cli = Cli::try_parse_from(["tether", "acquire", "2.1/fix-bug", SESSION]).unwrap();
        if let Command::Acquire(args) = cli.command {
            assert_eq!(args.issue_id, "2.1/fix-bug");
            assert_eq!(args.session_id, SESSION);
            assert_eq!(args.worktree, "");
        } else {
            panic!("Expected Acquire command");
        }
    }

    #[test]
    fn parse_acquire_with_worktree() {
        let cli =
            Cli::try_parse_from(["tether", "acquire", "task-1", SESSION, "--worktree", "/wt/a"])
                .unwrap();
        if let Command::Acquire(args) = cli.command {
            assert_eq!(args.worktree, "/wt/a");
        } else {
            panic!("Expected Acquire command");
        }
    }

    #[test]
    fn parse_acquire_requires_session() {
        assert!(Cli::try_parse_from(["tether", "acquire", "task-1"]).is_err());
    }

    #[test]
    fn parse_update_requires_worktree() {
        assert!(Cli::try_parse_from(["tether", "update", "task-1", SESSION]).is_err());

        let cli =
            Cli::try_parse_from(["tether", "update", "task-1", SESSION, "--worktree", "/wt/b"])
                .unwrap();
        if let Command::Update(args) = cli.command {
            assert_eq!(args.issue_id, "task-1");
            assert_eq!(args.worktree, "/wt/b");
        } else {
            panic!("Expected Update command");
        }
    }

    #[test]
    fn parse_release() {
        let cli = Cli::try_parse_from(["tether", "release", "task-1", SESSION]).unwrap();
        if let Command::Release(args) = cli.command {
            assert_eq!(args.issue_id, "task-1");
            assert_eq!(args.session_id, SESSION);
        } else {
            panic!("Expected Release command");
        }
    }

    #[test]
    fn parse_force_release() {
        let cli = Cli::try_parse_from(["tether", "force-release", "task-1"]).unwrap();
        if let Command::ForceRelease(args) = cli.command {
            assert_eq!(args.issue_id, "task-1");
        } else {
            panic!("Expected ForceRelease command");
        }
    }

    #[test]
    fn parse_check() {
        let cli = Cli::try_parse_from(["tether", "check", "task-1"]).unwrap();
        assert!(matches!(cli.command, Command::Check(args) if args.issue_id == "task-1"));
    }

    #[test]
    fn parse_list() {
        let cli = Cli::try_parse_from(["tether", "list"]).unwrap();
        assert!(matches!(cli.command, Command::List));
    }

    #[test]
    fn parse_project_claim() {
        let cli = Cli::try_parse_from(["tether", "project-claim", SESSION]).unwrap();
        if let Command::ProjectClaim(args) = cli.command {
            assert_eq!(args.session_id, SESSION);
            assert_eq!(args.worktree, "");
        } else {
            panic!("Expected ProjectClaim command");
        }
    }

    #[test]
    fn parse_session_end_with_id() {
        let cli = Cli::try_parse_from(["tether", "session-end", "--session-id", SESSION]).unwrap();
        if let Command::SessionEnd(args) = cli.command {
            assert_eq!(args.session_id.as_deref(), Some(SESSION));
        } else {
            panic!("Expected SessionEnd command");
        }
    }

    #[test]
    fn parse_unknown_command_fails() {
        assert!(Cli::try_parse_from(["tether", "claim"]).is_err());
    }
}
