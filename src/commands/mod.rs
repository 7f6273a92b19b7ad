//! Command implementations for tether.
//!
//! Each handler runs one library operation, prints its result to stdout as
//! JSON, and returns the exit code the result maps to. Errors propagate to
//! `main`, which reports them on stderr.

mod init;
mod lock;
mod session;

use crate::cli::{Cli, Command};
use serde::Serialize;
use std::path::Path;
use tether::context::ProjectContext;
use tether::error::{Result, TetherError};
use tether::locks::{IssueLock, Outcome};

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<i32> {
    let project_dir = cli.project_dir.as_deref();

    match cli.command {
        Command::Init => init::cmd_init(project_dir),
        Command::Acquire(args) => lock::cmd_acquire(project_dir, args),
        Command::Update(args) => lock::cmd_update(project_dir, args),
        Command::Release(args) => lock::cmd_release(project_dir, args),
        Command::ForceRelease(args) => lock::cmd_force_release(project_dir, args),
        Command::Check(args) => lock::cmd_check(project_dir, args),
        Command::List => lock::cmd_list(project_dir),
        Command::ProjectClaim(args) => lock::cmd_project_claim(project_dir, args),
        Command::SessionEnd(args) => session::cmd_session_end(project_dir, args),
    }
}

/// Resolve the project from `--project-dir`, or by walking up from the cwd.
fn resolve_project(project_dir: Option<&Path>) -> Result<ProjectContext> {
    match project_dir {
        Some(dir) => Ok(ProjectContext::resolve_from(dir)),
        None => ProjectContext::resolve(),
    }
}

fn open_locks(project_dir: Option<&Path>) -> Result<IssueLock> {
    IssueLock::new(resolve_project(project_dir)?)
}

/// Print `outcome` as JSON on stdout and return its exit code.
fn emit<T: Outcome>(outcome: &T) -> Result<i32> {
    print_json(outcome)?;
    Ok(outcome.exit_code())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| TetherError::Io(format!("failed to serialize result: {}", e)))?;
    println!("{}", json);
    Ok(())
}
