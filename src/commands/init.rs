//! Implementation of the `tether init` command.
//!
//! Creates the state root with its lock directory, a default
//! `config.yaml`, and a `.gitignore` keeping machine-local state out of
//! version control. Existing files are left alone, so re-running is safe.

use super::emit;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tether::config::Config;
use tether::context::{ProjectContext, init_project};
use tether::error::{Result, TetherError};
use tether::exit_codes;
use tether::fs::atomic_write;
use tether::locks::Outcome;

const GITIGNORE_ENTRIES: [&str; 3] = ["locks/", "worktree-locks/", "events/"];

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename = "initialized")]
struct Initialized {
    project_root: PathBuf,
    locks_dir: PathBuf,
    config_created: bool,
}

impl Outcome for Initialized {
    fn exit_code(&self) -> i32 {
        exit_codes::SUCCESS
    }
}

pub(super) fn cmd_init(project_dir: Option<&Path>) -> Result<i32> {
    let root = match project_dir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().map_err(|e| {
            TetherError::Io(format!("failed to get current working directory: {}", e))
        })?,
    };

    let outcome = initialize(&root)?;
    tracing::info!(
        root = %outcome.project_root.display(),
        config_created = outcome.config_created,
        "initialized tether project"
    );
    emit(&outcome)
}

fn initialize(root: &Path) -> Result<Initialized> {
    let ctx = init_project(root)?;
    let config_created = write_default_config(&ctx)?;
    write_gitignore(&ctx)?;

    Ok(Initialized {
        project_root: ctx.project_root.clone(),
        locks_dir: ctx.locks_dir.clone(),
        config_created,
    })
}

fn write_default_config(ctx: &ProjectContext) -> Result<bool> {
    let config_path = ctx.config_path();
    if config_path.exists() {
        return Ok(false);
    }

    let yaml = Config::default().to_yaml()?;
    atomic_write(&config_path, yaml.as_bytes())?;
    Ok(true)
}

fn write_gitignore(ctx: &ProjectContext) -> Result<()> {
    let path = ctx.state_dir.join(".gitignore");
    let existing = std::fs::read_to_string(&path).unwrap_or_default();

    let missing: Vec<&str> = GITIGNORE_ENTRIES
        .into_iter()
        .filter(|entry| !existing.lines().any(|line| line.trim() == *entry))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let mut content = existing;
    if !content.is_empty() && !content.ends_with('\n') {
        content.push('\n');
    }
    if !content.contains("# Machine-local state") {
        content.push_str("# Machine-local state (never commit)\n");
    }
    for entry in missing {
        content.push_str(entry);
        content.push('\n');
    }

    atomic_write(&path, content.as_bytes())
}
