//! Atomic filesystem operations for tether.
//!
//! # Implementation Strategy
//!
//! Every write goes through a temporary file in the same directory:
//! 1. Write content to `.{filename}.{random}.tmp`
//! 2. Sync the file to disk (fsync)
//! 3. Move it into place:
//!    - [`atomic_write`] renames over the target (replace semantics)
//!    - [`publish_new`] hard-links to the target, which fails if the target
//!      already exists (create-if-absent semantics)
//!
//! The temporary name carries a random suffix so concurrent writers on the
//! same target never share a temp file. Source and destination must be on
//! the same filesystem, which holds because the temp file is a sibling.

use crate::error::{Result, TetherError};
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Outcome of [`publish_new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Publish {
    /// The file did not exist and now holds the new content.
    Created,
    /// Another writer got there first; the existing file is untouched.
    AlreadyExists,
}

/// Atomically write bytes to a file, replacing it if it exists.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        TetherError::Io(format!(
            "failed to atomically replace '{}': {}",
            path.display(),
            e
        ))
    })?;

    sync_parent(path);
    Ok(())
}

/// Create a file with the given content only if it does not already exist.
///
/// The content is fully written before the file becomes visible under its
/// final name, so a concurrent reader either sees no file or a complete one.
/// Losing a race is not an error: it returns [`Publish::AlreadyExists`].
pub fn publish_new<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<Publish> {
    let path = path.as_ref();
    ensure_parent(path)?;

    let temp_path = generate_temp_path(path)?;
    write_and_sync(&temp_path, content)?;

    let linked = fs::hard_link(&temp_path, path);
    let _ = fs::remove_file(&temp_path);

    match linked {
        Ok(()) => {
            sync_parent(path);
            Ok(Publish::Created)
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(Publish::AlreadyExists),
        Err(e) if hard_links_unavailable(e.kind()) => {
            tracing::debug!(
                path = %path.display(),
                error = %e,
                "hard link refused; using exclusive create"
            );
            create_new_fallback(path, content)
        }
        Err(e) => Err(TetherError::Io(format!(
            "failed to create '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Remove a file, treating "already gone" as success.
///
/// Returns `true` if this call removed the file.
pub fn remove_if_exists<P: AsRef<Path>>(path: P) -> Result<bool> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(TetherError::Io(format!(
            "failed to remove '{}': {}",
            path.display(),
            e
        ))),
    }
}

/// Whether a failed `hard_link` means the filesystem cannot link at all.
///
/// vfat and many FUSE and SMB mounts answer `link(2)` with EPERM. The temp
/// file was just created in the same directory, so EPERM here is not a
/// permissions problem.
fn hard_links_unavailable(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::Unsupported | ErrorKind::PermissionDenied)
}

/// Exclusive create for filesystems without hard links.
///
/// There is a short window where the file exists but is empty.
fn create_new_fallback(path: &Path, content: &[u8]) -> Result<Publish> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => return Ok(Publish::AlreadyExists),
        Err(e) => {
            return Err(TetherError::Io(format!(
                "failed to create '{}': {}",
                path.display(),
                e
            )));
        }
    };

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            TetherError::Io(format!("failed to write '{}': {}", path.display(), e))
        })?;

    Ok(Publish::Created)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|e| {
            TetherError::Io(format!(
                "failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }
    Ok(())
}

/// Generate a unique temporary file path in the same directory as the target.
fn generate_temp_path(target: &Path) -> Result<PathBuf> {
    let parent = target.parent().unwrap_or(Path::new("."));
    let filename = target
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| TetherError::Io(format!("invalid file path '{}'", target.display())))?;

    let temp_name = format!(".{}.{}.tmp", filename, Uuid::new_v4().simple());
    Ok(parent.join(temp_name))
}

/// Write content to a file and sync to disk.
fn write_and_sync(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(|e| {
        TetherError::Io(format!(
            "failed to create temporary file '{}': {}",
            path.display(),
            e
        ))
    })?;

    file.write_all(content)
        .and_then(|()| file.sync_all())
        .map_err(|e| {
            let _ = fs::remove_file(path);
            TetherError::Io(format!(
                "failed to write temporary file '{}': {}",
                path.display(),
                e
            ))
        })
}

fn sync_parent(path: &Path) {
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }
}
