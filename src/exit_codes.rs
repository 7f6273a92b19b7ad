//! Exit code constants for the tether CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unreadable config, I/O failure)
//! - 2: Not a project (no `.tether/` state root)
//! - 3: Corrupt lock file
//! - 4: Lock conflict (issue held by another session, or ownership check failed)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid config, or filesystem failure.
pub const USER_ERROR: i32 = 1;

/// The target directory has no `.tether/` state root.
pub const NOT_A_PROJECT: i32 = 2;

/// A lock file exists but could not be parsed.
pub const CORRUPT_LOCK: i32 = 3;

/// Lock conflict: `locked` or `error` outcome from a lock operation.
pub const LOCK_CONFLICT: i32 = 4;
