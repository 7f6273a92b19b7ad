//! Issue locks.
//!
//! One lock file per issue lives in `.tether/locks/`, holding the owning
//! session's id. The existence of `<key>.lock` is the mutual-exclusion
//! primitive: there is no lock server and no lock on the lock directory.
//!
//! # Lock Files
//!
//! Each lock file contains JSON:
//! - `issue`: The issue id as given by the caller
//! - `session_id`: UUID of the owning session
//! - `worktree`: Worktree path for the work (may be empty)
//! - `created_at`: Unix timestamp (seconds) of acquisition
//! - `created_iso`: The same instant as RFC 3339
//!
//! The key is the issue id with filesystem-unsafe characters replaced by
//! `-` (see [`naming::sanitize`]).
//!
//! # Admission Control
//!
//! `acquire` never blocks. A caller denied a lock gets a `locked` outcome
//! telling it to pick other work.

pub mod naming;
mod manager;
pub mod outcome;
mod record;
mod store;


pub use manager::IssueLock;
pub use outcome::{
    AcquireMode, AcquireOutcome, CheckOutcome, NextAction, Outcome, ReleaseOutcome,
    UpdateOutcome,
};
pub use record::LockRecord;
pub use store::{LockEntry, read_record, scan_records};
