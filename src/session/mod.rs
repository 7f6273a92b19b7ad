//! Session teardown.
//!
//! [`SessionUnlock`] runs once when an agent session ends. It releases every
//! lock the session holds and purges locks that have gone stale, which is
//! how locks left behind by crashed sessions are recovered. It reads the
//! lock directories itself rather than going through `IssueLock`, and it
//! never fails: each file is handled on its own and problems are logged and
//! counted in the [`UnlockReport`].

mod report;
mod sweep;
mod unlock;


pub use report::UnlockReport;
pub use sweep::remove_stale_locks;
pub use unlock::SessionUnlock;
