//! Tether: file-based issue locks for concurrent agent sessions.
//!
//! Agent sessions working in one project claim issues through
//! [`locks::IssueLock`] before touching them. Locks are plain JSON files
//! under `.tether/locks/`, so coordination needs no server and survives
//! crashes: [`session::SessionUnlock`] releases a session's locks when it
//! ends and sweeps locks left behind by sessions that never did.

pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod session;

#[cfg(test)]
mod test_support;
