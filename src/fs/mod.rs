//! Filesystem utilities for tether.
//!
//! Lock records are only ever written as whole files: new records are
//! published with an atomic create-if-absent, existing records are replaced
//! with write-temp-then-rename. Readers never see a partial record.

pub mod atomic;

pub use atomic::{Publish, atomic_write, publish_new, remove_if_exists};
