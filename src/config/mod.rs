//! Configuration model for tether.
//!
//! This module defines the Config struct that represents `.tether/config.yaml`.
//! The file is optional. It supports forward-compatible YAML parsing (unknown
//! fields are ignored), defaults for every field, and validation of values.

mod model;
mod operations;

#[cfg(test)]
mod tests;

pub use model::{Config, DEFAULT_STALE_LOCK_HOURS};
