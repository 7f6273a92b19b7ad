//! Config struct definition and default implementation.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Default age after which a lock is purged regardless of owner.
pub const DEFAULT_STALE_LOCK_HOURS: u32 = 24;

/// Configuration for a tether project.
///
/// This struct represents the contents of `.tether/config.yaml`.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hours after which a lock is stale and removed by the session-end sweep.
    #[serde(default = "default_stale_lock_hours")]
    pub stale_lock_hours: u32,

    /// Whether lock mutations are appended to `.tether/events/events.ndjson`.
    #[serde(default = "default_true")]
    pub record_events: bool,
}

fn default_stale_lock_hours() -> u32 {
    DEFAULT_STALE_LOCK_HOURS
}
fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stale_lock_hours: default_stale_lock_hours(),
            record_events: default_true(),
        }
    }
}

impl Config {
    /// The stale threshold as a duration.
    pub fn stale_after(&self) -> Duration {
        Duration::hours(i64::from(self.stale_lock_hours))
    }
}
