//! Append-only audit log for lock mutations.
//!
//! Events are stored in NDJSON format (one JSON object per line) in
//! `.tether/events/events.ndjson`.
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: acquire, release, force_release or session_end
//! - `actor`: The OS user and host (e.g., `user@HOST`)
//! - `session`: Optional session id
//! - `issue`: Optional issue id
//! - `details`: Freeform object with action-specific details
//!
//! Logging is best-effort from the lock operations' point of view: a failed
//! append is reported through `tracing` and never fails the operation.

use crate::context::ProjectContext;
use crate::error::{Result, TetherError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// A new lock was created.
    Acquire,
    /// A lock was released by its owner.
    Release,
    /// A lock was removed without an ownership check.
    ForceRelease,
    /// Session teardown ran.
    SessionEnd,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Acquire => write!(f, "acquire"),
            EventAction::Release => write!(f, "release"),
            EventAction::ForceRelease => write!(f, "force_release"),
            EventAction::SessionEnd => write!(f, "session_end"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    pub actor: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue: Option<String>,

    pub details: Value,
}

impl Event {
    /// Create a new event stamped now, with the actor taken from the environment.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            session: None,
            issue: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session = Some(session_id.into());
        self
    }

    pub fn with_issue(mut self, issue: impl Into<String>) -> Self {
        self.issue = Some(issue.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| TetherError::Io(format!("failed to serialize event to JSON: {}", e)))
    }
}

fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the events log, creating the file if needed.
pub fn append_event(ctx: &ProjectContext, event: &Event) -> Result<()> {
    let events_file = ctx.events_file();
    let json_line = event.to_ndjson_line()?;

    let events_dir = ctx.events_dir();
    if !events_dir.exists() {
        fs::create_dir_all(&events_dir).map_err(|e| {
            TetherError::Io(format!(
                "failed to create events directory '{}': {}",
                events_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            TetherError::Io(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        TetherError::Io(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

/// Append an event, logging instead of failing.
pub(crate) fn record(ctx: &ProjectContext, event: Event) {
    if let Err(e) = append_event(ctx, &event) {
        tracing::warn!(action = %event.action, error = %e, "failed to record event");
    }
}

/// Read every event back from the log. Lines that fail to parse are skipped.
pub fn read_events(ctx: &ProjectContext) -> Result<Vec<Event>> {
    let events_file = ctx.events_file();
    if !events_file.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(&events_file).map_err(|e| {
        TetherError::Io(format!(
            "failed to read events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{create_test_project, test_context};
    use serde_json::json;

    #[test]
    fn test_event_creation() {
        let event = Event::new(EventAction::Acquire);

        assert_eq!(event.action, EventAction::Acquire);
        assert!(event.actor.contains('@'));
        assert!(event.session.is_none());
        assert!(event.issue.is_none());
        let age = Utc::now().signed_duration_since(event.ts);
        assert!(age.num_minutes() < 1);
    }

    #[test]
    fn test_event_builders() {
        let event = Event::new(EventAction::ForceRelease)
            .with_issue("task-1")
            .with_session("abc")
            .with_details(json!({"previous_owner": "abc"}));

        assert_eq!(event.issue.as_deref(), Some("task-1"));
        assert_eq!(event.session.as_deref(), Some("abc"));
        assert_eq!(event.details["previous_owner"], "abc");
    }

    #[test]
    fn test_event_serialization_is_single_line_snake_case() {
        let event = Event::new(EventAction::SessionEnd).with_details(json!({"a": 1}));
        let line = event.to_ndjson_line().unwrap();

        assert!(!line.contains('\n'));
        assert!(line.contains("\"session_end\""));
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(parsed.get("issue").is_none());
    }

    #[test]
    fn test_append_and_read_events() {
        let temp = create_test_project();
        let ctx = test_context(&temp);

        append_event(&ctx, &Event::new(EventAction::Acquire).with_issue("a")).unwrap();
        append_event(&ctx, &Event::new(EventAction::Release).with_issue("a")).unwrap();

        let content = fs::read_to_string(ctx.events_file()).unwrap();
        assert!(content.ends_with('\n'));
        assert_eq!(content.lines().count(), 2);

        let events = read_events(&ctx).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, EventAction::Acquire);
        assert_eq!(events[1].action, EventAction::Release);
    }

    #[test]
    fn test_read_events_skips_garbage_lines() {
        let temp = create_test_project();
        let ctx = test_context(&temp);
        append_event(&ctx, &Event::new(EventAction::Acquire)).unwrap();
        let mut file = OpenOptions::new().append(true).open(ctx.events_file()).unwrap();
        writeln!(file, "not json").unwrap();

        assert_eq!(read_events(&ctx).unwrap().len(), 1);
    }

    #[test]
    fn test_read_events_without_log() {
        let temp = create_test_project();
        let ctx = test_context(&temp);

        assert!(read_events(&ctx).unwrap().is_empty());
    }

    #[test]
    fn test_event_action_display() {
        assert_eq!(EventAction::Acquire.to_string(), "acquire");
        assert_eq!(EventAction::Release.to_string(), "release");
        assert_eq!(EventAction::ForceRelease.to_string(), "force_release");
        assert_eq!(EventAction::SessionEnd.to_string(), "session_end");
    }
}
