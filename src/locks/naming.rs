//! Issue id to lock key mapping and session id validation.

use crate::error::{Result, TetherError};
use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

/// Characters that are unsafe in a filename on at least one platform.
static UNSAFE_FILENAME_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[/\\:*?"<>|\x00-\x1f]"#).expect("Invalid filename character regex")
});

/// Replace every filesystem-unsafe character with `-`.
///
/// `v2.1/fix-bug` becomes `v2.1-fix-bug`, `C:\tmp` becomes `C--tmp`.
pub fn sanitize(raw: &str) -> String {
    UNSAFE_FILENAME_CHARS.replace_all(raw, "-").into_owned()
}

/// Map an issue id to the key its lock file is stored under.
pub fn lock_key(issue_id: &str) -> Result<String> {
    if issue_id.trim().is_empty() {
        return Err(TetherError::InvalidArgument(
            "issue id must not be empty".to_string(),
        ));
    }
    Ok(sanitize(issue_id))
}

/// Reject a session id that is not a UUID, before any I/O happens.
///
/// Returns the id in canonical form (lowercase, hyphenated) so that every
/// spelling of one UUID is stored the same way.
///
/// Both ids are plain strings, so the most common mistake is passing them
/// in the wrong order; the error says so, and says it louder when the
/// issue id is itself a UUID.
pub fn validate_session_id(issue_id: &str, session_id: &str) -> Result<String> {
    if let Ok(uuid) = Uuid::parse_str(session_id) {
        return Ok(uuid.hyphenated().to_string());
    }

    let mut message = format!(
        "invalid session id '{}': expected a UUID.\n\
         Arguments are (issue_id, session_id); check that they were not swapped.",
        session_id
    );
    if Uuid::parse_str(issue_id).is_ok() {
        message.push_str(&format!(
            "\nThe issue id '{}' is a UUID, so the arguments look swapped.",
            issue_id
        ));
    }
    Err(TetherError::InvalidArgument(message))
}

/// Whether two session ids name the same session.
///
/// UUIDs compare by value, so `{6F1C...}` and `6f1c...` match. Anything that
/// is not a UUID compares as an exact string.
pub fn same_session(a: &str, b: &str) -> bool {
    match (Uuid::parse_str(a), Uuid::parse_str(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
