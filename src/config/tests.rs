//! Tests for config functionality.

use crate::config::{Config, DEFAULT_STALE_LOCK_HOURS};
use crate::error::TetherError;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.stale_lock_hours, DEFAULT_STALE_LOCK_HOURS);
    assert_eq!(config.stale_lock_hours, 24);
    assert!(config.record_events);
    assert_eq!(config.stale_after().num_seconds(), 24 * 60 * 60);
}

#[test]
fn test_parse_empty_yaml_uses_defaults() {
    let config = Config::from_yaml("").unwrap();

    assert_eq!(config.stale_lock_hours, 24);
    assert!(config.record_events);
}

#[test]
fn test_parse_partial_yaml() {
    let config = Config::from_yaml("record_events: false\n").unwrap();

    assert!(!config.record_events);
    assert_eq!(config.stale_lock_hours, 24);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
stale_lock_hours: 6
record_events: false
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.stale_lock_hours, 6);
    assert!(!config.record_events);
    assert_eq!(config.stale_after().num_hours(), 6);
}

#[test]
fn test_parse_yaml_with_unknown_fields() {
    let yaml = r#"
stale_lock_hours: 12
future_feature: enabled
nested:
  value: true
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.stale_lock_hours, 12);
    assert!(config.record_events);
}

#[test]
fn test_validate_zero_stale_lock_hours() {
    let result = Config::from_yaml("stale_lock_hours: 0");

    let err = result.unwrap_err();
    assert!(matches!(err, TetherError::Config(_)));
    assert!(err.to_string().contains("stale_lock_hours"));
    assert!(err.to_string().contains("greater than 0"));
}

#[test]
fn test_invalid_yaml_is_config_error() {
    let result = Config::from_yaml("stale_lock_hours: [not, a, number]");
    assert!(matches!(result, Err(TetherError::Config(_))));
}

#[test]
fn test_load_or_default_missing_file() {
    let temp = TempDir::new().unwrap();

    let config = Config::load_or_default(temp.path().join("config.yaml")).unwrap();
    assert_eq!(config.stale_lock_hours, 24);
}

#[test]
fn test_load_or_default_reads_existing_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.yaml");
    std::fs::write(&path, "stale_lock_hours: 48\n").unwrap();

    let config = Config::load_or_default(&path).unwrap();
    assert_eq!(config.stale_lock_hours, 48);
}

#[test]
fn test_load_missing_file_is_error() {
    let temp = TempDir::new().unwrap();

    let result = Config::load(temp.path().join("nope.yaml"));
    assert!(result.unwrap_err().to_string().contains("failed to read config file"));
}

#[test]
fn test_yaml_roundtrip_keeps_values() {
    let config = Config {
        stale_lock_hours: 3,
        record_events: false,
    };

    let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
    assert_eq!(parsed.stale_lock_hours, 3);
    assert!(!parsed.record_events);
}
