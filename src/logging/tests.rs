//! Tests for the logging system

use super::*;
use std::collections::HashMap;
use tempfile::TempDir;

#[test]
fn test_log_level_directive_names() {
    assert_eq!(LogLevel::Trace.as_str(), "trace");
    assert_eq!(LogLevel::Debug.as_str(), "debug");
    assert_eq!(LogLevel::Info.as_str(), "info");
    assert_eq!(LogLevel::Warn.as_str(), "warn");
    assert_eq!(LogLevel::Error.as_str(), "error");
}

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert_eq!(config.level, LogLevel::Info);
    assert_eq!(config.format, LogFormat::Text);
    assert_eq!(config.output, LogOutput::Console);
    assert!(config.output.writes_console());
    assert!(!config.output.writes_file());
    assert!(config.module_levels.is_empty());
}

#[test]
fn test_logging_config_presets() {
    let dev = LoggingConfig::development();
    assert_eq!(dev.level, LogLevel::Debug);
    assert_eq!(dev.format, LogFormat::Text);
    assert_eq!(dev.output, LogOutput::Console);

    let prod = LoggingConfig::production();
    assert_eq!(prod.level, LogLevel::Info);
    assert_eq!(prod.format, LogFormat::Json);
    assert!(prod.output.writes_console() && prod.output.writes_file());
    assert!(prod.log_directory.is_some());
    assert_eq!(prod.module_levels.get("tower_http"), Some(&LogLevel::Warn));
}

#[test]
fn test_logging_config_deserialize_partial() {
    let config: LoggingConfig =
        serde_json::from_str(r#"{"level":"warn","format":"json","rotation":"hourly"}"#).unwrap();
    assert_eq!(config.level, LogLevel::Warn);
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.output, LogOutput::Console);
    assert_eq!(config.rotation, RotationStrategy::Hourly);
    assert!(config.log_directory.is_none());
}

#[test]
fn test_resolved_log_directory() {
    let dir = TempDir::new().unwrap();
    let config = LoggingConfig {
        output: LogOutput::File,
        log_directory: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    assert_eq!(config.resolved_log_directory(), dir.path());

    let unset = LoggingConfig::default();
    assert_eq!(unset.resolved_log_directory(), default_log_directory());
}

#[test]
fn test_env_filter_from_module_levels() {
    let config = LoggingConfig {
        level: LogLevel::Warn,
        module_levels: HashMap::from([
            ("avatar_gate".to_string(), LogLevel::Debug),
            ("tower_http".to_string(), LogLevel::Error),
        ]),
        ..Default::default()
    };

    let rendered = LoggingSystem::build_env_filter(&config)
        .unwrap()
        .to_string()
        .to_lowercase();
    assert!(rendered.contains("avatar_gate=debug"));
    assert!(rendered.contains("tower_http=error"));
}

#[test]
fn test_rust_log_overrides_config() {
    let config = LoggingConfig::default();

    let rendered = LoggingSystem::resolve_env_filter(&config, Some("avatar_gate=trace"))
        .unwrap()
        .to_string()
        .to_lowercase();
    assert!(rendered.contains("avatar_gate=trace"));

    // Blank RUST_LOG falls back to the configured level
    assert!(LoggingSystem::resolve_env_filter(&config, Some("  ")).is_ok());
}

#[test]
fn test_invalid_rust_log_does_not_affect_fallback_filter() {
    let bad = Some("avatar_gate=loudest");
    assert!(matches!(
        LoggingSystem::resolve_env_filter(&LoggingConfig::default(), bad),
        Err(LoggingError::InvalidDirective(_))
    ));

    // The fallback builds its filter from the level alone
    let fallback = LoggingConfig::fallback(LogLevel::Info);
    assert_eq!(fallback.output, LogOutput::Console);
    assert!(LoggingSystem::build_env_filter(&fallback).is_ok());
}

#[test]
fn test_file_rotation_mapping() {
    assert_eq!(file_rotation(RotationStrategy::Daily), Rotation::DAILY);
    assert_eq!(file_rotation(RotationStrategy::Hourly), Rotation::HOURLY);
    assert_eq!(file_rotation(RotationStrategy::Never), Rotation::NEVER);
}
