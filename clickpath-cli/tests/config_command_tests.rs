//! Integration tests for configuration handling.
//!
//! Tests config loading and validation with real TOML files.

use std::fs;
use tempfile::TempDir;

use clickpath_core::config::ClickpathConfig;

#[tokio::test]
async fn valid_config_file_loads() {
    // Given: A valid config file
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("clickpath.toml");

    let valid_config = r#"
[general]
log_level = "debug"
log_format = "json"

[access_log]
format = "performance"

[scenario]
session_cookie = "PHPSESSID"

[output]
format = "json"
"#;

    fs::write(&config_path, valid_config).expect("should write config");

    // When: Loading the config
    let config = ClickpathConfig::load(&config_path)
        .await
        .expect("valid config should load");

    // Then: Values are applied over defaults
    assert_eq!(config.general.log_level, "debug");
    assert_eq!(config.access_log.format, "performance");
    assert_eq!(config.scenario.session_cookie, "PHPSESSID");
    assert_eq!(config.output.format, "json");
    // untouched section keeps defaults
    assert_eq!(
        config.scenario.start_marker_header,
        "Business-Scenario-Start-Marker"
    );
}

#[tokio::test]
async fn malformed_config_file_fails() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("bad.toml");

    fs::write(&config_path, "[general\nlog_level = \"info\"").expect("should write bad config");

    let result = ClickpathConfig::load(&config_path).await;
    assert!(result.is_err(), "malformed TOML should fail to load");
}

#[tokio::test]
async fn invalid_values_fail_validation() {
    let temp_dir = TempDir::new().expect("should create temp dir");
    let config_path = temp_dir.path().join("clickpath.toml");

    fs::write(
        &config_path,
        "[output]\nformat = \"xml\"",
    )
    .expect("should write config");

    let result = ClickpathConfig::load(&config_path).await;
    assert!(result.is_err(), "unknown output format should fail validation");
}

#[tokio::test]
async fn default_config_round_trips_through_toml() {
    // config init writes exactly this shape
    let serialized =
        toml::to_string_pretty(&ClickpathConfig::default()).expect("default config serializes");
    let parsed = ClickpathConfig::parse(&serialized).expect("serialized default parses");
    parsed.validate().expect("round-tripped default validates");
}
