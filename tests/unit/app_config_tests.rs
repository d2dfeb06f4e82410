/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use ass2vtt::app_config::{normalize_suffix, Config, LogLevel};
use ass2vtt::messages::DisplayLanguage;
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.output_suffix, ".vtt");
    assert_eq!(config.language, DisplayLanguage::En);
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(!config.numbered_cues);
    assert!(!config.sort_cues);
    assert!(!config.skip_existing);
    assert!(config.validate().is_ok());
}

/// Suffixes with and without a dot are equivalent
#[test]
fn test_normalize_suffix_withOrWithoutDot_shouldAddSingleDot() -> Result<()> {
    assert_eq!(normalize_suffix("vtt")?, ".vtt");
    assert_eq!(normalize_suffix(".vtt")?, ".vtt");
    assert_eq!(normalize_suffix(" .webvtt ")?, ".webvtt");
    assert_eq!(normalize_suffix("zh.vtt")?, ".zh.vtt");
    Ok(())
}

/// Empty or path-like suffixes are rejected
#[test]
fn test_normalize_suffix_withInvalidSuffix_shouldFail() {
    assert!(normalize_suffix("").is_err());
    assert!(normalize_suffix(".").is_err());
    assert!(normalize_suffix("   ").is_err());
    assert!(normalize_suffix("../vtt").is_err());
    assert!(normalize_suffix("a\\b").is_err());
}

/// Validation fails on a bad suffix
#[test]
fn test_config_validation_withEmptySuffix_shouldFail() {
    let config = Config {
        output_suffix: String::new(),
        ..Config::default()
    };
    assert!(config.validate().is_err());
}

/// Partial JSON files fall back to defaults for missing fields
#[test]
fn test_load_from_file_withPartialJson_shouldFillDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "conf.json",
        r#"{ "language": "zh", "output_suffix": "webvtt", "numbered_cues": true }"#,
    )?;

    let config = Config::load_from_file(&path)?;

    assert_eq!(config.language, DisplayLanguage::Zh);
    assert_eq!(config.output_suffix, "webvtt");
    assert!(config.numbered_cues);
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.normalized_suffix()?, ".webvtt");

    Ok(())
}

/// Broken or missing files are errors
#[test]
fn test_load_from_file_withInvalidFile_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_from_file(&path).is_err());
    assert!(Config::load_from_file(temp_dir.path().join("missing.json")).is_err());

    Ok(())
}

/// Config serializes and reloads unchanged
#[test]
fn test_config_serialization_withCustomValues_shouldReloadEqual() -> Result<()> {
    let config = Config {
        output_suffix: ".webvtt".to_string(),
        language: DisplayLanguage::Zh,
        log_level: LogLevel::Debug,
        numbered_cues: true,
        sort_cues: true,
        skip_existing: true,
    };

    let json = serde_json::to_string_pretty(&config)?;
    assert!(json.contains("\"zh\""));
    assert!(json.contains("\"debug\""));

    let reloaded: Config = serde_json::from_str(&json)?;
    assert_eq!(reloaded, config);

    Ok(())
}

/// Log levels map onto the log facade filters
#[test]
fn test_log_level_toLevelFilter_shouldMatch() {
    assert_eq!(LogLevel::Error.to_level_filter(), log::LevelFilter::Error);
    assert_eq!(LogLevel::Trace.to_level_filter(), log::LevelFilter::Trace);
}
