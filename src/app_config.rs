use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::errors::ConversionError;
use crate::messages::DisplayLanguage;

/// Application configuration module
/// This module handles the application configuration including loading
/// from an optional JSON file and validating settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Output file suffix, with or without the leading dot
    pub output_suffix: String,

    /// Language of status messages
    pub language: DisplayLanguage,

    /// Log level
    pub log_level: LogLevel,

    /// Emit numeric cue identifiers
    pub numbered_cues: bool,

    /// Stable-sort cues by start time before writing
    pub sort_cues: bool,

    /// Leave existing output files untouched
    pub skip_existing: bool,
}

/// Log level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching filter for the log facade
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_output_suffix() -> String {
    ".vtt".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_suffix: default_output_suffix(),
            language: DisplayLanguage::default(),
            log_level: LogLevel::default(),
            numbered_cues: false,
            sort_cues: false,
            skip_existing: false,
        }
    }
}

impl Config {
    /// Load configuration from a JSON file; absent fields take their defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;

        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        normalize_suffix(&self.output_suffix).context("Configuration validation failed")?;
        Ok(())
    }

    /// Output suffix with a single leading dot
    pub fn normalized_suffix(&self) -> Result<String, ConversionError> {
        normalize_suffix(&self.output_suffix)
    }
}

/// Normalize a user-supplied suffix so `vtt` and `.vtt` are equivalent
///
/// Empty suffixes and suffixes containing path separators are rejected.
pub fn normalize_suffix(suffix: &str) -> Result<String, ConversionError> {
    let trimmed = suffix.trim();
    let bare = trimmed.strip_prefix('.').unwrap_or(trimmed);

    if bare.is_empty() {
        return Err(ConversionError::InvalidConfig(format!(
            "output suffix is empty: {:?}",
            suffix
        )));
    }

    if bare.contains(['/', '\\']) || bare == "." {
        return Err(ConversionError::InvalidConfig(format!(
            "output suffix must not contain path separators: {:?}",
            suffix
        )));
    }

    Ok(format!(".{}", bare))
}
