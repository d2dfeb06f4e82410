/*!
 * Error types for the ass2vtt application.
 *
 * Per-file conversion failures are typed so the batch driver can record them
 * and keep going; application plumbing uses `anyhow` on top of these.
 */

use std::path::PathBuf;
use thiserror::Error;

use crate::messages::MessageKey;

/// Errors that can occur while converting a single subtitle file
#[derive(Error, Debug)]
pub enum ConversionError {
    /// Input path is missing or cannot be read
    #[error("File not found or unreadable: {}", path.display())]
    FileNotFound {
        /// Path that was looked up
        path: PathBuf,
    },

    /// Input has no parsable dialogue events
    #[error("Malformed input {}: {reason}", path.display())]
    MalformedInput {
        /// Offending file
        path: PathBuf,
        /// What was wrong with it
        reason: String,
    },

    /// Output file could not be written
    #[error("Failed to write {}: {reason}", path.display())]
    WriteFailure {
        /// Output path
        path: PathBuf,
        /// Underlying I/O error text
        reason: String,
    },

    /// Configuration value rejected before any file was touched
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ConversionError {
    /// Build a `MalformedInput` for content that did not come from a file
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            path: PathBuf::new(),
            reason: reason.into(),
        }
    }

    /// Attach the source path to a `MalformedInput` raised by the parser
    pub fn with_path(self, source: impl Into<PathBuf>) -> Self {
        match self {
            Self::MalformedInput { reason, .. } => Self::MalformedInput {
                path: source.into(),
                reason,
            },
            other => other,
        }
    }

    /// Localized message key describing this error kind
    pub fn message_key(&self) -> MessageKey {
        match self {
            Self::FileNotFound { .. } => MessageKey::ErrorFileNotFound,
            Self::MalformedInput { .. } => MessageKey::ErrorMalformedInput,
            Self::WriteFailure { .. } => MessageKey::ErrorWriteFailure,
            Self::InvalidConfig(_) => MessageKey::InvalidSuffix,
        }
    }

    /// Short, language-neutral detail for status lines
    pub fn detail(&self) -> String {
        match self {
            Self::FileNotFound { path } => path.display().to_string(),
            Self::MalformedInput { reason, .. } => reason.clone(),
            Self::WriteFailure { reason, .. } => reason.clone(),
            Self::InvalidConfig(reason) => reason.clone(),
        }
    }

    /// Whether this error should abort the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::FileNotFound { .. } | Self::InvalidConfig(_))
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from a conversion
    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        match error.downcast::<ConversionError>() {
            Ok(conversion) => Self::Conversion(conversion),
            Err(other) => Self::Unknown(other.to_string()),
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
