/*!
 * # ass2vtt - ASS to WebVTT subtitle converter
 *
 * A Rust library and command-line tool that batch-converts Advanced
 * SubStation Alpha (`.ass`) subtitles into WebVTT (`.vtt`) files.
 *
 * ## Features
 *
 * - Parse the `[Events]` section of `.ass` scripts, honoring its `Format:` line
 * - Strip override tags and convert ASS line breaks to plain cue lines
 * - Emit WebVTT with millisecond timestamps and optional cue numbers
 * - Batch-convert a directory, writing each output next to its source
 * - Localized status output (English / Chinese)
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: ASS parsing and WebVTT formatting
 * - `file_utils`: File system operations
 * - `app_controller`: Batch conversion driver
 * - `messages`: Localized message table
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod app_controller;
pub mod messages;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{BatchReport, Controller, FileResult, FileStatus};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use messages::{DisplayLanguage, MessageKey, localize};
pub use errors::{AppError, ConversionError};
