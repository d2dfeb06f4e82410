// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use log::{error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};

use ass2vtt::app_config::{Config, LogLevel};
use ass2vtt::messages::{localize, DisplayLanguage, MessageKey};
use ass2vtt::{AppError, Controller};

/// Exit code when at least one file failed to convert
const EXIT_PARTIAL_FAILURE: u8 = 1;

/// Exit code for errors that stop the run before or instead of converting
const EXIT_FATAL: u8 = 2;

/// CLI Wrapper for DisplayLanguage to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLanguage {
    Zh,
    En,
}

impl From<CliLanguage> for DisplayLanguage {
    fn from(cli_language: CliLanguage) -> Self {
        match cli_language {
            CliLanguage::Zh => DisplayLanguage::Zh,
            CliLanguage::En => DisplayLanguage::En,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate shell completions for ass2vtt
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// ass2vtt - convert ASS subtitles to WebVTT
///
/// Converts every .ass file in a directory (or a single .ass file) to WebVTT,
/// writing each result next to its source.
#[derive(Parser, Debug)]
#[command(name = "ass2vtt")]
#[command(version)]
#[command(about = "Batch-convert ASS subtitles to WebVTT")]
#[command(long_about = "ass2vtt converts Advanced SubStation Alpha (.ass) subtitles to WebVTT.

EXAMPLES:
    ass2vtt ./subs                          # Convert every .ass file in ./subs
    ass2vtt ./subs --lang zh                # Status messages in Chinese
    ass2vtt ./subs --suffix .webvtt         # Write foo.webvtt instead of foo.vtt
    ass2vtt episode01.ass --numbered        # Single file, numbered cues
    ass2vtt completions bash > ass2vtt.bash # Generate bash completions

EXIT STATUS:
    0  every file converted (or skipped)
    1  at least one file failed to convert
    2  input missing or unreadable, or invalid configuration")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory of .ass files, or a single .ass file
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// Language of status messages
    #[arg(short = 'L', long = "lang", value_enum)]
    lang: Option<CliLanguage>,

    /// Output suffix, e.g. '.vtt' or 'webvtt'
    #[arg(short, long)]
    suffix: Option<String>,

    /// Prefix each cue with a numeric identifier
    #[arg(short, long)]
    numbered: bool,

    /// Sort cues by start time before writing
    #[arg(long)]
    sort: bool,

    /// Leave existing output files untouched
    #[arg(long)]
    skip_existing: bool,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom stderr logger; filtering follows `log::max_level()`
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr().lock();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> ExitCode {
    // Info until the configuration says otherwise
    if let Err(e) = CustomLogger::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    let cli = CommandLineOptions::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "ass2vtt", &mut std::io::stdout());
        return ExitCode::SUCCESS;
    }

    let Some(input_path) = cli.input_path.clone() else {
        CommandLineOptions::command()
            .error(ErrorKind::MissingRequiredArgument, "INPUT_PATH is required when no subcommand is specified")
            .exit();
    };

    let fallback_language = cli.lang.map(DisplayLanguage::from).unwrap_or_default();

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => return report_fatal(e, fallback_language),
    };

    log::set_max_level(config.log_level.to_level_filter());

    let language = config.language;
    let controller = match Controller::with_config(config) {
        Ok(controller) => controller,
        Err(e) => return report_fatal(e.into(), language),
    };

    match controller.run(&input_path) {
        Ok(report) => {
            for line in report.status_lines(language) {
                println!("{}", line);
            }

            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(EXIT_PARTIAL_FAILURE)
            }
        }
        Err(e) => report_fatal(e.into(), language),
    }
}

/// Load the optional config file and apply command-line overrides
fn build_config(cli: &CommandLineOptions) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Config::load_from_file(path)?
        }
        None => Config::default(),
    };

    if let Some(lang) = cli.lang {
        config.language = lang.into();
    }

    if let Some(suffix) = &cli.suffix {
        config.output_suffix = suffix.clone();
    }

    if let Some(log_level) = cli.log_level {
        config.log_level = log_level.into();
    }

    config.numbered_cues |= cli.numbered;
    config.sort_cues |= cli.sort;
    config.skip_existing |= cli.skip_existing;

    config.validate().context("Invalid settings")?;

    Ok(config)
}

/// Log a run-stopping error in the display language and pick the exit code
fn report_fatal(error: anyhow::Error, language: DisplayLanguage) -> ExitCode {
    match AppError::from(error) {
        AppError::Conversion(e) => {
            error!("{}: {}", localize(language, e.message_key(), &[]), e.detail());
        }
        other => {
            error!("{}: {}", localize(language, MessageKey::Error, &[]), other);
        }
    }

    ExitCode::from(EXIT_FATAL)
}
