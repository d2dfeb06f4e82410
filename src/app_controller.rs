use log::{error, warn, info, debug};
use std::path::{Path, PathBuf};
use indicatif::{ProgressBar, ProgressStyle};

use crate::app_config::Config;
use crate::errors::ConversionError;
use crate::file_utils::FileManager;
use crate::messages::{localize, DisplayLanguage, MessageKey};
use crate::subtitle_processor::SubtitleCollection;

// @module: Batch conversion driver

/// Outcome of converting one input file
#[derive(Debug)]
pub enum FileStatus {
    /// Output written
    Converted {
        output: PathBuf,
        cue_count: usize,
    },
    /// Output already existed and `skip_existing` is set
    Skipped {
        output: PathBuf,
    },
    /// Conversion failed; the batch carried on
    Failed(ConversionError),
}

/// One input file and what happened to it
#[derive(Debug)]
pub struct FileResult {
    pub input: PathBuf,
    pub status: FileStatus,
}

impl FileResult {
    fn file_name(&self) -> String {
        display_name(&self.input)
    }

    /// Localized status line for this file
    pub fn status_line(&self, language: DisplayLanguage) -> String {
        let name = self.file_name();
        match &self.status {
            FileStatus::Converted { output, .. } => {
                let output_name = display_name(output);
                localize(language, MessageKey::Converted, &[name.as_str(), output_name.as_str()])
            }
            FileStatus::Skipped { .. } => localize(language, MessageKey::Skipped, &[name.as_str()]),
            FileStatus::Failed(e) => {
                let reason = format!("{}: {}", localize(language, e.message_key(), &[]), e.detail());
                localize(language, MessageKey::Failed, &[name.as_str(), reason.as_str()])
            }
        }
    }
}

/// Accumulated results of a batch run
#[derive(Debug, Default)]
pub struct BatchReport {
    pub results: Vec<FileResult>,
}

impl BatchReport {
    /// Number of files converted
    pub fn successes(&self) -> usize {
        self.results.iter()
            .filter(|r| matches!(r.status, FileStatus::Converted { .. }))
            .count()
    }

    /// Number of files that failed
    pub fn failures(&self) -> usize {
        self.results.iter()
            .filter(|r| matches!(r.status, FileStatus::Failed(_)))
            .count()
    }

    /// Number of files skipped because their output existed
    pub fn skipped(&self) -> usize {
        self.results.iter()
            .filter(|r| matches!(r.status, FileStatus::Skipped { .. }))
            .count()
    }

    /// True when no file failed
    pub fn is_success(&self) -> bool {
        self.failures() == 0
    }

    /// Localized per-file lines followed by the summary
    pub fn status_lines(&self, language: DisplayLanguage) -> Vec<String> {
        let mut lines: Vec<String> = self.results.iter()
            .map(|r| r.status_line(language))
            .collect();

        let counts = [self.successes(), self.failures(), self.skipped()].map(|n| n.to_string());
        lines.push(localize(language, MessageKey::Summary, &[
            counts[0].as_str(),
            counts[1].as_str(),
            counts[2].as_str(),
        ]));

        if !self.results.is_empty() {
            let closing = if self.is_success() {
                MessageKey::AllFilesConverted
            } else {
                MessageKey::ConversionCompleted
            };
            lines.push(localize(language, closing, &[]));
        }

        lines
    }
}

/// Main application controller for batch conversion
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Normalized output suffix
    suffix: String,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self, ConversionError> {
        let suffix = config.normalized_suffix()?;
        Ok(Self { config, suffix })
    }

    /// Configuration this controller runs with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Where the output for `input_file` is written
    pub fn output_path_for(&self, input_file: &Path) -> PathBuf {
        FileManager::generate_output_path(input_file, &self.suffix)
    }

    /// Convert a directory of `.ass` files, or a single file
    pub fn run(&self, input_path: &Path) -> Result<BatchReport, ConversionError> {
        if input_path.is_dir() {
            self.run_folder(input_path)
        } else if input_path.is_file() {
            if !FileManager::is_ass_file(input_path) {
                warn!("Input file does not have an .ass extension: {:?}", input_path);
            }
            let mut report = BatchReport::default();
            report.results.push(self.process_file(input_path));
            Ok(report)
        } else {
            Err(ConversionError::FileNotFound {
                path: input_path.to_path_buf(),
            })
        }
    }

    /// Convert every `.ass` file directly inside `input_dir`
    ///
    /// Per-file failures are recorded in the report; only an unreadable
    /// directory is an error.
    pub fn run_folder(&self, input_dir: &Path) -> Result<BatchReport, ConversionError> {
        let start_time = std::time::Instant::now();
        let language = self.config.language;

        if !FileManager::dir_exists(input_dir) {
            return Err(ConversionError::FileNotFound {
                path: input_dir.to_path_buf(),
            });
        }

        let ass_files = FileManager::find_files(input_dir, "ass").map_err(|e| {
            debug!("Directory scan failed: {:#}", e);
            ConversionError::FileNotFound {
                path: input_dir.to_path_buf(),
            }
        })?;

        let mut report = BatchReport::default();
        let dir_name = input_dir.display().to_string();

        if ass_files.is_empty() {
            warn!("{}", localize(language, MessageKey::NoFilesFound, &[dir_name.as_str()]));
            return Ok(report);
        }

        let file_count = ass_files.len().to_string();
        info!("{}", localize(language, MessageKey::Converting, &[file_count.as_str(), dir_name.as_str()]));

        let progress_bar = ProgressBar::new(ass_files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("=>-"));

        for ass_file in &ass_files {
            progress_bar.set_message(display_name(ass_file));
            report.results.push(self.process_file(ass_file));
            progress_bar.inc(1);
        }

        progress_bar.finish_and_clear();

        debug!(
            "Folder processing completed in {:.2?}: {} converted, {} failed, {} skipped",
            start_time.elapsed(),
            report.successes(),
            report.failures(),
            report.skipped()
        );

        Ok(report)
    }

    /// Convert one file, folding any error into the result
    pub fn process_file(&self, input_file: &Path) -> FileResult {
        let output = self.output_path_for(input_file);

        let status = if output == input_file {
            let e = ConversionError::WriteFailure {
                path: output,
                reason: "output path is the input file".to_string(),
            };
            error!("Error processing file {}: {}", display_name(input_file), e);
            FileStatus::Failed(e)
        } else if self.config.skip_existing && output.exists() {
            warn!("Skipping {:?}, output already exists", input_file);
            FileStatus::Skipped { output }
        } else {
            match self.convert_file(input_file, &output) {
                Ok(cue_count) => {
                    debug!("Wrote {} cues to {:?}", cue_count, output);
                    FileStatus::Converted { output, cue_count }
                }
                Err(e) => {
                    error!("Error processing file {}: {}", display_name(input_file), e);
                    FileStatus::Failed(e)
                }
            }
        };

        FileResult {
            input: input_file.to_path_buf(),
            status,
        }
    }

    /// Read, parse, format and write; returns the number of cues written
    pub fn convert_file(&self, input_file: &Path, output_file: &Path) -> Result<usize, ConversionError> {
        let mut subtitles = SubtitleCollection::from_ass_file(input_file)?;

        if self.config.sort_cues {
            subtitles.sort_by_start_time();
        }

        let overlaps = subtitles.count_overlaps();
        if overlaps > 0 {
            debug!("{} overlapping cue(s) in {:?}", overlaps, input_file);
        }

        subtitles.write_to_vtt(output_file, self.config.numbered_cues)?;

        Ok(subtitles.entries.len())
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
