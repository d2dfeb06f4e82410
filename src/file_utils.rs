use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::errors::ConversionError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @checks: `.ass` extension, any case
    pub fn is_ass_file<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref()
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("ass"))
    }

    // @generates: Output path next to the input, same stem, given suffix
    // @params: input_file, suffix (already normalized, e.g. ".vtt")
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, suffix: &str) -> PathBuf {
        let input_file = input_file.as_ref();

        let mut output_filename = input_file.file_stem().unwrap_or_default().to_os_string();
        output_filename.push(suffix);

        input_file.with_file_name(output_filename)
    }

    /// Find files with a specific extension directly inside a directory
    ///
    /// Not recursive. Results are sorted by file name.
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let normalized_ext = extension.strip_prefix('.').unwrap_or(extension);

        for entry in WalkDir::new(dir.as_ref())
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(normalized_ext) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        Ok(result)
    }

    /// Read a subtitle file as UTF-8 text, dropping a leading byte order mark
    pub fn read_subtitle_text<P: AsRef<Path>>(path: P) -> Result<String, ConversionError> {
        let path = path.as_ref();

        let bytes = fs::read(path).map_err(|_| ConversionError::FileNotFound {
            path: path.to_path_buf(),
        })?;

        let mut content = String::from_utf8(bytes).map_err(|e| ConversionError::MalformedInput {
            path: path.to_path_buf(),
            reason: format!("not valid UTF-8: {}", e.utf8_error()),
        })?;

        if content.starts_with('\u{feff}') {
            content.drain(..'\u{feff}'.len_utf8());
        }

        Ok(content)
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }
}
