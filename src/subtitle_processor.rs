use std::fmt;
use regex::Regex;
use once_cell::sync::Lazy;
use anyhow::{Result, Context, anyhow};
use std::path::{Path, PathBuf};
use log::{warn, debug};

use crate::errors::ConversionError;
use crate::file_utils::FileManager;

// @module: ASS parsing and WebVTT formatting

// @const: ASS timestamp regex (H:MM:SS.cc, fraction of 1-3 digits)
static ASS_TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{1,2}):(\d{1,2})(?:[.,](\d{1,3}))?$").unwrap()
});

// @const: ASS override block, e.g. {\b1} or {\pos(10,20)}
static OVERRIDE_BLOCK_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{[^}]*\}").unwrap()
});

/// WebVTT file signature
pub const VTT_HEADER: &str = "WEBVTT";

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleEntry {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Display text, one line per '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry without validation
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleEntry {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    // @creates: Validated subtitle entry
    // @validates: start <= end; zero-length cues are kept
    pub fn new_validated(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Result<Self> {
        if end_time_ms < start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} < start time {}",
                end_time_ms, start_time_ms
            ));
        }

        Ok(SubtitleEntry::new(seq_num, start_time_ms, end_time_ms, text))
    }

    /// Display lines of the cue, in order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }

    /// Parse an ASS timestamp (`H:MM:SS.cc`) to milliseconds
    ///
    /// Centiseconds are scaled by 10; a one-digit fraction is tenths and a
    /// three-digit fraction is taken as milliseconds.
    pub fn parse_ass_timestamp(timestamp: &str) -> Result<u64> {
        let trimmed = timestamp.trim();
        let caps = ASS_TIMESTAMP_REGEX.captures(trimmed)
            .ok_or_else(|| anyhow!("Invalid ASS timestamp format: {:?}", timestamp))?;

        let hours: u64 = caps[1].parse().context("Failed to parse hours")?;
        let minutes: u64 = caps[2].parse().context("Failed to parse minutes")?;
        let seconds: u64 = caps[3].parse().context("Failed to parse seconds")?;
        let millis: u64 = match caps.get(4) {
            Some(fraction) => {
                let digits = fraction.as_str();
                let value: u64 = digits.parse().context("Failed to parse fraction")?;
                match digits.len() {
                    1 => value * 100,
                    2 => value * 10,
                    _ => value,
                }
            }
            None => 0,
        };

        if minutes >= 60 || seconds >= 60 {
            return Err(anyhow!("Invalid time components in timestamp: {:?}", timestamp));
        }

        hours.checked_mul(3_600_000)
            .and_then(|h| h.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(|| anyhow!("Timestamp out of range: {:?}", timestamp))
    }

    /// Format a timestamp in milliseconds as WebVTT (HH:MM:SS.mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }

    /// Start time as a WebVTT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// End time as a WebVTT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }
}

/// Renders the cue block without an identifier line
impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        for line in self.lines() {
            writeln!(f, "{}", escape_cue_text(line))?;
        }
        Ok(())
    }
}

/// Escape characters WebVTT treats as markup in cue payloads
pub fn escape_cue_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Strip ASS styling from dialogue text, leaving plain display lines
///
/// Removes `{...}` override blocks, turns `\N`/`\n` into line breaks and `\h`
/// into a non-breaking space. Blank lines are dropped because a blank line
/// terminates a WebVTT cue.
pub fn clean_ass_text(raw: &str) -> String {
    let stripped = OVERRIDE_BLOCK_REGEX.replace_all(raw, "");
    let expanded = stripped
        .replace("\\N", "\n")
        .replace("\\n", "\n")
        .replace("\\h", "\u{00A0}");

    expanded
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Field positions of a `Dialogue:` line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventFormat {
    /// Index of the Start field
    pub start: usize,
    /// Index of the End field
    pub end: usize,
    /// Total number of fields; Text is always the last one
    pub field_count: usize,
}

impl Default for EventFormat {
    // Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text
    fn default() -> Self {
        EventFormat {
            start: 1,
            end: 2,
            field_count: 10,
        }
    }
}

impl EventFormat {
    /// Build a layout from the field list of a `Format:` line
    pub fn from_format_line(fields: &str) -> Result<Self> {
        let names: Vec<String> = fields
            .split(',')
            .map(|name| name.trim().to_ascii_lowercase())
            .collect();

        let position = |wanted: &str| names.iter().position(|name| name == wanted);

        let start = position("start").ok_or_else(|| anyhow!("Format line has no Start field"))?;
        let end = position("end").ok_or_else(|| anyhow!("Format line has no End field"))?;
        match position("text") {
            Some(text) if text == names.len() - 1 => {}
            Some(_) => return Err(anyhow!("Text must be the last field of the Format line")),
            None => return Err(anyhow!("Format line has no Text field")),
        }

        Ok(EventFormat {
            start,
            end,
            field_count: names.len(),
        })
    }
}

/// Collection of subtitle cues read from one source file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Cues in source order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create a new, empty subtitle collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Read and parse an `.ass` file
    pub fn from_ass_file<P: AsRef<Path>>(path: P) -> Result<Self, ConversionError> {
        let path = path.as_ref();
        let content = FileManager::read_subtitle_text(path)?;
        let entries = Self::parse_ass_string(&content)
            .map_err(|e| e.with_path(path))?;

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Parse the `[Events]` section of ASS content into cues
    ///
    /// Fails with `MalformedInput` if there is no `[Events]` section, no
    /// `Dialogue:` line, or every dialogue line was rejected.
    pub fn parse_ass_string(content: &str) -> Result<Vec<SubtitleEntry>, ConversionError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut entries = Vec::new();
        let mut format = EventFormat::default();
        let mut in_events = false;
        let mut found_events = false;
        let mut dialogue_count = 0;

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();

            if trimmed.starts_with('[') {
                if in_events {
                    break;
                }
                if trimmed.to_ascii_lowercase().starts_with("[events]") {
                    in_events = true;
                    found_events = true;
                }
                continue;
            }

            if !in_events {
                continue;
            }

            if let Some(fields) = strip_prefix_ignore_case(trimmed, "Format:") {
                match EventFormat::from_format_line(fields) {
                    Ok(parsed) => format = parsed,
                    Err(e) => warn!("Ignoring Format line {}: {}", line_number, e),
                }
                continue;
            }

            if let Some(body) = strip_prefix_ignore_case(trimmed, "Dialogue:") {
                dialogue_count += 1;
                match Self::parse_dialogue(body, &format, entries.len() + 1) {
                    Ok(entry) => entries.push(entry),
                    Err(e) => warn!("Skipping dialogue at line {}: {}", line_number, e),
                }
            }
        }

        if !found_events {
            return Err(ConversionError::malformed("no [Events] section"));
        }

        if dialogue_count == 0 {
            return Err(ConversionError::malformed("no Dialogue: lines in [Events]"));
        }

        if entries.is_empty() {
            return Err(ConversionError::malformed(format!(
                "none of the {} Dialogue: lines could be parsed",
                dialogue_count
            )));
        }

        debug!("Parsed {} of {} dialogue lines", entries.len(), dialogue_count);

        Ok(entries)
    }

    /// Parse the body of one `Dialogue:` line
    fn parse_dialogue(body: &str, format: &EventFormat, seq_num: usize) -> Result<SubtitleEntry> {
        let fields: Vec<&str> = body.splitn(format.field_count, ',').collect();

        if fields.len() < format.field_count {
            return Err(anyhow!(
                "expected {} fields, found {}",
                format.field_count, fields.len()
            ));
        }

        let start_ms = SubtitleEntry::parse_ass_timestamp(fields[format.start])?;
        let end_ms = SubtitleEntry::parse_ass_timestamp(fields[format.end])?;
        let text = clean_ass_text(fields[format.field_count - 1]);

        SubtitleEntry::new_validated(seq_num, start_ms, end_ms, text)
    }

    /// Stable sort by start time, then renumber
    pub fn sort_by_start_time(&mut self) {
        self.entries.sort_by_key(|entry| entry.start_time_ms);

        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.seq_num = i + 1;
        }
    }

    /// Number of cues that start before the previous one ends
    pub fn count_overlaps(&self) -> usize {
        self.entries
            .windows(2)
            .filter(|pair| pair[0].end_time_ms > pair[1].start_time_ms)
            .count()
    }

    /// Render the collection as WebVTT text
    pub fn to_vtt_string(&self, numbered: bool) -> String {
        let mut output = String::with_capacity(VTT_HEADER.len() + self.entries.len() * 64);
        output.push_str(VTT_HEADER);
        output.push('\n');

        for entry in &self.entries {
            output.push('\n');
            if numbered {
                output.push_str(&entry.seq_num.to_string());
                output.push('\n');
            }
            output.push_str(&entry.to_string());
        }

        output
    }

    /// Write the collection to a WebVTT file
    pub fn write_to_vtt<P: AsRef<Path>>(&self, path: P, numbered: bool) -> Result<(), ConversionError> {
        let path = path.as_ref();
        FileManager::write_to_file(path, &self.to_vtt_string(numbered))
            .map_err(|e| ConversionError::WriteFailure {
                path: path.to_path_buf(),
                reason: format!("{:#}", e),
            })
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&line[prefix.len()..])
    } else {
        None
    }
}
