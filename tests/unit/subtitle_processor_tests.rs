/*!
 * Tests for ASS parsing and WebVTT formatting
 */

use std::path::PathBuf;
use anyhow::Result;
use ass2vtt::errors::ConversionError;
use ass2vtt::subtitle_processor::{clean_ass_text, escape_cue_text, EventFormat, SubtitleCollection, SubtitleEntry};
use crate::common;

/// Centiseconds are padded to milliseconds exactly
#[test]
fn test_timestamp_conversion_withCentiseconds_shouldPadToMilliseconds() -> Result<()> {
    let ms = SubtitleEntry::parse_ass_timestamp("0:01:23.45")?;
    assert_eq!(ms, 83_450);
    assert_eq!(SubtitleEntry::format_timestamp(ms), "00:01:23.450");
    Ok(())
}

/// One- and three-digit fractions are tenths and milliseconds
#[test]
fn test_parse_ass_timestamp_withVaryingFractionDigits_shouldScaleCorrectly() -> Result<()> {
    assert_eq!(SubtitleEntry::parse_ass_timestamp("0:00:01.5")?, 1_500);
    assert_eq!(SubtitleEntry::parse_ass_timestamp("0:00:01.05")?, 1_050);
    assert_eq!(SubtitleEntry::parse_ass_timestamp("0:00:01.005")?, 1_005);
    assert_eq!(SubtitleEntry::parse_ass_timestamp(" 10:00:00.00 ")?, 36_000_000);
    Ok(())
}

/// Malformed timestamps are rejected
#[test]
fn test_parse_ass_timestamp_withInvalidInput_shouldFail() {
    assert!(SubtitleEntry::parse_ass_timestamp("").is_err());
    assert!(SubtitleEntry::parse_ass_timestamp("abc").is_err());
    assert!(SubtitleEntry::parse_ass_timestamp("0:61:00.00").is_err());
    assert!(SubtitleEntry::parse_ass_timestamp("0:00:75.00").is_err());
    assert!(SubtitleEntry::parse_ass_timestamp("0:00:01.0000").is_err());
}

/// Hours above 99 keep all their digits
#[test]
fn test_format_timestamp_withLongDuration_shouldKeepAllHourDigits() {
    assert_eq!(SubtitleEntry::format_timestamp(0), "00:00:00.000");
    assert_eq!(SubtitleEntry::format_timestamp(100 * 3_600_000 + 1), "100:00:00.001");
}

/// Override tags are stripped
#[test]
fn test_clean_ass_text_withOverrideTags_shouldStripThem() {
    assert_eq!(clean_ass_text("{\\b1}Hello{\\b0} world"), "Hello world");
    assert_eq!(clean_ass_text("{\\pos(10,20)\\c&H00FF00&}Positioned"), "Positioned");
}

/// ASS line breaks become separate lines, blank lines are dropped
#[test]
fn test_clean_ass_text_withLineBreaks_shouldSplitLines() {
    assert_eq!(clean_ass_text("First\\NSecond\\nThird"), "First\nSecond\nThird");
    assert_eq!(clean_ass_text("Only\\N\\N"), "Only");
    assert_eq!(clean_ass_text("A\\hB"), "A\u{00A0}B");
}

/// Markup characters are escaped for the cue payload
#[test]
fn test_escape_cue_text_withMarkupCharacters_shouldEscape() {
    assert_eq!(escape_cue_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    assert_eq!(escape_cue_text("x --> y"), "x --&gt; y");
}

/// Cue count equals the number of dialogue lines
#[test]
fn test_parse_ass_string_withValidScript_shouldReturnOneCuePerDialogue() -> Result<()> {
    let entries = SubtitleCollection::parse_ass_string(&common::sample_ass())?;

    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[0].start_time_ms, 1_000);
    assert_eq!(entries[0].end_time_ms, 4_000);
    assert_eq!(entries[0].text, "This is a test subtitle.");
    assert_eq!(entries[1].text, "It contains multiple entries.");
    assert_eq!(entries[2].lines().collect::<Vec<_>>(), vec!["For testing,", "purposes."]);

    Ok(())
}

/// Commas after the ninth belong to the text
#[test]
fn test_parse_ass_string_withCommasInText_shouldKeepThem() -> Result<()> {
    let content = common::ass_with_dialogues(&[
        "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,One, two, three",
    ]);

    let entries = SubtitleCollection::parse_ass_string(&content)?;
    assert_eq!(entries[0].text, "One, two, three");

    Ok(())
}

/// Zero dialogue lines is a failure, not an empty success
#[test]
fn test_parse_ass_string_withNoDialogue_shouldReturnMalformedInput() {
    let result = SubtitleCollection::parse_ass_string(&common::malformed_ass());
    assert!(matches!(result, Err(ConversionError::MalformedInput { .. })));
}

/// A script without an [Events] section is malformed
#[test]
fn test_parse_ass_string_withoutEventsSection_shouldReturnMalformedInput() {
    let content = "[Script Info]\nTitle: Nothing\n\nDialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Stray";
    let result = SubtitleCollection::parse_ass_string(content);
    assert!(matches!(result, Err(ConversionError::MalformedInput { .. })));
}

/// Dialogue lines after the next section header are ignored
#[test]
fn test_parse_ass_string_withTrailingSection_shouldStopAtIt() -> Result<()> {
    let mut content = common::ass_with_dialogues(&[
        "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Inside",
    ]);
    content.push_str("\n[Fonts]\nDialogue: 0,0:00:03.00,0:00:04.00,Default,,0,0,0,,Outside\n");

    let entries = SubtitleCollection::parse_ass_string(&content)?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "Inside");

    Ok(())
}

/// Bad dialogue lines are skipped while good ones survive
#[test]
fn test_parse_ass_string_withSomeInvalidLines_shouldSkipOnlyThose() -> Result<()> {
    let content = common::ass_with_dialogues(&[
        "Dialogue: 0,0:00:01.00,0:00:02.00,Default,,0,0,0,,Good one",
        "Dialogue: 0,not-a-time,0:00:03.00,Default,,0,0,0,,Bad start",
        "Dialogue: 0,0:00:05.00,0:00:04.00,Default,,0,0,0,,Ends before it starts",
        "Dialogue: 0,0:00:06.00",
        "Dialogue: 0,0:00:07.00,0:00:08.00,Default,,0,0,0,,Good two",
    ]);

    let entries = SubtitleCollection::parse_ass_string(&content)?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].text, "Good one");
    assert_eq!(entries[1].text, "Good two");
    assert_eq!(entries[1].seq_num, 2);

    Ok(())
}

/// When every dialogue line is invalid the file is malformed
#[test]
fn test_parse_ass_string_withOnlyInvalidLines_shouldReturnMalformedInput() {
    let content = common::ass_with_dialogues(&[
        "Dialogue: 0,bad,0:00:03.00,Default,,0,0,0,,Bad start",
    ]);
    let result = SubtitleCollection::parse_ass_string(&content);
    assert!(matches!(result, Err(ConversionError::MalformedInput { .. })));
}

/// A custom Format line moves the Start/End/Text columns
#[test]
fn test_parse_ass_string_withCustomFormatLine_shouldUseItsLayout() -> Result<()> {
    let content = "[Events]\nFormat: Start, End, Style, Text\nDialogue: 0:00:02.00,0:00:03.50,Default,Custom, layout\n";

    let entries = SubtitleCollection::parse_ass_string(content)?;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].start_time_ms, 2_000);
    assert_eq!(entries[0].end_time_ms, 3_500);
    assert_eq!(entries[0].text, "Custom, layout");

    Ok(())
}

/// Format lines missing required fields are rejected
#[test]
fn test_event_format_withMissingFields_shouldFail() {
    assert!(EventFormat::from_format_line("Layer, Start, Style, Text").is_err());
    assert!(EventFormat::from_format_line("Layer, Start, End, Text, Effect").is_err());
    assert_eq!(
        EventFormat::from_format_line(" Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text").ok(),
        Some(EventFormat::default())
    );
}

/// A UTF-8 byte order mark before the script is ignored
#[test]
fn test_parse_ass_string_withByteOrderMark_shouldParse() -> Result<()> {
    let content = format!("\u{feff}{}", common::sample_ass());
    let entries = SubtitleCollection::parse_ass_string(&content)?;
    assert_eq!(entries.len(), 3);
    Ok(())
}

/// The rendered document has the header and one block per cue
#[test]
fn test_to_vtt_string_withEntries_shouldRenderCueBlocks() {
    let mut collection = SubtitleCollection::new(PathBuf::from("test.ass"));
    collection.entries.push(SubtitleEntry::new(1, 1_000, 4_000, "Hello world".to_string()));
    collection.entries.push(SubtitleEntry::new(2, 83_450, 85_000, "Two\nlines".to_string()));

    let vtt = collection.to_vtt_string(false);

    assert_eq!(
        vtt,
        "WEBVTT\n\n00:00:01.000 --> 00:00:04.000\nHello world\n\n00:01:23.450 --> 00:01:25.000\nTwo\nlines\n"
    );
}

/// Numbered output puts an identifier above each timestamp line
#[test]
fn test_to_vtt_string_withNumbering_shouldEmitIdentifiers() {
    let mut collection = SubtitleCollection::new(PathBuf::from("test.ass"));
    collection.entries.push(SubtitleEntry::new(1, 0, 500, "First".to_string()));
    collection.entries.push(SubtitleEntry::new(2, 500, 1_000, "Second".to_string()));

    let vtt = collection.to_vtt_string(true);

    assert!(vtt.starts_with("WEBVTT\n\n1\n00:00:00.000 --> 00:00:00.500\nFirst\n"));
    assert!(vtt.contains("\n\n2\n00:00:00.500 --> 00:00:01.000\nSecond\n"));
}

/// Parse then format keeps the cue count
#[test]
fn test_parse_then_format_withSampleScript_shouldKeepCueCount() -> Result<()> {
    let collection = SubtitleCollection {
        source_file: PathBuf::from("sample.ass"),
        entries: SubtitleCollection::parse_ass_string(&common::sample_ass())?,
    };

    let vtt = collection.to_vtt_string(false);

    assert_eq!(vtt.matches(" --> ").count(), 3);
    assert!(vtt.contains("00:01:23.450 --> 00:01:25.000\nFor testing,\npurposes.\n"));

    Ok(())
}

/// Sorting is stable and renumbers the cues
#[test]
fn test_sort_by_start_time_withOutOfOrderCues_shouldSortStably() {
    let mut collection = SubtitleCollection::new(PathBuf::from("test.ass"));
    collection.entries.push(SubtitleEntry::new(1, 5_000, 6_000, "Late".to_string()));
    collection.entries.push(SubtitleEntry::new(2, 1_000, 2_000, "Early A".to_string()));
    collection.entries.push(SubtitleEntry::new(3, 1_000, 3_000, "Early B".to_string()));

    collection.sort_by_start_time();

    let texts: Vec<&str> = collection.entries.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Early A", "Early B", "Late"]);
    assert_eq!(collection.entries.iter().map(|e| e.seq_num).collect::<Vec<_>>(), vec![1, 2, 3]);
}

/// Overlapping neighbours are counted
#[test]
fn test_count_overlaps_withOverlappingCues_shouldCountThem() {
    let mut collection = SubtitleCollection::new(PathBuf::from("test.ass"));
    collection.entries.push(SubtitleEntry::new(1, 0, 2_000, "A".to_string()));
    collection.entries.push(SubtitleEntry::new(2, 1_000, 3_000, "B".to_string()));
    collection.entries.push(SubtitleEntry::new(3, 3_000, 4_000, "C".to_string()));

    assert_eq!(collection.count_overlaps(), 1);
}

/// Zero-length cues are valid, inverted ones are not
#[test]
fn test_new_validated_withTimeRanges_shouldEnforceStartBeforeEnd() {
    assert!(SubtitleEntry::new_validated(1, 1_000, 1_000, "Flash".to_string()).is_ok());
    assert!(SubtitleEntry::new_validated(1, 2_000, 1_000, "Backwards".to_string()).is_err());
}
