//! Caption Timestamps and Exporters
//!
//! Timestamp parsing/formatting shared by the parsers, plus exporters that
//! mirror the final segment list exactly in order and timing:
//! - WebVTT
//! - SRT (SubRip)
//! - Plain text (one sentence per line)
//! - JSON
//!
//! # Example
//!
//! ```rust,ignore
//! use cuecards_lib::core::captions::{export_vtt, parse_timestamp};
//!
//! let start = parse_timestamp("00:00:01.500")?;
//! let vtt = export_vtt(&segments);
//! ```

use serde::Serialize;

use super::Segment;
use crate::core::{CoreError, CoreResult, TimeMs};

// =============================================================================
// Timestamps
// =============================================================================

/// Parses a caption timestamp into milliseconds.
///
/// Accepts `HH:MM:SS.mmm`, `HH:MM:SS,mmm` and the short `MM:SS.mmm` form.
pub fn parse_timestamp(ts: &str) -> CoreResult<TimeMs> {
    let invalid = || CoreError::MalformedCaption(format!("Invalid timestamp: {}", ts));

    let normalized = ts.trim().replace(',', ".");
    let parts: Vec<&str> = normalized.split(':').collect();

    let (hours, minutes, seconds) = match parts.as_slice() {
        [m, s] => ("0", *m, *s),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(invalid()),
    };

    let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
    if fraction.len() > 3 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }

    let hours: TimeMs = hours.parse().map_err(|_| invalid())?;
    let minutes: TimeMs = minutes.parse().map_err(|_| invalid())?;
    let whole: TimeMs = whole.parse().map_err(|_| invalid())?;
    let millis: TimeMs = if fraction.is_empty() {
        0
    } else {
        format!("{:0<3}", fraction).parse().map_err(|_| invalid())?
    };

    if hours < 0 || !(0..60).contains(&minutes) || !(0..60).contains(&whole) {
        return Err(invalid());
    }

    Ok(((hours * 60 + minutes) * 60 + whole) * 1000 + millis)
}

/// Formats milliseconds as `HH{sep}MM{sep}SS{frac}mmm`
fn format_clock(ms: TimeMs, sep: char, frac: char) -> String {
    let total_ms = ms.max(0);
    let millis = total_ms % 1000;
    let total_secs = total_ms / 1000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    format!(
        "{:02}{sep}{:02}{sep}{:02}{frac}{:03}",
        hours, mins, secs, millis
    )
}

/// Formats milliseconds as a VTT timestamp (00:00:00.000)
pub fn format_vtt_timestamp(ms: TimeMs) -> String {
    format_clock(ms, ':', '.')
}

/// Formats milliseconds as an SRT timestamp (00:00:00,000)
pub fn format_srt_timestamp(ms: TimeMs) -> String {
    format_clock(ms, ':', ',')
}

/// Names the media files cut for a segment: `{video_id}_{HH.MM.SS.mmm}-{HH.MM.SS.mmm}`
pub fn segment_media_name(video_id: &str, segment: &Segment) -> String {
    format!(
        "{}_{}-{}",
        video_id,
        format_clock(segment.start(), '.', '.'),
        format_clock(segment.end(), '.', '.')
    )
}

// =============================================================================
// Exporters
// =============================================================================

/// Exports segments to WebVTT format
pub fn export_vtt(segments: &[Segment]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for segment in segments {
        let start = format_vtt_timestamp(segment.start());
        let end = format_vtt_timestamp(segment.end());
        output.push_str(&format!("{} --> {}\n", start, end));
        output.push_str(&segment.sentence());
        output.push_str("\n\n");
    }

    format!("{}\n", output.trim_end())
}

/// Exports segments to SRT format
pub fn export_srt(segments: &[Segment]) -> String {
    let mut output = String::new();

    for (index, segment) in segments.iter().enumerate() {
        output.push_str(&format!("{}\n", index + 1));

        let start = format_srt_timestamp(segment.start());
        let end = format_srt_timestamp(segment.end());
        output.push_str(&format!("{} --> {}\n", start, end));

        output.push_str(&segment.sentence());
        output.push_str("\n\n");
    }

    format!("{}\n", output.trim_end())
}

/// Exports segment sentences, one per line
pub fn export_text(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|s| format!("{}\n", s.sentence()))
        .collect()
}

/// Flattened segment view used by the JSON export
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportedSegment<'a> {
    start: TimeMs,
    end: TimeMs,
    sentence: String,
    words: &'a [super::TimedWord],
}

/// Exports segments as a pretty-printed JSON array
pub fn export_json(segments: &[Segment]) -> CoreResult<String> {
    let exported: Vec<ExportedSegment<'_>> = segments
        .iter()
        .map(|s| ExportedSegment {
            start: s.start(),
            end: s.end(),
            sentence: s.sentence(),
            words: s.words(),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&exported)?)
}

// =============================================================================
// Tests
// =============================================================================
