//! Segmentation Report
//!
//! Per-stage counts and a few quality indicators for one run.

use serde::Serialize;

use crate::core::captions::Segment;
use crate::core::TimeMs;

/// Short description of a single segment
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentSummary {
    pub sentence: String,
    pub duration_ms: TimeMs,
    pub words: usize,
}

impl From<&Segment> for SegmentSummary {
    fn from(segment: &Segment) -> Self {
        Self {
            sentence: segment.sentence(),
            duration_ms: segment.duration(),
            words: segment.len(),
        }
    }
}

/// Counts collected while a segmentation run progresses
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationReport {
    /// Timed words in the input
    pub words: usize,
    /// Strings produced by the boundary detector
    pub boundary_strings: usize,
    /// Segments after alignment
    pub aligned: usize,
    pub dropped_alignments: usize,
    pub merged_alignments: usize,
    pub after_gap_split: usize,
    pub after_comma_split: usize,
    pub after_pause_split: usize,
    pub after_dedup: usize,
    pub after_archive: usize,
    /// Segments returned
    pub output: usize,
    pub longest_by_duration: Option<SegmentSummary>,
    pub longest_by_words: Option<SegmentSummary>,
    /// Output segments not ending in `.`, `,`, `?` or `!`
    pub missing_terminal_punctuation: usize,
}

impl SegmentationReport {
    /// Fills the output-derived fields from the final segments
    pub fn summarize_output(&mut self, segments: &[Segment]) {
        self.output = segments.len();
        self.longest_by_duration = segments
            .iter()
            .max_by_key(|s| s.duration())
            .map(SegmentSummary::from);
        self.longest_by_words = segments
            .iter()
            .max_by_key(|s| s.len())
            .map(SegmentSummary::from);
        self.missing_terminal_punctuation = segments
            .iter()
            .filter(|s| !s.sentence().ends_with(['.', ',', '?', '!']))
            .count();
    }
}
