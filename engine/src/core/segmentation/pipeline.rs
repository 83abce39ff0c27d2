//! Segmentation Pipeline
//!
//! Runs every stage over one video's timed words, in a fixed order:
//! annotate → boundary strings → align → gap → comma → pause → dedup →
//! archive → margins.

use tracing::info;

use crate::core::annotations::Annotator;
use crate::core::captions::{Segment, TimedWord};
use crate::core::settings::{CutMethod, SegmenterSettings};
use crate::core::CoreResult;

use super::alignment::align;
use super::archive::SentenceArchive;
use super::boundaries::split_document;
use super::postprocess::{apply_margins, dedup};
use super::report::SegmentationReport;
use super::splitter::{comma_split, gap_split, pause_split};

/// Segments and report produced by one run
#[derive(Clone, Debug, Default)]
pub struct SegmentationOutput {
    pub segments: Vec<Segment>,
    pub report: SegmentationReport,
}

/// Configured segmentation pipeline
#[derive(Clone, Debug, Default)]
pub struct Segmenter {
    settings: SegmenterSettings,
}

impl Segmenter {
    /// Creates a segmenter; settings are normalized first
    pub fn new(mut settings: SegmenterSettings) -> Self {
        settings.normalize();
        Self { settings }
    }

    pub fn settings(&self) -> &SegmenterSettings {
        &self.settings
    }

    /// Segments `words`.
    ///
    /// When an archive is given, archived sentences are dropped and accepted
    /// ones are recorded in it; persisting the archive is left to the caller.
    pub fn run(
        &self,
        words: &[TimedWord],
        annotator: &dyn Annotator,
        archive: Option<&mut SentenceArchive>,
    ) -> CoreResult<SegmentationOutput> {
        let settings = &self.settings;
        let mut report = SegmentationReport {
            words: words.len(),
            ..Default::default()
        };

        if words.is_empty() {
            info!("No words to segment");
            return Ok(SegmentationOutput {
                segments: Vec::new(),
                report,
            });
        }

        let text = words
            .iter()
            .map(TimedWord::text)
            .collect::<Vec<_>>()
            .join(" ");
        info!("Annotating {} words with {}", words.len(), annotator.name());
        let doc = annotator.annotate(&text)?;
        doc.validate()?;
        info!(
            "Annotated {} tokens in {} sentences",
            doc.len(),
            doc.sentences.len()
        );

        let strings = split_document(&doc, settings);
        report.boundary_strings = strings.len();

        let alignment = align(words, &strings, settings.alignment)?;
        report.aligned = alignment.segments.len();
        report.dropped_alignments = alignment.dropped.len();
        report.merged_alignments = alignment.merged.len();
        info!(
            "Aligned {} segments ({} dropped, {} merged)",
            report.aligned, report.dropped_alignments, report.merged_alignments
        );

        let mut segments = Vec::new();
        for segment in &alignment.segments {
            segments.extend(gap_split(segment)?);
        }
        report.after_gap_split = segments.len();
        info!("Gap split: {} segments", segments.len());

        if settings.cuts_by(CutMethod::Comma) {
            segments = flat_map_split(segments, |s| {
                comma_split(s, settings.min_words, settings.max_duration_ms)
            })?;
            info!("Comma split: {} segments", segments.len());
        }
        report.after_comma_split = segments.len();

        if settings.cuts_by(CutMethod::Pause) {
            segments = flat_map_split(segments, |s| {
                pause_split(s, settings.min_words, settings.max_duration_ms)
            })?;
            info!("Pause split: {} segments", segments.len());
        }
        report.after_pause_split = segments.len();

        if !settings.keep_duplicates {
            segments = dedup(segments);
            info!("Dedup: {} segments", segments.len());
        }
        report.after_dedup = segments.len();

        if let Some(archive) = archive {
            segments = archive.retain_unseen(segments);
            info!("Archive diff: {} segments", segments.len());
        }
        report.after_archive = segments.len();

        let segments = apply_margins(segments, settings.margin_start_ms, settings.margin_end_ms)?;
        report.summarize_output(&segments);
        info!("Produced {} segments", segments.len());

        Ok(SegmentationOutput { segments, report })
    }
}

fn flat_map_split(
    segments: Vec<Segment>,
    split: impl Fn(Segment) -> CoreResult<Vec<Segment>>,
) -> CoreResult<Vec<Segment>> {
    let mut out = Vec::with_capacity(segments.len());
    for segment in segments {
        out.extend(split(segment)?);
    }
    Ok(out)
}

// =============================================================================
// Tests
// =============================================================================
