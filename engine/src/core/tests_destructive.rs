//! Destructive and Edge Case Tests Across Modules
//!
//! These tests push malformed captions, inconsistent annotations, drifting
//! alignments and odd settings through the full pipeline.

use crate::core::annotations::{
    AnnotatedDocument, Annotator, PunctuationAnnotator, SentenceSpan, Token,
};
use crate::core::captions::{
    export_srt, export_vtt, parse_captions, parse_timestamp, CaptionFormat, Segment, TimedWord,
};
use crate::core::segmentation::{SegmentationOutput, Segmenter, SentenceArchive};
use crate::core::settings::{AlignmentDiscipline, SegmenterSettings};
use crate::core::{CoreError, CoreResult};

struct FixedAnnotator(AnnotatedDocument);

impl Annotator for FixedAnnotator {
    fn name(&self) -> &str {
        "fixed"
    }

    fn annotate(&self, _text: &str) -> CoreResult<AnnotatedDocument> {
        Ok(self.0.clone())
    }
}

fn words(items: &[(i64, i64, &str)]) -> Vec<TimedWord> {
    items
        .iter()
        .map(|(s, e, t)| TimedWord::new(*s, *e, *t).unwrap())
        .collect()
}

fn sentences(output: &SegmentationOutput) -> Vec<String> {
    output.segments.iter().map(Segment::sentence).collect()
}

fn min_one(alignment: AlignmentDiscipline) -> Segmenter {
    Segmenter::new(SegmenterSettings {
        min_words: 1,
        alignment,
        ..Default::default()
    })
}

#[test]
fn test_destructive_vtt_through_pipeline_keeps_valid_timing() {
    let content = "WEBVTT\n\n\
00:00:00.000 --> 00:00:03.000\n\n\
So<00:00:00.500><c> here</c><00:00:01.000><c> we</c><00:00:01.400><c> go.</c>\n\n\
00:00:03.000 --> 00:00:09.000\n\n\
Next<00:00:06.000><c> one,</c><00:00:06.500><c> please.</c>\n";

    let input = parse_captions(content, CaptionFormat::Vtt).unwrap();
    let output = min_one(AlignmentDiscipline::Growth)
        .run(&input, &PunctuationAnnotator, None)
        .unwrap();

    assert!(!output.segments.is_empty());
    for segment in &output.segments {
        assert!(0 <= segment.start() && segment.start() <= segment.end());
    }
    // "Next" ends at 5000 (clamped), "one," starts at 6000; no 2s gap
    assert_eq!(
        sentences(&output),
        vec!["So here we go.", "Next one,", "please."]
    );
    assert_eq!(output.report.after_gap_split, 3);
}

#[test]
fn test_destructive_non_monotonic_words_are_dropped() {
    let input = words(&[(5000, 5500, "late"), (1000, 1200, "early")]);
    let output = min_one(AlignmentDiscipline::Growth)
        .run(&input, &PunctuationAnnotator, None)
        .unwrap();

    assert!(output.segments.is_empty());
    assert_eq!(output.report.dropped_alignments, 1);
}

#[test]
fn test_destructive_inconsistent_annotation_is_rejected() {
    let doc = AnnotatedDocument {
        tokens: vec![Token::new("hi", "X", "dep", 5, 0)],
        sentences: vec![SentenceSpan::new(0, 1)],
    };
    let input = words(&[(0, 100, "hi")]);

    let err = Segmenter::default()
        .run(&input, &FixedAnnotator(doc), None)
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidAnnotation(_)));
}

#[test]
fn test_destructive_boundary_inside_word() {
    // The comma boundary falls between `,` and `"` of the single word `yes,"`
    let input = words(&[(0, 100, "well"), (100, 200, "yes,\""), (200, 300, "ok")]);

    let err = min_one(AlignmentDiscipline::Exact)
        .run(&input, &PunctuationAnnotator, None)
        .unwrap_err();
    assert!(matches!(err, CoreError::AlignmentMismatch { index: 0, .. }));

    let output = min_one(AlignmentDiscipline::Growth)
        .run(&input, &PunctuationAnnotator, None)
        .unwrap();
    assert_eq!(sentences(&output), vec!["well yes,\""]);
    assert_eq!(output.report.dropped_alignments, 1);
}

#[test]
fn test_destructive_settings_clamped_by_segmenter() {
    let segmenter = Segmenter::new(SegmenterSettings {
        min_words: 0,
        max_duration_ms: -5,
        margin_start_ms: -100,
        ..Default::default()
    });

    assert_eq!(segmenter.settings().min_words, 1);
    assert!(segmenter.settings().max_duration_ms >= 1);
    assert_eq!(segmenter.settings().margin_start_ms, 0);
}

#[test]
fn test_destructive_archive_with_crlf_lines() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("archive.txt");
    std::fs::write(&path, "hello world\r\nsecond\r\n").unwrap();

    let mut archive = SentenceArchive::load(&path, false).unwrap();
    let input = words(&[(0, 100, "hello"), (100, 200, "world")]);
    let output = Segmenter::default()
        .run(&input, &PunctuationAnnotator, Some(&mut archive))
        .unwrap();

    assert!(output.segments.is_empty());
}

#[test]
fn test_destructive_timed_text_without_speech() {
    let content = r#"<timedtext><body><p t="0" d="1000">[Music]</p></body></timedtext>"#;
    let input = parse_captions(content, CaptionFormat::TimedText).unwrap();
    assert!(input.is_empty());

    let output = Segmenter::default()
        .run(&input, &PunctuationAnnotator, None)
        .unwrap();
    assert_eq!(output.report.output, 0);
}

#[test]
fn test_destructive_garbage_timestamps() {
    for ts in ["", "1:2:3:4", "aa:bb:cc.ddd", "00:61:00.000", "00:00:00.1234", "-1:00:00.000"] {
        assert!(parse_timestamp(ts).is_err(), "accepted {ts:?}");
    }
    assert!(CaptionFormat::detect("plain text").is_err());
}

#[test]
fn test_destructive_empty_exports() {
    assert_eq!(export_vtt(&[]), "WEBVTT\n");
    assert_eq!(export_srt(&[]), "\n");
}
