//! Command implementations for cuecards-cli

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use cuecards_lib::core::annotations::{
    AnnotationStore, Annotator, CachedAnnotator, CommandAnnotator, JsonFileAnnotator,
    PunctuationAnnotator,
};
use cuecards_lib::core::captions::{
    export_json, export_srt, export_text, export_vtt, format_vtt_timestamp, read_caption_file,
    segment_media_name, TimedWord,
};
use cuecards_lib::core::fs::atomic_write_text;
use cuecards_lib::core::segmentation::{SegmentationReport, Segmenter, SentenceArchive};
use cuecards_lib::core::settings::{
    parse_list, AlignmentDiscipline, SegmenterSettings, SettingsManager,
};
use cuecards_lib::core::{ms_to_secs, secs_to_ms};

use crate::args::{AnnotatorArgs, Args, CaptionArgs, Command, SegmentArgs, TokensArgs, WordsArgs};

/// Runs the parsed command
pub fn run(args: Args) -> Result<()> {
    let verbose = args.verbose;
    match args.command {
        Command::Segment(segment) => run_segment(segment, verbose),
        Command::Words(words) => run_words(words),
        Command::Tokens(tokens) => run_tokens(tokens),
    }
}

// =============================================================================
// Shared Helpers
// =============================================================================

fn load_words(input: &CaptionArgs) -> Result<Vec<TimedWord>> {
    read_caption_file(&input.captions, input.format.to_caption_format())
        .with_context(|| format!("Failed to read captions from {}", input.captions.display()))
}

/// Builds the configured annotator, wrapped in a cache when requested.
///
/// A read-only cache serves existing documents without writing new ones.
fn build_annotator(
    args: &AnnotatorArgs,
    key: &str,
    read_only: bool,
) -> Result<Box<dyn Annotator>> {
    let annotator: Box<dyn Annotator> = match (&args.annotations, &args.annotator_cmd) {
        (Some(path), _) => Box::new(JsonFileAnnotator::new(path)),
        (None, Some(command_line)) => Box::new(
            CommandAnnotator::from_command_line(command_line)
                .context("Invalid --annotator-cmd")?,
        ),
        (None, None) => {
            debug!("No annotator configured, using punctuation fallback");
            Box::new(PunctuationAnnotator)
        }
    };

    match &args.annotation_cache {
        Some(dir) => {
            let cached = CachedAnnotator::new(annotator, AnnotationStore::new(dir), key);
            if read_only {
                Ok(Box::new(cached.read_only()))
            } else {
                Ok(Box::new(cached))
            }
        }
        None => Ok(annotator),
    }
}

// =============================================================================
// Segment
// =============================================================================

/// Merges the settings file (if any) with command-line overrides
fn resolve_settings(args: &SegmentArgs) -> Result<SegmenterSettings> {
    let mut settings = match &args.settings {
        Some(path) => SettingsManager::new(path).load(),
        None => SegmenterSettings::default(),
    };

    if let Some(min_words) = args.min_words {
        settings.min_words = min_words;
    }
    if let Some(max_duration) = args.max_duration {
        if !max_duration.is_finite() || max_duration <= 0.0 {
            anyhow::bail!("--max-duration must be a positive number of seconds");
        }
        settings.max_duration_ms = secs_to_ms(max_duration);
    }
    if let Some(pad_start) = args.pad_start {
        settings.margin_start_ms = pad_start;
    }
    if let Some(pad_end) = args.pad_end {
        settings.margin_end_ms = pad_end;
    }
    if let Some(cut) = &args.cut {
        settings.cut = parse_list(cut).context("Invalid --cut")?;
    }
    if let Some(boundaries) = &args.boundaries {
        settings.boundaries = parse_list(boundaries).context("Invalid --boundaries")?;
    }
    if args.keep_dups {
        settings.keep_duplicates = true;
    }
    if args.strict {
        settings.alignment = AlignmentDiscipline::Exact;
    }

    settings.normalize();
    Ok(settings)
}

/// Output file path inside the output directory
fn output_path(out_dir: &Path, video_id: &str, extension: &str) -> PathBuf {
    out_dir.join(format!("{}.{}", video_id, extension))
}

fn write_output(path: &Path, content: &str) -> Result<()> {
    atomic_write_text(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

fn log_summary(report: &SegmentationReport) {
    info!(
        "{} words -> {} boundary strings -> {} aligned ({} dropped, {} merged)",
        report.words,
        report.boundary_strings,
        report.aligned,
        report.dropped_alignments,
        report.merged_alignments
    );
    info!(
        "gap {} / comma {} / pause {} / dedup {} / archive {} -> {} segments",
        report.after_gap_split,
        report.after_comma_split,
        report.after_pause_split,
        report.after_dedup,
        report.after_archive,
        report.output
    );
    if let Some(longest) = &report.longest_by_duration {
        info!(
            "Longest by duration: {:.2}s {:?}",
            ms_to_secs(longest.duration_ms),
            longest.sentence
        );
    }
    if let Some(longest) = &report.longest_by_words {
        info!("Longest by words: {} {:?}", longest.words, longest.sentence);
    }
    info!(
        "{} segments lack terminal punctuation",
        report.missing_terminal_punctuation
    );
}

fn run_segment(args: SegmentArgs, verbose: bool) -> Result<()> {
    let settings = resolve_settings(&args)?;
    let video_id = args.input.resolved_video_id();
    debug!("Settings: {:?}", settings);

    let words = load_words(&args.input)?;
    let annotator = build_annotator(&args.annotator, &video_id, args.dry)?;

    let mut archive = match &args.archive {
        Some(path) => Some(
            SentenceArchive::load(path, !args.dry && !args.no_archive_update)
                .with_context(|| format!("Failed to load archive {}", path.display()))?,
        ),
        None => None,
    };

    let output = Segmenter::new(settings)
        .run(&words, annotator.as_ref(), archive.as_mut())
        .with_context(|| format!("Segmentation failed for {}", video_id))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for segment in &output.segments {
        writeln!(
            out,
            "{}\t{}",
            segment_media_name(&video_id, segment),
            segment.sentence()
        )?;
    }
    out.flush()?;

    if verbose {
        log_summary(&output.report);
    }

    if args.dry {
        info!("Dry run, no files written");
        if args.report {
            println!("{}", serde_json::to_string_pretty(&output.report)?);
        }
        return Ok(());
    }

    let out_dir = &args.out_dir;
    if args.make_vtt {
        write_output(&output_path(out_dir, &video_id, "vtt"), &export_vtt(&output.segments))?;
    }
    if args.make_srt {
        write_output(&output_path(out_dir, &video_id, "srt"), &export_srt(&output.segments))?;
    }
    if args.make_txt {
        write_output(&output_path(out_dir, &video_id, "txt"), &export_text(&output.segments))?;
    }
    if args.make_json {
        write_output(
            &output_path(out_dir, &video_id, "json"),
            &export_json(&output.segments)?,
        )?;
    }
    if args.report {
        write_output(
            &output_path(out_dir, &video_id, "report.json"),
            &serde_json::to_string_pretty(&output.report)?,
        )?;
    }

    if let Some(archive) = &archive {
        archive
            .save()
            .with_context(|| format!("Failed to update archive {}", archive.path().display()))?;
    }

    if output.segments.is_empty() {
        warn!("No segments produced for {}", video_id);
    }

    Ok(())
}

// =============================================================================
// Words / Tokens
// =============================================================================

fn run_words(args: WordsArgs) -> Result<()> {
    let words = load_words(&args.input)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&words)?);
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for word in &words {
        writeln!(
            out,
            "{} --> {}\t{}",
            format_vtt_timestamp(word.start()),
            format_vtt_timestamp(word.end()),
            word.text()
        )?;
    }
    out.flush()?;
    Ok(())
}

fn run_tokens(args: TokensArgs) -> Result<()> {
    let words = load_words(&args.input)?;
    let annotator = build_annotator(&args.annotator, &args.input.resolved_video_id(), false)?;

    let text = words
        .iter()
        .map(TimedWord::text)
        .collect::<Vec<_>>()
        .join(" ");
    let doc = annotator
        .annotate(&text)
        .with_context(|| format!("Annotator {} failed", annotator.name()))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "idx\ttext\tpos\tdep\thead\tsent")?;
    for (index, token) in doc.tokens.iter().enumerate() {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}\t{}",
            index, token.text, token.pos, token.dep, token.head, token.sent
        )?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    const VTT: &str = "WEBVTT\n\n\
00:00:00.000 --> 00:00:02.000\n\n\
Hello<00:00:00.500><c> there.</c>\n\n\
00:00:02.000 --> 00:00:04.000\n\n\
Good<00:00:02.500><c> bye.</c>\n";

    fn write_captions(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("vid1.vtt");
        std::fs::write(&path, VTT).unwrap();
        path
    }

    fn segment_args(extra: &[&str]) -> SegmentArgs {
        let mut argv = vec!["cuecards-cli", "segment"];
        argv.extend_from_slice(extra);
        match Args::try_parse_from(argv).unwrap().command {
            Command::Segment(s) => s,
            _ => panic!("Expected Segment command"),
        }
    }

    #[test]
    fn test_resolve_settings_overrides() {
        let args = segment_args(&[
            "-c",
            "a.vtt",
            "--min-words",
            "3",
            "--max-duration",
            "2.5",
            "--cut",
            "pause",
            "--boundaries",
            "sentence",
            "--strict",
            "--keep-dups",
        ]);
        let settings = resolve_settings(&args).unwrap();

        assert_eq!(settings.min_words, 3);
        assert_eq!(settings.max_duration_ms, 2500);
        assert_eq!(settings.cut.len(), 1);
        assert_eq!(settings.boundaries.len(), 1);
        assert_eq!(settings.alignment, AlignmentDiscipline::Exact);
        assert!(settings.keep_duplicates);
    }

    #[test]
    fn test_resolve_settings_rejects_bad_lists() {
        let args = segment_args(&["-c", "a.vtt", "--cut", "comma,scissors"]);
        assert!(resolve_settings(&args).is_err());

        let args = segment_args(&["-c", "a.vtt", "--max-duration", "0"]);
        assert!(resolve_settings(&args).is_err());
    }

    #[test]
    fn test_resolve_settings_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"minWords": 4, "marginEndMs": 0}"#).unwrap();

        let args = segment_args(&["-c", "a.vtt", "--settings", path.to_str().unwrap()]);
        let settings = resolve_settings(&args).unwrap();
        assert_eq!(settings.min_words, 4);
        assert_eq!(settings.margin_end_ms, 0);
    }

    #[test]
    fn test_segment_writes_outputs_and_archive() {
        let dir = TempDir::new().unwrap();
        let captions = write_captions(&dir);
        let out_dir = dir.path().join("out");
        let archive = dir.path().join("archive.txt");

        let args = segment_args(&[
            "-c",
            captions.to_str().unwrap(),
            "--min-words",
            "1",
            "--archive",
            archive.to_str().unwrap(),
            "--out-dir",
            out_dir.to_str().unwrap(),
            "--make-vtt",
            "--make-txt",
            "--report",
        ]);
        run_segment(args, false).unwrap();

        let text = std::fs::read_to_string(out_dir.join("vid1.txt")).unwrap();
        assert_eq!(text, "Hello there.\nGood bye.\n");
        assert!(out_dir.join("vid1.vtt").exists());
        assert!(out_dir.join("vid1.report.json").exists());
        assert_eq!(
            std::fs::read_to_string(&archive).unwrap(),
            "Hello there.\nGood bye.\n"
        );
    }

    #[test]
    fn test_segment_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let captions = write_captions(&dir);
        let state = dir.path().join("state");
        std::fs::create_dir(&state).unwrap();
        let out_dir = state.join("out");
        let archive = state.join("archive").join("archive.txt");
        let cache = state.join("cache");

        let args = segment_args(&[
            "-c",
            captions.to_str().unwrap(),
            "--archive",
            archive.to_str().unwrap(),
            "--annotation-cache",
            cache.to_str().unwrap(),
            "--out-dir",
            out_dir.to_str().unwrap(),
            "--make-vtt",
            "--report",
            "--dry",
        ]);
        run_segment(args, true).unwrap();

        let entries: Vec<_> = std::fs::read_dir(&state).unwrap().collect();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_segment_fills_annotation_cache() {
        let dir = TempDir::new().unwrap();
        let captions = write_captions(&dir);
        let cache = dir.path().join("cache");

        let args = segment_args(&[
            "-c",
            captions.to_str().unwrap(),
            "--annotation-cache",
            cache.to_str().unwrap(),
            "--out-dir",
            dir.path().join("out").to_str().unwrap(),
        ]);
        run_segment(args, false).unwrap();

        assert!(cache.join("vid1.annotations.json").exists());
    }

    #[test]
    fn test_build_annotator_selection() {
        let args = AnnotatorArgs {
            annotations: None,
            annotator_cmd: None,
            annotation_cache: None,
        };
        assert_eq!(build_annotator(&args, "k", false).unwrap().name(), "punctuation");

        let args = AnnotatorArgs {
            annotations: Some(PathBuf::from("doc.json")),
            annotator_cmd: None,
            annotation_cache: Some(PathBuf::from("cache")),
        };
        assert_eq!(build_annotator(&args, "k", false).unwrap().name(), "json-file");

        let args = AnnotatorArgs {
            annotations: None,
            annotator_cmd: Some("   ".to_string()),
            annotation_cache: None,
        };
        assert!(build_annotator(&args, "k", false).is_err());
    }
}
