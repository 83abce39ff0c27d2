//! Command-line argument parsing for cuecards-cli
//!
//! Uses clap derive macros; every structure is unit-testable through
//! `Args::try_parse_from`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use cuecards_lib::core::captions::CaptionFormat;

/// cuecards: turn word-timed captions into flashcard-sized segments
#[derive(Parser, Debug, Clone)]
#[command(name = "cuecards-cli")]
#[command(version)]
#[command(about = "Split word-timed captions into sentence-aligned segments", long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Debug-level logging and a run summary
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write daily-rotated logs into this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Segment a caption file
    Segment(SegmentArgs),

    /// Print the timed words parsed from a caption file
    Words(WordsArgs),

    /// Print the annotator's token table for a caption file
    Tokens(TokensArgs),
}

// =============================================================================
// Shared Argument Groups
// =============================================================================

/// Caption input
#[derive(clap::Args, Debug, Clone)]
pub struct CaptionArgs {
    /// Caption file (word-timed WebVTT or timed-text XML)
    #[arg(short, long)]
    pub captions: PathBuf,

    /// Caption format
    #[arg(short, long, default_value = "auto")]
    pub format: CaptionFormatArg,

    /// Video id used for cache keys and output names (default: caption file stem)
    #[arg(long)]
    pub video_id: Option<String>,
}

impl CaptionArgs {
    /// Returns the explicit video id or the caption file stem
    pub fn resolved_video_id(&self) -> String {
        self.video_id.clone().unwrap_or_else(|| {
            self.captions
                .file_stem()
                .map(|stem| stem.to_string_lossy().to_string())
                .unwrap_or_else(|| "captions".to_string())
        })
    }
}

/// Annotator selection
#[derive(clap::Args, Debug, Clone)]
pub struct AnnotatorArgs {
    /// Pre-computed annotation document (JSON)
    #[arg(long, conflicts_with = "annotator_cmd")]
    pub annotations: Option<PathBuf>,

    /// External annotator command (text on stdin, JSON document on stdout)
    #[arg(long)]
    pub annotator_cmd: Option<String>,

    /// Cache annotations in this directory
    #[arg(long)]
    pub annotation_cache: Option<PathBuf>,
}

// =============================================================================
// Command Arguments
// =============================================================================

/// Arguments for the segment command
#[derive(Parser, Debug, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are naturally boolean
pub struct SegmentArgs {
    #[command(flatten)]
    pub input: CaptionArgs,

    #[command(flatten)]
    pub annotator: AnnotatorArgs,

    /// Settings file (JSON); flags below override its values
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Sentence archive; archived sentences are skipped
    #[arg(long)]
    pub archive: Option<PathBuf>,

    /// Read the archive without appending new sentences
    #[arg(long)]
    pub no_archive_update: bool,

    /// Minimum words per segment
    #[arg(long)]
    pub min_words: Option<usize>,

    /// Duration in seconds above which segments are split further
    #[arg(long)]
    pub max_duration: Option<f64>,

    /// Start margin in milliseconds
    #[arg(long)]
    pub pad_start: Option<i64>,

    /// End margin in milliseconds
    #[arg(long)]
    pub pad_end: Option<i64>,

    /// Temporal split methods, comma separated (comma,pause)
    #[arg(long)]
    pub cut: Option<String>,

    /// Boundary kinds, comma separated (sentence,grammar)
    #[arg(long)]
    pub boundaries: Option<String>,

    /// Keep duplicate sentences
    #[arg(long)]
    pub keep_dups: bool,

    /// Fail when a boundary string does not line up with the caption words
    #[arg(long)]
    pub strict: bool,

    /// Output directory
    #[arg(short, long, default_value = ".")]
    pub out_dir: PathBuf,

    /// Write `{video_id}.vtt`
    #[arg(long)]
    pub make_vtt: bool,

    /// Write `{video_id}.srt`
    #[arg(long)]
    pub make_srt: bool,

    /// Write `{video_id}.txt`
    #[arg(long)]
    pub make_txt: bool,

    /// Write `{video_id}.json`
    #[arg(long)]
    pub make_json: bool,

    /// Write `{video_id}.report.json`
    #[arg(long)]
    pub report: bool,

    /// Write nothing and leave the archive untouched
    #[arg(long)]
    pub dry: bool,
}

/// Arguments for the words command
#[derive(Parser, Debug, Clone)]
pub struct WordsArgs {
    #[command(flatten)]
    pub input: CaptionArgs,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the tokens command
#[derive(Parser, Debug, Clone)]
pub struct TokensArgs {
    #[command(flatten)]
    pub input: CaptionArgs,

    #[command(flatten)]
    pub annotator: AnnotatorArgs,
}

// =============================================================================
// Value Enums
// =============================================================================

/// Caption format selection
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptionFormatArg {
    /// Detect from content
    #[default]
    Auto,
    /// Word-timed WebVTT
    Vtt,
    /// Timed-text XML
    Timedtext,
}

impl CaptionFormatArg {
    /// Engine format, `None` meaning detect from content
    pub fn to_caption_format(self) -> Option<CaptionFormat> {
        match self {
            Self::Auto => None,
            Self::Vtt => Some(CaptionFormat::Vtt),
            Self::Timedtext => Some(CaptionFormat::TimedText),
        }
    }
}

impl std::fmt::Display for CaptionFormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Vtt => write!(f, "vtt"),
            Self::Timedtext => write!(f, "timedtext"),
        }
    }
}
