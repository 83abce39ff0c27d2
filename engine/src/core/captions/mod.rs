//! Caption Module
//!
//! Everything that touches caption text on the way in or out:
//! - Timed word and segment models
//! - Word-timed VTT and timed-text XML parsing
//! - VTT, SRT, plain text and JSON export of the final segments
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Caption Module                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  models.rs     - TimedWord, Segment                             │
//! │  parser.rs     - raw captions -> Vec<TimedWord>                 │
//! │  formats.rs    - timestamps, exporters, media naming            │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use cuecards_lib::core::captions::{read_caption_file, export_vtt};
//!
//! let words = read_caption_file(Path::new("talk.en.vtt"), None)?;
//! // ... segmentation ...
//! let vtt = export_vtt(&segments);
//! ```

mod formats;
mod models;
mod parser;

// Re-export models
pub use models::{Segment, TimedWord};

// Re-export parser
pub use parser::{parse_captions, read_caption_file, CaptionFormat};

// Re-export format functions
pub use formats::{
    export_json, export_srt, export_text, export_vtt, format_srt_timestamp,
    format_vtt_timestamp, parse_timestamp, segment_media_name,
};
