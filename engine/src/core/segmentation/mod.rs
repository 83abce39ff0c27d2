//! Segmentation Module
//!
//! Turns a video's timed words into flashcard-sized segments.
//!
//! ```text
//! ┌─────────────┐   ┌────────────┐   ┌───────────┐   ┌──────────────────┐
//! │ boundaries  │──▶│ alignment  │──▶│ splitter  │──▶│ postprocess      │
//! │ (annotated  │   │ (strings → │   │ gap/comma │   │ dedup, archive,  │
//! │  document)  │   │  segments) │   │ /pause    │   │ margins          │
//! └─────────────┘   └────────────┘   └───────────┘   └──────────────────┘
//! ```
//!
//! [`Segmenter`] wires the stages together and collects a
//! [`SegmentationReport`].

mod alignment;
mod archive;
mod boundaries;
mod pipeline;
mod postprocess;
mod report;
mod splitter;

pub use alignment::{align, Alignment};
pub use archive::SentenceArchive;
pub use boundaries::{
    grammatical_boundaries, select_split_points, sentence_boundaries, split_document,
};
pub use pipeline::{SegmentationOutput, Segmenter};
pub use postprocess::{apply_margins, dedup};
pub use report::{SegmentSummary, SegmentationReport};
pub use splitter::{comma_split, gap_split, pause_split};
