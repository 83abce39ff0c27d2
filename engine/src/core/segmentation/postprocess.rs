//! Post-processing
//!
//! Final passes over the segment list: duplicate removal and margin padding.

use std::collections::HashSet;

use crate::core::captions::Segment;
use crate::core::{CoreResult, TimeMs};

/// Keeps the first occurrence of each sentence
pub fn dedup(segments: Vec<Segment>) -> Vec<Segment> {
    let mut seen = HashSet::new();
    segments
        .into_iter()
        .filter(|segment| seen.insert(segment.sentence()))
        .collect()
}

/// Pads segment starts by `margin_start` and all but the last segment's end by
/// `margin_end`.
///
/// A start margin is only applied when it fits before the segment
/// (`margin_start < start`). Padding may overlap the following segment.
pub fn apply_margins(
    segments: Vec<Segment>,
    margin_start: TimeMs,
    margin_end: TimeMs,
) -> CoreResult<Vec<Segment>> {
    let count = segments.len();
    let mut padded = Vec::with_capacity(count);

    for (i, mut segment) in segments.into_iter().enumerate() {
        if margin_start < segment.start() {
            segment = segment.with_start(segment.start() - margin_start)?;
        }
        if i + 1 < count {
            segment = segment.with_end(segment.end() + margin_end)?;
        }
        padded.push(segment);
    }

    Ok(padded)
}
