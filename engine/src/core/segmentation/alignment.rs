//! Annotation Aligner
//!
//! Maps boundary strings (produced over the joined word text) back onto the
//! timed words, yielding one segment per matched string.

use tracing::{debug, warn};

use crate::core::captions::{Segment, TimedWord};
use crate::core::settings::AlignmentDiscipline;
use crate::core::{CoreError, CoreResult};

/// Result of aligning boundary strings onto timed words
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    /// One segment per matched boundary string, in order
    pub segments: Vec<Segment>,
    /// Indices of boundary strings that could not be matched
    pub dropped: Vec<usize>,
    /// Indices of boundary strings whose segment absorbed unmatched leading words
    pub merged: Vec<usize>,
}

/// Aligns `strings` onto `words` using the given discipline
pub fn align(
    words: &[TimedWord],
    strings: &[String],
    discipline: AlignmentDiscipline,
) -> CoreResult<Alignment> {
    match discipline {
        AlignmentDiscipline::Exact => align_exact(words, strings),
        AlignmentDiscipline::Growth => Ok(align_growth(words, strings)),
    }
}

fn join_words(words: &[TimedWord]) -> String {
    words
        .iter()
        .map(TimedWord::text)
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// Exact Discipline
// =============================================================================

/// Consumes exactly as many words as each string has; any mismatch aborts
fn align_exact(words: &[TimedWord], strings: &[String]) -> CoreResult<Alignment> {
    let mut alignment = Alignment::default();
    let mut pos = 0;

    for (index, string) in strings.iter().enumerate() {
        let expected = string.trim();
        let count = expected.split_whitespace().count();
        if count == 0 {
            continue;
        }

        let end = (pos + count).min(words.len());
        let found = join_words(&words[pos..end]);
        if end - pos < count || found != expected {
            return Err(CoreError::AlignmentMismatch {
                index,
                expected: expected.to_string(),
                found,
            });
        }

        alignment.segments.push(Segment::from_slice(&words[pos..end])?);
        pos = end;
    }

    if pos < words.len() {
        debug!("{} trailing words not covered by boundary strings", words.len() - pos);
    }

    Ok(alignment)
}

// =============================================================================
// Growth Discipline
// =============================================================================

/// Grows a candidate from the scan position until it contains each string
fn align_growth(words: &[TimedWord], strings: &[String]) -> Alignment {
    let mut alignment = Alignment::default();
    let mut pos = 0;

    for (index, string) in strings.iter().enumerate() {
        let target = string.trim();
        if target.is_empty() {
            continue;
        }

        if pos >= words.len() {
            warn!("Dropped boundary string {} (no words left): {:?}", index, target);
            alignment.dropped.push(index);
            continue;
        }

        match grow_match(&words[pos..], target) {
            Some(GrowthMatch { len, merged }) => {
                let span = &words[pos..pos + len];
                if merged {
                    warn!(
                        "Boundary string {} matched after unaligned words: {:?}",
                        index,
                        join_words(span)
                    );
                    alignment.merged.push(index);
                }
                // Non-empty slice of valid words
                match Segment::from_slice(span) {
                    Ok(segment) => alignment.segments.push(segment),
                    Err(e) => {
                        warn!("Dropped boundary string {}: {}", index, e);
                        alignment.dropped.push(index);
                    }
                }
                pos += len;
            }
            None => {
                warn!("Dropped boundary string {} (no match): {:?}", index, target);
                alignment.dropped.push(index);
                pos += 1;
            }
        }
    }

    alignment
}

struct GrowthMatch {
    /// Number of words covering the target
    len: usize,
    /// Whether words before the target were absorbed
    merged: bool,
}

/// Finds the shortest word prefix of `words` whose joined text contains `target`
fn grow_match(words: &[TimedWord], target: &str) -> Option<GrowthMatch> {
    let mut candidate = String::new();

    for (i, word) in words.iter().enumerate() {
        if i > 0 {
            candidate.push(' ');
        }
        candidate.push_str(word.text());

        // A new occurrence must end inside the newest word
        let mut tail_start = candidate
            .len()
            .saturating_sub(target.len() + word.text().len() + 1);
        while !candidate.is_char_boundary(tail_start) {
            tail_start -= 1;
        }

        if candidate[tail_start..].contains(target) {
            return Some(GrowthMatch {
                len: i + 1,
                merged: !candidate.starts_with(target),
            });
        }
    }

    None
}

// =============================================================================
// Tests
// =============================================================================
