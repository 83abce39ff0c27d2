//! Temporal Splitter
//!
//! Splits aligned segments on timing cues: long silences, commas near the
//! temporal midpoint, and the largest pause between word starts.

use crate::core::captions::Segment;
use crate::core::{CoreResult, TimeMs, GAP_SPLIT_THRESHOLD_MS};

// =============================================================================
// Gap Split
// =============================================================================

/// Cuts between consecutive words separated by at least
/// [`GAP_SPLIT_THRESHOLD_MS`] of silence
pub fn gap_split(segment: &Segment) -> CoreResult<Vec<Segment>> {
    let words = segment.words();
    let mut parts = Vec::new();
    let mut first = 0;

    for i in 1..words.len() {
        if words[i].start() - words[i - 1].end() >= GAP_SPLIT_THRESHOLD_MS {
            parts.push(Segment::from_slice(&words[first..i])?);
            first = i;
        }
    }
    parts.push(Segment::from_slice(&words[first..])?);

    Ok(parts)
}

// =============================================================================
// Pause Split
// =============================================================================

fn is_splittable(segment: &Segment, min_words: usize, max_duration: TimeMs) -> bool {
    segment.len() >= min_words && segment.duration() >= max_duration
}

/// Index of the word preceded by the largest start-to-start pause, restricted
/// to cuts leaving `min_words` on both sides. Positions without a positive
/// pause are never cut.
fn largest_pause(segment: &Segment, min_words: usize) -> Option<usize> {
    let words = segment.words();
    let len = words.len();
    let mut best: Option<usize> = None;
    let mut max_pause: TimeMs = 0;

    for i in 1..len {
        if i.min(len - i) < min_words {
            continue;
        }
        let pause = words[i].start() - words[i - 1].start();
        if pause > max_pause {
            max_pause = pause;
            best = Some(i);
        }
    }

    best
}

/// Recursively cuts long segments at their largest pause
pub fn pause_split(
    segment: Segment,
    min_words: usize,
    max_duration: TimeMs,
) -> CoreResult<Vec<Segment>> {
    let mut done = Vec::new();
    // Stack of pending segments, right-most at the bottom
    let mut pending = vec![segment];

    while let Some(current) = pending.pop() {
        if !is_splittable(&current, min_words, max_duration) {
            done.push(current);
            continue;
        }
        match largest_pause(&current, min_words) {
            Some(i) => {
                let (left, right) = current.split_at(i)?;
                pending.push(right);
                pending.push(left);
            }
            None => done.push(current),
        }
    }

    Ok(done)
}

// =============================================================================
// Comma Split
// =============================================================================

/// Cuts a long segment after the comma closest to its temporal midpoint, then
/// pause-splits both halves
pub fn comma_split(
    segment: Segment,
    min_words: usize,
    max_duration: TimeMs,
) -> CoreResult<Vec<Segment>> {
    if !is_splittable(&segment, min_words, max_duration) {
        return Ok(vec![segment]);
    }

    let words = segment.words();
    let len = words.len();
    let midpoint = segment.start() + segment.duration() / 2;

    let mut best: Option<(usize, TimeMs)> = None;
    for (i, word) in words.iter().enumerate() {
        let cut = i + 1;
        if !word.text().ends_with(',') || cut < min_words || len - cut < min_words {
            continue;
        }
        let distance = (word.end() - midpoint).abs();
        if best.is_none_or(|(_, closest)| distance <= closest) {
            best = Some((cut, distance));
        }
    }

    let Some((cut, _)) = best else {
        return Ok(vec![segment]);
    };

    let (left, right) = segment.split_at(cut)?;
    let mut parts = pause_split(left, min_words, max_duration)?;
    parts.extend(pause_split(right, min_words, max_duration)?);
    Ok(parts)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::captions::TimedWord;

    fn segment(words: &[(i64, i64, &str)]) -> Segment {
        Segment::new(
            words
                .iter()
                .map(|(s, e, t)| TimedWord::new(*s, *e, *t).unwrap())
                .collect(),
        )
        .unwrap()
    }

    /// Words starting at each offset, 500 ms long, named w0, w1, ...
    fn spaced(starts: &[i64]) -> Segment {
        Segment::new(
            starts
                .iter()
                .enumerate()
                .map(|(i, s)| TimedWord::new(*s, s + 500, format!("w{i}")).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn lens(parts: &[Segment]) -> Vec<usize> {
        parts.iter().map(Segment::len).collect()
    }

    // -------------------------------------------------------------------------
    // Gap
    // -------------------------------------------------------------------------

    #[test]
    fn test_gap_split_at_long_silence() {
        // Gaps: 0.5s, 3s, 0.2s
        let seg = segment(&[
            (0, 500, "a"),
            (1000, 1500, "b"),
            (4500, 5000, "c"),
            (5200, 5500, "d"),
        ]);
        let parts = gap_split(&seg).unwrap();

        assert_eq!(lens(&parts), vec![2, 2]);
        assert_eq!(parts[1].start(), 4500);
    }

    #[test]
    fn test_gap_split_threshold_is_inclusive() {
        let seg = segment(&[(0, 500, "a"), (2500, 3000, "b")]);
        assert_eq!(gap_split(&seg).unwrap().len(), 2);

        let seg = segment(&[(0, 500, "a"), (2499, 3000, "b")]);
        assert_eq!(gap_split(&seg).unwrap().len(), 1);
    }

    // -------------------------------------------------------------------------
    // Pause
    // -------------------------------------------------------------------------

    #[test]
    fn test_pause_split_short_segment_unchanged() {
        let seg = spaced(&[0, 5000, 10000]);
        let parts = pause_split(seg.clone(), 4, 1000).unwrap();
        assert_eq!(parts, vec![seg]);
    }

    #[test]
    fn test_pause_split_below_max_duration_unchanged() {
        let seg = spaced(&[0, 1000, 2000, 3000]);
        assert_eq!(pause_split(seg, 2, 10_000).unwrap().len(), 1);
    }

    #[test]
    fn test_pause_split_at_largest_pause() {
        let seg = spaced(&[0, 1000, 2000, 4000, 5000, 5500]);
        let parts = pause_split(seg, 2, 4000).unwrap();

        assert_eq!(lens(&parts), vec![3, 3]);
        assert_eq!(parts[1].start(), 4000);
    }

    #[test]
    fn test_pause_split_tie_takes_first() {
        let seg = spaced(&[0, 1000, 2000, 3000, 4000, 5000]);
        let parts = pause_split(seg, 2, 4000).unwrap();
        assert_eq!(lens(&parts), vec![2, 4]);
    }

    #[test]
    fn test_pause_split_without_candidate_is_terminal() {
        let seg = spaced(&[0, 9000, 20000]);
        assert_eq!(pause_split(seg, 2, 1000).unwrap().len(), 1);
    }

    #[test]
    fn test_pause_split_ignores_zero_pauses() {
        // Timed-text cue: four words sharing one start
        let seg = segment(&[
            (0, 2000, "a"),
            (0, 2000, "b"),
            (0, 2000, "c"),
            (0, 2000, "d"),
            (3000, 5000, "e"),
        ]);
        let parts = pause_split(seg.clone(), 2, 4000).unwrap();
        assert_eq!(parts, vec![seg]);
    }

    #[test]
    fn test_pause_split_recurses_in_order() {
        let seg = spaced(&[0, 1000, 3000, 4000, 6000, 7000, 9000, 10000]);
        let parts = pause_split(seg, 2, 2500).unwrap();

        assert_eq!(lens(&parts), vec![2, 2, 2, 2]);
        let starts: Vec<_> = parts.iter().map(Segment::start).collect();
        assert_eq!(starts, vec![0, 3000, 6000, 9000]);
    }

    // -------------------------------------------------------------------------
    // Comma
    // -------------------------------------------------------------------------

    #[test]
    fn test_comma_split_near_midpoint_then_pause() {
        let seg = segment(&[
            (0, 400, "one"),
            (500, 900, "two,"),
            (1000, 1400, "three"),
            (1500, 1900, "four,"),
            (2000, 2400, "five"),
            (2500, 2900, "six"),
        ]);
        let parts = comma_split(seg, 2, 1000).unwrap();
        let sentences: Vec<_> = parts.iter().map(Segment::sentence).collect();

        assert_eq!(sentences, vec!["one two,", "three four,", "five six"]);
    }

    #[test]
    fn test_comma_split_tie_takes_later_comma() {
        let seg = segment(&[
            (0, 200, "a"),
            (200, 400, "b,"),
            (400, 600, "c"),
            (600, 800, "d,"),
            (800, 1000, "e"),
            (1000, 1200, "f"),
        ]);
        let parts = comma_split(seg, 2, 1000).unwrap();
        let sentences: Vec<_> = parts.iter().map(Segment::sentence).collect();

        assert_eq!(sentences, vec!["a b, c d,", "e f"]);
    }

    #[test]
    fn test_comma_split_requires_min_words_each_side() {
        let seg = segment(&[
            (0, 400, "well,"),
            (500, 900, "that"),
            (1000, 1400, "is"),
            (1500, 1900, "fine"),
        ]);
        let parts = comma_split(seg.clone(), 2, 1000).unwrap();
        assert_eq!(parts, vec![seg]);
    }
}
