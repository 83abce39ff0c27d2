//! Caption Data Models
//!
//! Defines the two value types every stage exchanges:
//!
//! - [`TimedWord`]: a single caption token with its own start/end time
//! - [`Segment`]: an ordered, non-empty run of timed words (one flashcard candidate)
//!
//! Both are immutable. Corrections such as margin padding build new values
//! (`with_start` / `with_end`) that replace the old ones at the same position.

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult, TimeMs};

// =============================================================================
// Timed Word
// =============================================================================

/// A caption token with its own timing
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedWord {
    start: TimeMs,
    end: TimeMs,
    text: String,
}

impl TimedWord {
    /// Creates a timed word, rejecting negative or inverted spans
    pub fn new(start: TimeMs, end: TimeMs, text: impl Into<String>) -> CoreResult<Self> {
        if start < 0 || start > end {
            return Err(CoreError::InvalidTimeRange(start, end));
        }
        Ok(Self {
            start,
            end,
            text: text.into(),
        })
    }

    /// Start time in milliseconds
    pub fn start(&self) -> TimeMs {
        self.start
    }

    /// End time in milliseconds
    pub fn end(&self) -> TimeMs {
        self.end
    }

    /// Word text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Duration in milliseconds
    pub fn duration(&self) -> TimeMs {
        self.end - self.start
    }

    /// Returns a copy of this word starting at `start`
    pub fn with_start(&self, start: TimeMs) -> CoreResult<Self> {
        Self::new(start, self.end, self.text.clone())
    }

    /// Returns a copy of this word ending at `end`
    pub fn with_end(&self, end: TimeMs) -> CoreResult<Self> {
        Self::new(self.start, end, self.text.clone())
    }
}

// =============================================================================
// Segment
// =============================================================================

/// An ordered, non-empty run of timed words in source order
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    words: Vec<TimedWord>,
}

impl Segment {
    /// Creates a segment from words.
    ///
    /// Fails on an empty word list, and on a span whose first start lies after
    /// its last end (possible when source timestamps are non-monotonic).
    pub fn new(words: Vec<TimedWord>) -> CoreResult<Self> {
        let (first, last) = match (words.first(), words.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(CoreError::EmptySegment),
        };
        if first.start() > last.end() {
            return Err(CoreError::InvalidTimeRange(first.start(), last.end()));
        }
        Ok(Self { words })
    }

    /// Creates a segment from a slice of words (cloned)
    pub fn from_slice(words: &[TimedWord]) -> CoreResult<Self> {
        Self::new(words.to_vec())
    }

    /// Words of this segment
    pub fn words(&self) -> &[TimedWord] {
        &self.words
    }

    /// Consumes the segment, returning its words
    pub fn into_words(self) -> Vec<TimedWord> {
        self.words
    }

    /// Start of the first word
    pub fn start(&self) -> TimeMs {
        self.first().start()
    }

    /// End of the last word
    pub fn end(&self) -> TimeMs {
        self.last().end()
    }

    /// Span of the segment in milliseconds
    pub fn duration(&self) -> TimeMs {
        self.end() - self.start()
    }

    /// Number of words
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Whether the segment has no words
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Word texts joined by single spaces
    pub fn sentence(&self) -> String {
        self.words
            .iter()
            .map(TimedWord::text)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Splits into `[..index]` and `[index..]`; both halves must be non-empty
    pub fn split_at(&self, index: usize) -> CoreResult<(Segment, Segment)> {
        if index == 0 || index >= self.words.len() {
            return Err(CoreError::EmptySegment);
        }
        let (left, right) = self.words.split_at(index);
        Ok((Self::from_slice(left)?, Self::from_slice(right)?))
    }

    /// Returns a new segment whose first word starts at `start`
    pub fn with_start(&self, start: TimeMs) -> CoreResult<Self> {
        let mut words = self.words.clone();
        words[0] = self.first().with_start(start)?;
        Self::new(words)
    }

    /// Returns a new segment whose last word ends at `end`
    pub fn with_end(&self, end: TimeMs) -> CoreResult<Self> {
        let mut words = self.words.clone();
        let last = words.len() - 1;
        words[last] = self.last().with_end(end)?;
        Self::new(words)
    }

    fn first(&self) -> &TimedWord {
        &self.words[0]
    }

    fn last(&self) -> &TimedWord {
        &self.words[self.words.len() - 1]
    }
}

impl<'de> Deserialize<'de> for TimedWord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawWord {
            start: TimeMs,
            end: TimeMs,
            text: String,
        }

        let raw = RawWord::deserialize(deserializer)?;
        TimedWord::new(raw.start, raw.end, raw.text).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Segment {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct RawSegment {
            words: Vec<TimedWord>,
        }

        let raw = RawSegment::deserialize(deserializer)?;
        Segment::new(raw.words).map_err(serde::de::Error::custom)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn word(start: TimeMs, end: TimeMs, text: &str) -> TimedWord {
        TimedWord::new(start, end, text).unwrap()
    }

    // -------------------------------------------------------------------------
    // TimedWord Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_timed_word_accessors() {
        let w = word(100, 450, "hello");
        assert_eq!(w.start(), 100);
        assert_eq!(w.end(), 450);
        assert_eq!(w.text(), "hello");
        assert_eq!(w.duration(), 350);
    }

    #[test]
    fn test_timed_word_rejects_inverted_span() {
        let result = TimedWord::new(500, 100, "oops");
        assert!(matches!(result, Err(CoreError::InvalidTimeRange(500, 100))));
    }

    #[test]
    fn test_timed_word_rejects_negative_start() {
        assert!(TimedWord::new(-1, 100, "oops").is_err());
    }

    #[test]
    fn test_timed_word_zero_length_allowed() {
        assert_eq!(word(300, 300, "uh").duration(), 0);
    }

    #[test]
    fn test_timed_word_with_start_leaves_original() {
        let w = word(100, 450, "hello");
        let moved = w.with_start(0).unwrap();
        assert_eq!(moved.start(), 0);
        assert_eq!(w.start(), 100);
        assert!(w.with_start(500).is_err());
    }

    // -------------------------------------------------------------------------
    // Segment Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_segment_derived_attributes() {
        let seg = Segment::new(vec![
            word(1000, 1400, "Hello,"),
            word(1400, 1900, "world."),
        ])
        .unwrap();

        assert_eq!(seg.start(), 1000);
        assert_eq!(seg.end(), 1900);
        assert_eq!(seg.duration(), 900);
        assert_eq!(seg.len(), 2);
        assert!(!seg.is_empty());
        assert_eq!(seg.sentence(), "Hello, world.");
    }

    #[test]
    fn test_segment_rejects_empty() {
        assert!(matches!(Segment::new(vec![]), Err(CoreError::EmptySegment)));
    }

    #[test]
    fn test_segment_rejects_inverted_span() {
        let result = Segment::new(vec![word(5000, 5100, "late"), word(100, 200, "early")]);
        assert!(matches!(result, Err(CoreError::InvalidTimeRange(5000, 200))));
    }

    #[test]
    fn test_segment_split_at() {
        let seg = Segment::new(vec![
            word(0, 100, "a"),
            word(100, 200, "b"),
            word(200, 300, "c"),
        ])
        .unwrap();

        let (left, right) = seg.split_at(1).unwrap();
        assert_eq!(left.sentence(), "a");
        assert_eq!(right.sentence(), "b c");
        assert!(seg.split_at(0).is_err());
        assert!(seg.split_at(3).is_err());
    }

    #[test]
    fn test_segment_with_start_and_end_replace_boundary_words() {
        let seg = Segment::new(vec![word(1000, 1500, "a"), word(1500, 2000, "b")]).unwrap();

        let padded = seg.with_start(900).unwrap().with_end(2025).unwrap();
        assert_eq!(padded.start(), 900);
        assert_eq!(padded.end(), 2025);
        assert_eq!(padded.words()[0].end(), 1500);
        assert_eq!(seg.start(), 1000);
        assert_eq!(seg.end(), 2000);
    }

    #[test]
    fn test_segment_serde_roundtrip_validates() {
        let seg = Segment::new(vec![word(0, 10, "hi")]).unwrap();
        let json = serde_json::to_string(&seg).unwrap();
        let parsed: Segment = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, seg);

        let empty = r#"{"words":[]}"#;
        assert!(serde_json::from_str::<Segment>(empty).is_err());

        let inverted = r#"{"words":[{"start":50,"end":10,"text":"x"}]}"#;
        assert!(serde_json::from_str::<Segment>(inverted).is_err());
    }
}
