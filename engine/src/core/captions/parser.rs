//! Caption Parser
//!
//! Turns raw caption markup into an ordered list of [`TimedWord`]s.
//!
//! Two sources are understood:
//!
//! - **Word-timed WebVTT**: auto-generated captions where every cue carries
//!   inline `<HH:MM:SS.mmm><c>word</c>` markers.
//! - **Timed-text XML**: `<p t="MS">text</p>` elements with a millisecond
//!   start offset and no reliable end.
//!
//! Word policy shared by both sources:
//!
//! ```text
//! span      = [start of word, start of next word)   (cue end for the last word)
//! clamp     = span never longer than MAX_WORD_DURATION_MS
//! explode   = "New York" -> "New" + "York", both keep the parent span
//! discard   = empty tokens and non-speech tokens such as "[Music]"
//! unescape  = &gt; &lt; &amp; &quot; &#39; &nbsp; &#NN;  and ">>" -> "—"
//! ```

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use super::formats::parse_timestamp;
use super::TimedWord;
use crate::core::{CoreError, CoreResult, TimeMs, MAX_WORD_DURATION_MS};

/// Synthesized cue length for sources that only carry a start offset
const TIMED_TEXT_CUE_MS: TimeMs = 2_000;

/// Speaker-change marker and its replacement
const SPEAKER_CHANGE: &str = ">>";
const SPEAKER_CHANGE_DASH: &str = "—";

// =============================================================================
// Format Detection
// =============================================================================

/// Supported caption sources
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptionFormat {
    /// Word-timed WebVTT (inline timestamp markers)
    Vtt,
    /// Timed-text XML (`<p t="MS">`)
    TimedText,
}

impl CaptionFormat {
    /// Guesses the format from the content
    pub fn detect(content: &str) -> CoreResult<Self> {
        if content.lines().any(|line| line.contains("-->")) {
            return Ok(Self::Vtt);
        }
        if TIMED_TEXT_PROBE_RE.is_match(content) {
            return Ok(Self::TimedText);
        }
        Err(CoreError::MalformedCaption(
            "Unrecognized caption format".to_string(),
        ))
    }

    /// Short lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vtt => "vtt",
            Self::TimedText => "timedtext",
        }
    }
}

// =============================================================================
// Entry Points
// =============================================================================

/// Reads a caption file and parses it.
///
/// When `format` is `None` the format is detected from the content.
pub fn read_caption_file(path: &Path, format: Option<CaptionFormat>) -> CoreResult<Vec<TimedWord>> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8(bytes).map_err(|_| {
        CoreError::MalformedCaption(format!("{} is not valid UTF-8", path.display()))
    })?;

    let format = match format {
        Some(format) => format,
        None => CaptionFormat::detect(&content)?,
    };
    debug!("Parsing {} as {}", path.display(), format.as_str());

    parse_captions(&content, format)
}

/// Parses caption content into timed words
pub fn parse_captions(content: &str, format: CaptionFormat) -> CoreResult<Vec<TimedWord>> {
    let words = match format {
        CaptionFormat::Vtt => parse_word_timed_vtt(content)?,
        CaptionFormat::TimedText => parse_timed_text(content)?,
    };
    info!("{} words have individual timestamps", words.len());
    Ok(words)
}

// =============================================================================
// Word-Timed WebVTT
// =============================================================================

static CUE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d\d:\d\d:\d\d\.\d+ -->").expect("Invalid cue line regex")
});

static INLINE_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(\d+:\d+:\d+\.\d+)>.*?<c>(.*?)</c>").expect("Invalid inline word regex")
});

/// Parses auto-generated WebVTT with inline word timestamps.
///
/// ```text
/// 00:00:00.000 --> 00:00:02.500 align:start position:0%
/// <previous line, ignored>
/// hello<00:00:00.400><c> world</c><00:00:01.000><c> again</c>
/// ```
fn parse_word_timed_vtt(content: &str) -> CoreResult<Vec<TimedWord>> {
    let lines: Vec<&str> = content.lines().collect();
    let mut sink = WordSink::default();
    let mut cues = 0usize;

    let mut i = 0;
    while i < lines.len() {
        let row = lines[i].trim();
        if !CUE_LINE_RE.is_match(row) {
            i += 1;
            continue;
        }
        cues += 1;

        let (start_part, end_part) = row
            .split_once("-->")
            .ok_or_else(|| CoreError::MalformedCaption(format!("Invalid cue line: {}", row)))?;
        let cue_start = parse_timestamp(start_part)?;
        // Cue settings follow the end stamp
        let cue_end = parse_timestamp(end_part.split_whitespace().next().unwrap_or(""))?;

        i += 2;
        let word_row = lines.get(i).map(|line| line.trim()).unwrap_or("");

        let head_word = word_row.split('<').next().unwrap_or("").trim();
        let mut times = vec![cue_start];
        let mut texts = vec![head_word.to_string()];
        for caps in INLINE_WORD_RE.captures_iter(word_row) {
            times.push(parse_timestamp(&caps[1])?);
            texts.push(caps[2].trim().to_string());
        }
        times.push(cue_end);

        for (j, text) in texts.iter().enumerate() {
            sink.push(times[j], times[j + 1], text)?;
        }

        i += 1;
    }

    if cues == 0 {
        return Err(CoreError::MalformedCaption(
            "No caption cues found".to_string(),
        ));
    }

    Ok(sink.finish())
}

// =============================================================================
// Timed-Text XML
// =============================================================================

static TIMED_TEXT_PROBE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<p\s[^>]*\bt=""#).expect("Invalid timed text probe regex")
});

static PARAGRAPH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<p\b([^>]*)>(.*?)</p>").expect("Invalid paragraph regex")
});

static START_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\bt="([^"]*)""#).expect("Invalid start attr regex")
});

static INNER_TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<[^>]*>").expect("Invalid inner tag regex")
});

/// A timed-text cue that still has speech after filtering
struct KeptCue {
    start: TimeMs,
    tokens: Vec<String>,
}

/// Parses timed-text XML.
///
/// Ends are synthesized as `start + 2s` and then pulled back to the next
/// kept cue's start, never below the cue's own start.
fn parse_timed_text(content: &str) -> CoreResult<Vec<TimedWord>> {
    let mut cues = 0usize;
    let mut skipped = 0usize;
    let mut kept: Vec<KeptCue> = Vec::new();

    for caps in PARAGRAPH_RE.captures_iter(content) {
        cues += 1;
        let attrs = &caps[1];
        let raw_start = START_ATTR_RE
            .captures(attrs)
            .map(|c| c[1].to_string())
            .ok_or_else(|| {
                CoreError::MalformedCaption(format!("Cue without start offset: <p{}>", attrs))
            })?;
        let start: TimeMs = raw_start.trim().parse().map_err(|_| {
            CoreError::MalformedCaption(format!("Invalid timestamp: {}", raw_start))
        })?;
        if start < 0 {
            return Err(CoreError::MalformedCaption(format!(
                "Invalid timestamp: {}",
                raw_start
            )));
        }

        let text = INNER_TAG_RE.replace_all(&caps[2], "");
        let (tokens, dropped) = speech_tokens(&text);
        skipped += dropped;
        if !tokens.is_empty() {
            kept.push(KeptCue { start, tokens });
        }
    }

    if cues == 0 {
        return Err(CoreError::MalformedCaption(
            "No caption cues found".to_string(),
        ));
    }
    if skipped > 0 {
        debug!("Skipped {} non-speech tokens", skipped);
    }

    let mut words = Vec::new();
    for (index, cue) in kept.iter().enumerate() {
        let mut end = cue.start + TIMED_TEXT_CUE_MS;
        if let Some(next) = kept.get(index + 1) {
            if next.start < end {
                end = next.start.max(cue.start);
            }
        }
        for token in &cue.tokens {
            words.push(timed_word(cue.start, end, token)?);
        }
    }

    Ok(words)
}

// =============================================================================
// Word Policy
// =============================================================================

/// Collects words while applying the shared word policy
#[derive(Default)]
struct WordSink {
    words: Vec<TimedWord>,
    skipped: usize,
}

impl WordSink {
    fn push(&mut self, start: TimeMs, end: TimeMs, raw: &str) -> CoreResult<()> {
        let (tokens, dropped) = speech_tokens(raw);
        self.skipped += dropped;
        for token in tokens {
            self.words.push(timed_word(start, end, &token)?);
        }
        Ok(())
    }

    fn finish(self) -> Vec<TimedWord> {
        if self.skipped > 0 {
            debug!("Skipped {} non-speech tokens", self.skipped);
        }
        self.words
    }
}

static BRACKETED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[[^\]]*\]").expect("Invalid bracketed span regex")
});

/// Splits raw caption text into speech tokens, returning them and the number
/// of non-speech spans dropped.
///
/// Bracketed spans such as `[Music playing]` go as a whole; a token that
/// opens a bracket without closing it is dropped on its own.
fn speech_tokens(raw: &str) -> (Vec<String>, usize) {
    let text = unescape_entities(raw).replace(SPEAKER_CHANGE, SPEAKER_CHANGE_DASH);

    let mut dropped = BRACKETED_RE.find_iter(&text).count();
    let text = BRACKETED_RE.replace_all(&text, " ");
    let tokens = text
        .split_whitespace()
        .filter(|token| {
            let speech = !token.starts_with('[');
            if !speech {
                dropped += 1;
            }
            speech
        })
        .map(str::to_string)
        .collect();

    (tokens, dropped)
}

/// Builds a word, clamping its span to the per-word ceiling
fn timed_word(start: TimeMs, end: TimeMs, text: &str) -> CoreResult<TimedWord> {
    let end = end.min(start.saturating_add(MAX_WORD_DURATION_MS));
    TimedWord::new(start, end, text).map_err(|_| {
        CoreError::MalformedCaption(format!(
            "Inverted word span {}~{} ms for {:?}",
            start, end, text
        ))
    })
}

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[xX][0-9a-fA-F]+|#[0-9]+|[a-zA-Z]+);").expect("Invalid entity regex")
});

/// Unescapes the HTML entities caption generators emit; unknown entities are kept
pub(crate) fn unescape_entities(text: &str) -> String {
    ENTITY_RE
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let name = &caps[1];
            let decoded = match name {
                "gt" => Some('>'),
                "lt" => Some('<'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                "nbsp" => Some(' '),
                _ => {
                    let code = if let Some(hex) =
                        name.strip_prefix("#x").or_else(|| name.strip_prefix("#X"))
                    {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = name.strip_prefix('#') {
                        dec.parse::<u32>().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                }
            };
            match decoded {
                Some(c) => c.to_string(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

// =============================================================================
// Tests
// =============================================================================
