//! Boundary Detector
//!
//! Picks the token indices after which the caption text may be cut, using the
//! annotator's sentence segmentation and dependency parse.
//!
//! Rules:
//!
//! | Rule                   | Position              | Gate          |
//! |------------------------|-----------------------|---------------|
//! | sentence end           | last token            | unconditional |
//! | quoted span            | before open, at close | unconditional |
//! | adverbial subordinator | token before marker   | min words     |
//! | clause coordination    | token before `cc`     | min words     |
//! | comma                  | the comma             | min words     |
//!
//! Nominal-clause markers ("I think that ...") never produce a candidate.

use std::collections::BTreeSet;

use tracing::{debug, info};

use crate::core::annotations::{AnnotatedDocument, Token};
use crate::core::settings::{BoundaryKind, SegmenterSettings};

/// Markers that never open an adverbial clause worth cutting at
const NON_CUTTING_MARKERS: &[&str] = &["as", "that", "though"];

/// Markers that may open a nominal (object/complement) clause
const NOMINAL_MARKERS: &[&str] = &["that", "if", "whether"];

/// Governor roles that make a marked clause nominal
const NOMINAL_HEAD_DEPS: &[&str] = &["ccomp", "xcomp", "obj"];

const QUOTE: &str = "\"";
const COMMA: &str = ",";

// =============================================================================
// Candidate Rules
// =============================================================================

/// Sentence-end and quoted-span boundaries; these bypass the minimum-word gate
pub fn sentence_boundaries(doc: &AnnotatedDocument) -> BTreeSet<usize> {
    let len = doc.len();
    let mut points = BTreeSet::new();

    for span in &doc.sentences {
        if span.end < len && span.end > 0 {
            points.insert(span.end - 1);
        }
    }

    let quotes: Vec<usize> = doc
        .tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.text == QUOTE)
        .map(|(i, _)| i)
        .collect();

    for pair in quotes.chunks_exact(2) {
        let (open, close) = (pair[0], pair[1]);
        if open > 0 {
            points.insert(open - 1);
        }
        if close + 1 < len {
            points.insert(close);
        }
    }

    points
}

/// Subordinator, coordination and comma candidates
pub fn grammatical_boundaries(doc: &AnnotatedDocument) -> BTreeSet<usize> {
    let mut points = BTreeSet::new();

    for (i, token) in doc.tokens.iter().enumerate() {
        let candidate = if is_nominal_clause_marker(doc, token) {
            None
        } else if token.dep == "mark" {
            adverbial_marker_candidate(doc, i, token)
        } else if token.dep == "cc" && is_clause_level_cc(doc, token) {
            Some(i.saturating_sub(1))
        } else if token.text == COMMA {
            Some(i)
        } else {
            None
        };

        if let Some(point) = candidate {
            points.insert(point);
        }
    }

    points
}

/// `that`/`if`/`whether` introducing a verb's object or complement
fn is_nominal_clause_marker(doc: &AnnotatedDocument, token: &Token) -> bool {
    let norm = token.text.to_lowercase();
    if !NOMINAL_MARKERS.contains(&norm.as_str()) || token.dep != "mark" {
        return false;
    }

    let Some(head) = doc.tokens.get(token.head) else {
        return false;
    };

    NOMINAL_HEAD_DEPS.contains(&head.dep.as_str()) || (head.pos == "VERB" && head.dep != "advcl")
}

/// Cut before a mid-sentence marker, or at the first comma of a sentence it opens
fn adverbial_marker_candidate(doc: &AnnotatedDocument, i: usize, token: &Token) -> Option<usize> {
    let letters: String = token
        .text
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect();
    if NON_CUTTING_MARKERS.contains(&letters.as_str()) {
        return None;
    }

    let sentence = doc.sentence_of(i)?;
    if i > sentence.start {
        return Some(i - 1);
    }

    (sentence.start..sentence.end).find(|&j| doc.tokens.get(j).is_some_and(|t| t.text == COMMA))
}

/// A conjunction joining verbal clauses rather than phrases
fn is_clause_level_cc(doc: &AnnotatedDocument, token: &Token) -> bool {
    let Some(head) = doc.tokens.get(token.head) else {
        return false;
    };

    if head.pos == "VERB" && head.dep == "ROOT" {
        return true;
    }

    doc.children(token.head).any(|child| {
        let child = &doc.tokens[child];
        child.dep == "conj" && child.pos == "VERB"
    })
}

// =============================================================================
// Minimum-Word Gate
// =============================================================================

/// Applies the minimum-word gate to sorted candidates.
///
/// `candidates` must include every unconditional point. A gated candidate
/// `idx` survives when `tokens[last..=idx]` and `tokens[idx+1..=next]` both
/// hold at least `min_words` tokens, where `last` is the start of the current
/// segment and `next` the following candidate (or the document end).
pub fn select_split_points(
    doc: &AnnotatedDocument,
    candidates: &BTreeSet<usize>,
    unconditional: &BTreeSet<usize>,
    min_words: usize,
) -> Vec<usize> {
    let len = doc.len();
    let points: Vec<usize> = candidates.iter().copied().filter(|&i| i < len).collect();

    let mut accepted = Vec::new();
    let mut last = 0;

    for (k, &idx) in points.iter().enumerate() {
        if unconditional.contains(&idx) {
            accepted.push(idx);
            last = idx + 1;
            continue;
        }

        let left = (idx + 1).saturating_sub(last);
        let right = match points.get(k + 1) {
            Some(&next) => next - idx,
            None => len - (idx + 1),
        };

        if left >= min_words && right >= min_words {
            accepted.push(idx);
            last = idx + 1;
        } else {
            debug!(
                "Dropped boundary after token {} ({} | {} tokens)",
                idx, left, right
            );
        }
    }

    accepted
}

// =============================================================================
// Document Splitting
// =============================================================================

/// Splits the annotated document into boundary strings
pub fn split_document(doc: &AnnotatedDocument, settings: &SegmenterSettings) -> Vec<String> {
    let unconditional = if settings.splits_at(BoundaryKind::Sentence) {
        sentence_boundaries(doc)
    } else {
        BTreeSet::new()
    };
    let grammatical = if settings.splits_at(BoundaryKind::Grammar) {
        grammatical_boundaries(doc)
    } else {
        BTreeSet::new()
    };

    let candidates: BTreeSet<usize> = unconditional.union(&grammatical).copied().collect();
    let accepted = select_split_points(doc, &candidates, &unconditional, settings.min_words);

    let mut strings = Vec::with_capacity(accepted.len() + 1);
    let mut last = 0;
    for idx in accepted {
        strings.push(doc.span_text(last, idx + 1));
        last = idx + 1;
    }
    if last < doc.len() {
        strings.push(doc.span_text(last, doc.len()));
    }

    info!(
        "{} sentence and {} grammatical candidates -> {} boundary strings",
        unconditional.len(),
        grammatical.len(),
        strings.len()
    );

    strings
}

// =============================================================================
// Tests
// =============================================================================
