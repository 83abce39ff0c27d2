//! Annotation Data Models
//!
//! A linguistic annotation of the joined caption text: a flat token stream
//! with part-of-speech tags, dependency labels and sentence membership.
//! Documents come from external annotators, so they are untrusted until
//! [`AnnotatedDocument::validate`] has run.

use serde::{Deserialize, Serialize};

use crate::core::{CoreError, CoreResult};

// =============================================================================
// Token
// =============================================================================

/// A single annotator token
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    /// Surface text
    pub text: String,
    /// Whether the token is followed by whitespace in the source text
    #[serde(default = "default_true")]
    pub whitespace: bool,
    /// Universal POS tag (e.g. "VERB", "NOUN")
    #[serde(default)]
    pub pos: String,
    /// Dependency label (e.g. "mark", "cc", "ROOT")
    #[serde(default)]
    pub dep: String,
    /// Index of the governing token; a root governs itself
    pub head: usize,
    /// Index of the enclosing sentence
    pub sent: usize,
}

fn default_true() -> bool {
    true
}

impl Token {
    /// Creates a token followed by whitespace
    pub fn new(
        text: impl Into<String>,
        pos: impl Into<String>,
        dep: impl Into<String>,
        head: usize,
        sent: usize,
    ) -> Self {
        Self {
            text: text.into(),
            whitespace: true,
            pos: pos.into(),
            dep: dep.into(),
            head,
            sent,
        }
    }

    /// Sets the trailing-whitespace flag
    pub fn with_whitespace(mut self, whitespace: bool) -> Self {
        self.whitespace = whitespace;
        self
    }
}

// =============================================================================
// Sentence Span
// =============================================================================

/// Half-open token range `[start, end)` of one sentence
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceSpan {
    pub start: usize,
    pub end: usize,
}

impl SentenceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// Annotated Document
// =============================================================================

/// Token stream plus sentence segmentation
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotatedDocument {
    pub tokens: Vec<Token>,
    pub sentences: Vec<SentenceSpan>,
}

impl AnnotatedDocument {
    /// Creates a document and validates it
    pub fn new(tokens: Vec<Token>, sentences: Vec<SentenceSpan>) -> CoreResult<Self> {
        let doc = Self { tokens, sentences };
        doc.validate()?;
        Ok(doc)
    }

    /// Number of tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if there are no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Checks structural consistency.
    ///
    /// Sentences must tile the token stream in order without gaps, every head
    /// must point at a token in the same document, and every token's `sent`
    /// must name the sentence that contains it.
    pub fn validate(&self) -> CoreResult<()> {
        let mut expected_start = 0;
        for (index, span) in self.sentences.iter().enumerate() {
            if span.start != expected_start || span.is_empty() {
                return Err(CoreError::InvalidAnnotation(format!(
                    "Sentence {} spans {}..{} but should start at {} and be non-empty",
                    index, span.start, span.end, expected_start
                )));
            }
            expected_start = span.end;
        }
        if expected_start != self.tokens.len() {
            return Err(CoreError::InvalidAnnotation(format!(
                "Sentences cover {} of {} tokens",
                expected_start,
                self.tokens.len()
            )));
        }

        for (index, token) in self.tokens.iter().enumerate() {
            if token.head >= self.tokens.len() {
                return Err(CoreError::InvalidAnnotation(format!(
                    "Token {} ({:?}) has head {} out of range",
                    index, token.text, token.head
                )));
            }
            let span = self.sentences.get(token.sent).ok_or_else(|| {
                CoreError::InvalidAnnotation(format!(
                    "Token {} ({:?}) has sentence {} out of range",
                    index, token.text, token.sent
                ))
            })?;
            if !(span.start..span.end).contains(&index) {
                return Err(CoreError::InvalidAnnotation(format!(
                    "Token {} ({:?}) lies outside its sentence {}",
                    index, token.text, token.sent
                )));
            }
        }

        Ok(())
    }

    /// Text of tokens `[start, end)`, without trailing whitespace
    pub fn span_text(&self, start: usize, end: usize) -> String {
        let end = end.min(self.tokens.len());
        if start >= end {
            return String::new();
        }

        let mut text = String::new();
        for (offset, token) in self.tokens[start..end].iter().enumerate() {
            text.push_str(&token.text);
            if token.whitespace && start + offset + 1 < end {
                text.push(' ');
            }
        }
        text
    }

    /// Full document text
    pub fn text(&self) -> String {
        self.span_text(0, self.tokens.len())
    }

    /// Text of every sentence, in order
    pub fn sentence_texts(&self) -> Vec<String> {
        self.sentences
            .iter()
            .map(|span| self.span_text(span.start, span.end))
            .collect()
    }

    /// Sentence span containing token `index`
    pub fn sentence_of(&self, index: usize) -> Option<&SentenceSpan> {
        self.tokens
            .get(index)
            .and_then(|token| self.sentences.get(token.sent))
    }

    /// Indices of tokens governed by `index` (excluding itself)
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter(move |(i, token)| token.head == index && *i != index)
            .map(|(i, _)| i)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    /// "Hi, you. Bye." with one sentence per clause
    fn sample_doc() -> AnnotatedDocument {
        AnnotatedDocument::new(
            vec![
                Token::new("Hi", "INTJ", "ROOT", 0, 0).with_whitespace(false),
                Token::new(",", "PUNCT", "punct", 0, 0),
                Token::new("you", "PRON", "npadvmod", 0, 0).with_whitespace(false),
                Token::new(".", "PUNCT", "punct", 0, 0),
                Token::new("Bye", "INTJ", "ROOT", 4, 1).with_whitespace(false),
                Token::new(".", "PUNCT", "punct", 4, 1).with_whitespace(false),
            ],
            vec![SentenceSpan::new(0, 4), SentenceSpan::new(4, 6)],
        )
        .unwrap()
    }

    #[test]
    fn test_text_reconstruction() {
        let doc = sample_doc();
        assert_eq!(doc.text(), "Hi, you. Bye.");
        assert_eq!(doc.sentence_texts(), vec!["Hi, you.", "Bye."]);
        assert_eq!(doc.span_text(2, 4), "you.");
        assert_eq!(doc.span_text(4, 99), "Bye.");
        assert_eq!(doc.span_text(3, 3), "");
    }

    #[test]
    fn test_span_text_drops_trailing_whitespace() {
        let doc = sample_doc();
        // Token 1 (",") is followed by whitespace but ends the span
        assert_eq!(doc.span_text(0, 2), "Hi,");
    }

    #[test]
    fn test_sentence_of_and_children() {
        let doc = sample_doc();
        assert_eq!(doc.sentence_of(5), Some(&SentenceSpan::new(4, 6)));
        assert_eq!(doc.sentence_of(6), None);
        assert_eq!(doc.children(0).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(doc.children(5).count(), 0);
    }

    #[test]
    fn test_validate_rejects_head_out_of_range() {
        let result = AnnotatedDocument::new(
            vec![Token::new("hi", "INTJ", "ROOT", 3, 0)],
            vec![SentenceSpan::new(0, 1)],
        );
        assert!(matches!(result, Err(CoreError::InvalidAnnotation(_))));
    }

    #[test]
    fn test_validate_rejects_gaps_and_bad_sentence_index() {
        let tokens = vec![
            Token::new("a", "X", "dep", 0, 0),
            Token::new("b", "X", "dep", 1, 1),
        ];

        let gap = AnnotatedDocument::new(tokens.clone(), vec![SentenceSpan::new(0, 1)]);
        assert!(gap.is_err());

        let overlap = AnnotatedDocument::new(
            tokens.clone(),
            vec![SentenceSpan::new(0, 2), SentenceSpan::new(1, 2)],
        );
        assert!(overlap.is_err());

        let wrong_sent = AnnotatedDocument::new(
            vec![
                Token::new("a", "X", "dep", 0, 1),
                Token::new("b", "X", "dep", 1, 1),
            ],
            vec![SentenceSpan::new(0, 1), SentenceSpan::new(1, 2)],
        );
        assert!(wrong_sent.is_err());
    }

    #[test]
    fn test_empty_document_is_valid() {
        let doc = AnnotatedDocument::new(vec![], vec![]).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.text(), "");
        assert!(doc.sentence_texts().is_empty());
    }

    #[test]
    fn test_token_deserialize_defaults() {
        let token: Token = serde_json::from_str(r#"{"text":"hi","head":0,"sent":0}"#).unwrap();
        assert!(token.whitespace);
        assert_eq!(token.pos, "");
        assert_eq!(token.dep, "");
    }
}
