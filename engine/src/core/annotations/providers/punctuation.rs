//! Punctuation Annotator
//!
//! Dependency-free fallback used when no external annotator is configured.
//! It knows nothing about grammar: every token is tagged `X`/`dep`, so only
//! sentence, quote and comma boundaries can fire downstream.

use crate::core::annotations::provider::Annotator;
use crate::core::annotations::{AnnotatedDocument, SentenceSpan, Token};
use crate::core::CoreResult;

/// Punctuation detached from the word it is attached to
const DETACHABLE: &[char] = &['"', ',', '.', '?', '!', ';', ':'];

/// Punctuation that ends a sentence
const TERMINAL: &[char] = &['.', '?', '!'];

/// Whitespace/punctuation tokenizer with naive sentence splitting
#[derive(Clone, Copy, Debug, Default)]
pub struct PunctuationAnnotator;

impl Annotator for PunctuationAnnotator {
    fn name(&self) -> &str {
        "punctuation"
    }

    fn annotate(&self, text: &str) -> CoreResult<AnnotatedDocument> {
        let mut tokens: Vec<Token> = Vec::new();
        let mut sentences: Vec<SentenceSpan> = Vec::new();
        let mut sent_start = 0;

        for word in text.split_whitespace() {
            let pieces = split_punctuation(word);
            let last_piece = pieces.len().saturating_sub(1);

            for (i, piece) in pieces.into_iter().enumerate() {
                tokens.push(
                    Token::new(piece, "X", "dep", sent_start, sentences.len())
                        .with_whitespace(i == last_piece),
                );
            }

            if ends_sentence(word) {
                sentences.push(SentenceSpan::new(sent_start, tokens.len()));
                sent_start = tokens.len();
            }
        }

        if sent_start < tokens.len() {
            sentences.push(SentenceSpan::new(sent_start, tokens.len()));
        }
        if let Some(last) = tokens.last_mut() {
            last.whitespace = false;
        }

        AnnotatedDocument::new(tokens, sentences)
    }
}

/// Splits leading and trailing punctuation into single-character tokens
fn split_punctuation(word: &str) -> Vec<String> {
    let mut rest = word;

    let mut leading = Vec::new();
    while let Some(c) = rest.chars().next().filter(|c| DETACHABLE.contains(c)) {
        leading.push(c.to_string());
        rest = &rest[c.len_utf8()..];
    }

    let mut trailing = Vec::new();
    while let Some(c) = rest.chars().next_back().filter(|c| DETACHABLE.contains(c)) {
        trailing.push(c.to_string());
        rest = &rest[..rest.len() - c.len_utf8()];
    }

    let mut pieces = leading;
    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces.extend(trailing.into_iter().rev());
    pieces
}

/// A word ends a sentence when it ends in `.`/`?`/`!`, ignoring closing quotes
fn ends_sentence(word: &str) -> bool {
    word.trim_end_matches('"').ends_with(TERMINAL)
}
