//! Annotator Trait
//!
//! Defines the capability the segmentation pipeline consumes to obtain a
//! linguistic annotation of the caption text. The language model itself lives
//! outside this crate; implementations here are adapters around it.

use crate::core::{CoreError, CoreResult};

use super::AnnotatedDocument;

// =============================================================================
// Annotator Trait
// =============================================================================

/// Produces an annotated document for a piece of text
pub trait Annotator: Send + Sync {
    /// Returns the annotator name (used in logs)
    fn name(&self) -> &str;

    /// Annotates `text`.
    ///
    /// The returned document must reconstruct `text` up to whitespace.
    fn annotate(&self, text: &str) -> CoreResult<AnnotatedDocument>;
}

impl<A: Annotator + ?Sized> Annotator for Box<A> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn annotate(&self, text: &str) -> CoreResult<AnnotatedDocument> {
        (**self).annotate(text)
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Collapses every whitespace run to a single space and trims the ends
pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Checks that `doc` was produced for `text`
pub(crate) fn ensure_document_matches(
    annotator: &str,
    doc: &AnnotatedDocument,
    text: &str,
) -> CoreResult<()> {
    let expected = normalize_whitespace(text);
    let found = normalize_whitespace(&doc.text());
    if expected != found {
        let preview: String = found.chars().take(60).collect();
        return Err(CoreError::AnnotatorFailed(format!(
            "{} returned a document for different text (starts with {:?})",
            annotator, preview
        )));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
