//! JSON File Annotator
//!
//! Serves a document computed ahead of time by an external tool.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::annotations::provider::{ensure_document_matches, Annotator};
use crate::core::annotations::AnnotatedDocument;
use crate::core::CoreResult;

/// Loads a pre-computed annotation from disk
pub struct JsonFileAnnotator {
    path: PathBuf,
}

impl JsonFileAnnotator {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the annotation file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Annotator for JsonFileAnnotator {
    fn name(&self) -> &str {
        "json-file"
    }

    fn annotate(&self, text: &str) -> CoreResult<AnnotatedDocument> {
        info!("Loading annotations from {}", self.path.display());

        let content = fs::read_to_string(&self.path)?;
        let doc: AnnotatedDocument = serde_json::from_str(&content)?;
        doc.validate()?;
        ensure_document_matches(self.name(), &doc, text)?;

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotations::PunctuationAnnotator;
    use crate::core::CoreError;
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, text: &str) -> PathBuf {
        let doc = PunctuationAnnotator.annotate(text).unwrap();
        let path = dir.path().join("talk.annotations.json");
        fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();
        path
    }

    #[test]
    fn test_loads_matching_document() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "Hello there, friend.");

        let annotator = JsonFileAnnotator::new(&path);
        let doc = annotator.annotate("Hello  there, friend.").unwrap();

        assert_eq!(annotator.path(), path.as_path());
        assert_eq!(doc.len(), 5);
    }

    #[test]
    fn test_rejects_document_for_other_text() {
        let dir = TempDir::new().unwrap();
        let path = write_doc(&dir, "Hello there.");

        let result = JsonFileAnnotator::new(path).annotate("Goodbye there.");
        assert!(matches!(result, Err(CoreError::AnnotatorFailed(_))));
    }

    #[test]
    fn test_missing_and_corrupt_files() {
        let dir = TempDir::new().unwrap();

        let missing = JsonFileAnnotator::new(dir.path().join("nope.json")).annotate("hi");
        assert!(matches!(missing, Err(CoreError::IoError(_))));

        let corrupt_path = dir.path().join("corrupt.json");
        fs::write(&corrupt_path, "{ not json").unwrap();
        let corrupt = JsonFileAnnotator::new(corrupt_path).annotate("hi");
        assert!(matches!(corrupt, Err(CoreError::JsonError(_))));
    }
}
