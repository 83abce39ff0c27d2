//! Annotation Store
//!
//! Caches annotated documents per video so the annotator only runs once.
//! Storage: `{dir}/{key}.annotations.json`

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::fs::{atomic_write_json_pretty, validate_path_id_component};
use crate::core::CoreResult;

use super::provider::{normalize_whitespace, Annotator};
use super::AnnotatedDocument;

/// File suffix for cached documents
pub const ANNOTATION_FILE_SUFFIX: &str = ".annotations.json";

// =============================================================================
// Annotation Store
// =============================================================================

/// Manages cached annotation files
pub struct AnnotationStore {
    /// Base directory for annotations
    annotations_dir: PathBuf,
}

impl AnnotationStore {
    /// Creates a store rooted at `annotations_dir`
    pub fn new(annotations_dir: impl Into<PathBuf>) -> Self {
        Self {
            annotations_dir: annotations_dir.into(),
        }
    }

    /// Returns the annotations directory path
    pub fn annotations_dir(&self) -> &Path {
        &self.annotations_dir
    }

    /// Returns the file path for a key's annotation
    pub fn annotation_path(&self, key: &str) -> CoreResult<PathBuf> {
        validate_path_id_component(key, "annotation key")?;
        Ok(self
            .annotations_dir
            .join(format!("{}{}", key.trim(), ANNOTATION_FILE_SUFFIX)))
    }

    /// Checks if an annotation exists for a key
    pub fn exists(&self, key: &str) -> bool {
        self.annotation_path(key)
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Loads the annotation for a key, validating it
    pub fn load(&self, key: &str) -> CoreResult<Option<AnnotatedDocument>> {
        let path = self.annotation_path(key)?;

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        let doc: AnnotatedDocument = serde_json::from_str(&content)?;
        doc.validate()?;

        Ok(Some(doc))
    }

    /// Saves the annotation for a key (atomic write)
    pub fn save(&self, key: &str, doc: &AnnotatedDocument) -> CoreResult<()> {
        let path = self.annotation_path(key)?;
        atomic_write_json_pretty(&path, doc)?;
        debug!("Saved annotation cache {}", path.display());
        Ok(())
    }
}

// =============================================================================
// Cached Annotator
// =============================================================================

/// Wraps an annotator with an on-disk cache keyed by video id
pub struct CachedAnnotator<A> {
    inner: A,
    store: AnnotationStore,
    key: String,
    read_only: bool,
}

impl<A: Annotator> CachedAnnotator<A> {
    pub fn new(inner: A, store: AnnotationStore, key: impl Into<String>) -> Self {
        Self {
            inner,
            store,
            key: key.into(),
            read_only: false,
        }
    }

    /// Serves cached documents but never writes new ones
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

impl<A: Annotator> Annotator for CachedAnnotator<A> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn annotate(&self, text: &str) -> CoreResult<AnnotatedDocument> {
        if let Some(doc) = self.store.load(&self.key)? {
            if normalize_whitespace(&doc.text()) == normalize_whitespace(text) {
                info!("Loading cached annotations for {}", self.key);
                return Ok(doc);
            }
            info!("Cached annotations for {} are stale; re-annotating", self.key);
        }

        let doc = self.inner.annotate(text)?;
        if self.read_only {
            debug!("Read-only cache, {} not saved", self.key);
        } else {
            self.store.save(&self.key, &doc)?;
        }
        Ok(doc)
    }
}

// =============================================================================
// Tests
// =============================================================================
