//! Linguistic Annotation
//!
//! Provider-agnostic access to a natural-language annotator.
//!
//! ## Architecture
//!
//! - **Default**: punctuation fallback (no model, sentence and comma cuts only)
//! - **Pre-computed**: JSON document produced by an external tool
//! - **External command**: text on stdin, JSON document on stdout
//!
//! Documents can be cached per video:
//! `{cache_dir}/{video_id}.annotations.json`

pub mod models;
pub mod provider;
pub mod providers;
pub mod store;

pub use models::*;
pub use provider::Annotator;
pub use providers::{CommandAnnotator, JsonFileAnnotator, PunctuationAnnotator};
pub use store::{AnnotationStore, CachedAnnotator};
