//! cuecards Error Definitions
//!
//! Defines error types used throughout the engine.

use thiserror::Error;

use super::TimeMs;

/// Core engine error types
#[derive(Error, Debug)]
pub enum CoreError {
    // =========================================================================
    // Caption Errors
    // =========================================================================
    #[error("Malformed caption: {0}")]
    MalformedCaption(String),

    // =========================================================================
    // Timing Errors
    // =========================================================================
    #[error("Invalid time range: {0}~{1} ms")]
    InvalidTimeRange(TimeMs, TimeMs),

    #[error("Segment has no words")]
    EmptySegment,

    // =========================================================================
    // Annotation Errors
    // =========================================================================
    #[error("Invalid annotation: {0}")]
    InvalidAnnotation(String),

    #[error("Annotator failed: {0}")]
    AnnotatorFailed(String),

    #[error(
        "Alignment mismatch at boundary string {index}: expected {expected:?}, found {found:?}"
    )]
    AlignmentMismatch {
        index: usize,
        expected: String,
        found: String,
    },

    // =========================================================================
    // General Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Core engine result type
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment_mismatch_message() {
        let err = CoreError::AlignmentMismatch {
            index: 3,
            expected: "hello world".to_string(),
            found: "hello there".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Alignment mismatch at boundary string 3: expected \"hello world\", found \"hello there\""
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: CoreError = io.into();
        assert!(matches!(err, CoreError::IoError(_)));
    }
}
