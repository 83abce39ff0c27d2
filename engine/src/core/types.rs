//! cuecards Core Type Definitions
//!
//! Defines fundamental types and timing constants used throughout the engine.

use tracing::warn;

// =============================================================================
// Time Types
// =============================================================================

/// Time in milliseconds (signed so inverted spans can be detected, never wrapped)
pub type TimeMs = i64;

/// Upper bound for the duration of a single caption word.
///
/// Caption generators regularly let the last word of a cue inherit the whole
/// remaining cue span; anything longer than this is clamped.
pub const MAX_WORD_DURATION_MS: TimeMs = 2_000;

/// Silence between two words that always starts a new segment
pub const GAP_SPLIT_THRESHOLD_MS: TimeMs = 2_000;

/// Converts milliseconds to floating point seconds
pub fn ms_to_secs(ms: TimeMs) -> f64 {
    ms as f64 / 1000.0
}

/// Converts floating point seconds to whole milliseconds
pub fn secs_to_ms(secs: f64) -> TimeMs {
    if !secs.is_finite() {
        warn!("Non-finite duration {} treated as 0ms", secs);
        return 0;
    }
    (secs * 1000.0).round() as TimeMs
}
