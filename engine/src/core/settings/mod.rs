//! Segmenter Settings
//!
//! Provides persistent segmentation settings with:
//! - Atomic file writes (temp file + rename)
//! - Schema defaults for every missing field
//! - Tolerant normalization of out-of-range values
//!
//! Storage: any JSON file, camelCase keys, all optional.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::fs::{atomic_write_json_pretty, with_file_lock};
use crate::core::{CoreError, CoreResult, TimeMs};

/// Settings schema version for migration support
pub const SETTINGS_VERSION: u32 = 1;

/// Default settings file name
pub const SETTINGS_FILE: &str = "cuecards.settings.json";

// =============================================================================
// Enumerations
// =============================================================================

/// Optional temporal split passes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CutMethod {
    /// Balanced split at the comma nearest the temporal midpoint
    Comma,
    /// Split at the longest pause between word starts
    Pause,
}

/// Linguistic boundary rule groups
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryKind {
    /// Sentence ends and quoted spans
    Sentence,
    /// Subordinators, clause-level coordination and commas
    Grammar,
}

/// How boundary strings are matched back onto timed words
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentDiscipline {
    /// Exact word-count consumption; mismatch aborts the run
    Exact,
    /// Grow a candidate until it contains the string; drift is dropped
    #[default]
    Growth,
}

impl FromStr for CutMethod {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "comma" => Ok(Self::Comma),
            "pause" => Ok(Self::Pause),
            other => Err(CoreError::ValidationError(format!(
                "Unknown cut method: {}",
                other
            ))),
        }
    }
}

impl FromStr for BoundaryKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sentence" => Ok(Self::Sentence),
            "grammar" => Ok(Self::Grammar),
            other => Err(CoreError::ValidationError(format!(
                "Unknown boundary kind: {}",
                other
            ))),
        }
    }
}

/// Parses a comma-separated list such as `"comma,pause"`; empty items are ignored
pub fn parse_list<T>(value: &str) -> CoreResult<Vec<T>>
where
    T: FromStr<Err = CoreError>,
{
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(T::from_str)
        .collect()
}

// =============================================================================
// Segmenter Settings
// =============================================================================

/// Tunables for one segmentation run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SegmenterSettings {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Minimum words on each side of a grammatical or temporal cut
    #[serde(default = "default_min_words")]
    pub min_words: usize,

    /// Segments shorter than this are never split by pause/comma
    #[serde(default = "default_max_duration_ms")]
    pub max_duration_ms: TimeMs,

    /// Start padding applied to every segment
    #[serde(default = "default_margin_start_ms")]
    pub margin_start_ms: TimeMs,

    /// End padding applied to every segment but the last
    #[serde(default = "default_margin_end_ms")]
    pub margin_end_ms: TimeMs,

    /// Enabled temporal split passes
    #[serde(default = "default_cut")]
    pub cut: Vec<CutMethod>,

    /// Enabled linguistic boundary groups
    #[serde(default = "default_boundaries")]
    pub boundaries: Vec<BoundaryKind>,

    /// Keep repeated sentences instead of deduplicating
    #[serde(default)]
    pub keep_duplicates: bool,

    /// Boundary alignment discipline
    #[serde(default)]
    pub alignment: AlignmentDiscipline,
}

fn default_version() -> u32 {
    SETTINGS_VERSION
}

fn default_min_words() -> usize {
    8
}

fn default_max_duration_ms() -> TimeMs {
    12_000
}

fn default_margin_start_ms() -> TimeMs {
    100
}

fn default_margin_end_ms() -> TimeMs {
    25
}

fn default_cut() -> Vec<CutMethod> {
    vec![CutMethod::Comma, CutMethod::Pause]
}

fn default_boundaries() -> Vec<BoundaryKind> {
    vec![BoundaryKind::Sentence, BoundaryKind::Grammar]
}

impl Default for SegmenterSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            min_words: default_min_words(),
            max_duration_ms: default_max_duration_ms(),
            margin_start_ms: default_margin_start_ms(),
            margin_end_ms: default_margin_end_ms(),
            cut: default_cut(),
            boundaries: default_boundaries(),
            keep_duplicates: false,
            alignment: AlignmentDiscipline::default(),
        }
    }
}

impl SegmenterSettings {
    /// Normalizes and clamps settings so persisted state is always valid.
    ///
    /// Bad values are corrected instead of rejected.
    pub fn normalize(&mut self) {
        self.version = SETTINGS_VERSION;
        self.min_words = self.min_words.clamp(1, 1_000);
        self.max_duration_ms = self.max_duration_ms.clamp(1, 3_600_000);
        self.margin_start_ms = self.margin_start_ms.clamp(0, 10_000);
        self.margin_end_ms = self.margin_end_ms.clamp(0, 10_000);
        dedup_in_order(&mut self.cut);
        dedup_in_order(&mut self.boundaries);
    }

    /// Whether a temporal split pass is enabled
    pub fn cuts_by(&self, method: CutMethod) -> bool {
        self.cut.contains(&method)
    }

    /// Whether a boundary rule group is enabled
    pub fn splits_at(&self, kind: BoundaryKind) -> bool {
        self.boundaries.contains(&kind)
    }
}

fn dedup_in_order<T: PartialEq + Copy>(items: &mut Vec<T>) {
    let mut seen: Vec<T> = Vec::with_capacity(items.len());
    items.retain(|item| {
        if seen.contains(item) {
            false
        } else {
            seen.push(*item);
            true
        }
    });
}

// =============================================================================
// Settings Manager
// =============================================================================

/// Settings manager for loading, saving, and resetting settings
pub struct SettingsManager {
    settings_path: PathBuf,
}

impl SettingsManager {
    /// Create a settings manager for an explicit settings file
    pub fn new(settings_path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: settings_path.into(),
        }
    }

    /// Create a settings manager using the default file name inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(SETTINGS_FILE))
    }

    /// Get the settings file path
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, returning defaults if the file is missing or unreadable
    pub fn load(&self) -> SegmenterSettings {
        let result = with_file_lock(&self.settings_path, false, || {
            if !self.settings_path.exists() {
                warn!(
                    "Settings file {} not found, using defaults",
                    self.settings_path.display()
                );
                return Ok(SegmenterSettings::default());
            }

            let content = fs::read_to_string(&self.settings_path)?;
            let mut settings = serde_json::from_str::<SegmenterSettings>(&content)?;

            if settings.version < SETTINGS_VERSION {
                info!(
                    "Migrating settings from version {} to {}",
                    settings.version, SETTINGS_VERSION
                );
            }

            settings.normalize();
            Ok(settings)
        });

        match result {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Failed to load settings, using defaults: {}", e);
                SegmenterSettings::default()
            }
        }
    }

    /// Save settings to disk using atomic write (temp file + rename)
    pub fn save(&self, settings: &SegmenterSettings) -> CoreResult<SegmenterSettings> {
        with_file_lock(&self.settings_path, true, || {
            let mut normalized = settings.clone();
            normalized.normalize();

            atomic_write_json_pretty(&self.settings_path, &normalized)?;

            info!("Settings saved to {}", self.settings_path.display());
            Ok(normalized)
        })
    }

    /// Reset settings to defaults and delete the settings file
    pub fn reset(&self) -> CoreResult<SegmenterSettings> {
        with_file_lock(&self.settings_path, true, || {
            if self.settings_path.exists() {
                fs::remove_file(&self.settings_path)?;
                info!("Settings file deleted");
            }
            Ok(SegmenterSettings::default())
        })
    }
}
