//! Detector configuration
//!
//! All tunables flow through [`DetectorConfig`]; there is no process-wide
//! mutable state. Each trainer or scorer call is pure given its config.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Raw per-day counters every input table is normalized to contain.
/// Absent columns are filled with 0 (a neutral value, not an absence marker).
pub const RAW_COLS: [&str; 12] = [
    "screen_time_min",
    "social_media_min",
    "work_related_min",
    "unlock_count",
    "app_usage_var",
    "distinct_locations",
    "steps",
    "sleep_hours",
    "calls_made",
    "calls_missed",
    "avg_heart_rate",
    "mood_score",
];

/// Canonical ordered feature list. The order is the contract between
/// training and scoring; a bundle stores the list it was trained with.
pub const FEATURE_COLS: [&str; 14] = [
    "screen_time_min",
    "unlock_count",
    "app_usage_var",
    "distinct_locations",
    "steps",
    "sleep_hours",
    "calls_made",
    "calls_missed",
    "avg_heart_rate",
    "social_ratio",
    "productivity_ratio",
    "entertainment_ratio",
    "check_leave_ratio",
    "mood_score",
];

/// Expected fraction of outliers in training data
pub const DEFAULT_CONTAMINATION: f64 = 0.05;

/// Seed for the outlier ensemble, fixed for reproducible training
pub const DEFAULT_RANDOM_SEED: u64 = 42;

const DEFAULT_MODELS_DIR: &str = "mindtrack_models";

/// Configuration shared by the trainer and the scorer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Directory holding one bundle artifact per user
    pub models_dir: PathBuf,
    /// Ordered feature columns to train on
    pub feature_cols: Vec<String>,
    /// Expected outlier fraction, in (0, 1)
    pub contamination: f64,
    /// Seed for the outlier ensemble
    pub random_seed: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            feature_cols: FEATURE_COLS.iter().map(|c| c.to_string()).collect(),
            contamination: DEFAULT_CONTAMINATION,
            random_seed: DEFAULT_RANDOM_SEED,
        }
    }
}

impl DetectorConfig {
    /// Config with defaults except for the models directory
    pub fn with_models_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            models_dir: dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Deterministic artifact path for a user's bundle
    pub fn bundle_path(&self, user_id: &str) -> PathBuf {
        bundle_path(&self.models_dir, user_id)
    }
}

/// `{models_dir}/{user_id}_baseline_bundle.json`
pub fn bundle_path(models_dir: &Path, user_id: &str) -> PathBuf {
    models_dir.join(format!("{}_baseline_bundle.json", user_id))
}
