//! Anomaly scoring
//!
//! Scores one new entry against a user's persisted baseline. The entry is
//! wrapped as a one-row table and pushed through the exact batch pipeline
//! (normalize → derive → project), so a single entry can never diverge from
//! how training data was treated.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::entry::{EntryAdapter, NewEntry};
use crate::error::DetectError;
use crate::feedback::FeedbackLabel;
use crate::forest::OUTLIER_LABEL;
use crate::matrix::FeatureMatrixBuilder;
use crate::pipeline;
use crate::store::ModelBundleStore;

/// The scored entry: the original record's fields plus the classification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Original new-entry fields, echoed back untouched
    #[serde(flatten)]
    pub record: IndexMap<String, Value>,
    /// True iff the model labeled this point an outlier
    pub is_anomaly: bool,
    /// Signed decision score; negative values classify as anomalies
    pub decision_score: f64,
    /// Human feedback, appended by the feedback collector after the fact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_feedback: Option<FeedbackLabel>,
}

/// Scores new entries against persisted per-user baselines
#[derive(Debug, Clone)]
pub struct AnomalyScorer {
    config: DetectorConfig,
}

impl AnomalyScorer {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Classify one entry against the user's baseline bundle.
    ///
    /// The projection uses the feature list stored in the bundle, not the
    /// configured default, so a bundle trained before a canonical-list
    /// change still scores consistently. Failures (missing bundle, missing
    /// column) surface to the caller unmodified.
    pub fn detect(&self, entry: &NewEntry, user_id: &str) -> Result<DetectionResult, DetectError> {
        let bundle = ModelBundleStore::new(&self.config.models_dir).load(user_id)?;

        let mut table = EntryAdapter::to_table(entry);
        pipeline::prepare(&mut table);
        let x = FeatureMatrixBuilder::build(&table, &bundle.meta.feature_cols)?;

        let xs = bundle.scaler.transform(&x)?;
        let label = bundle.model.predict(&xs)[0];
        let decision_score = bundle.model.decision_function(&xs)[0];
        debug!(user_id, label, decision_score, "scored entry");

        Ok(DetectionResult {
            record: entry.record(),
            is_anomaly: label == OUTLIER_LABEL,
            decision_score,
            user_feedback: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::baseline::BaselineTrainer;
    use crate::table::FeatureTable;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tempfile::tempdir;

    /// Moderate, mildly varying days: the "normal" baseline
    fn normal_table(rows: usize) -> FeatureTable {
        let screen: Vec<f64> = (0..rows).map(|i| 280.0 + ((i * 17) % 60) as f64).collect();
        let unlocks: Vec<f64> = (0..rows).map(|i| 60.0 + ((i * 11) % 25) as f64).collect();
        let sleep: Vec<f64> = (0..rows).map(|i| 6.8 + ((i * 5) % 12) as f64 / 10.0).collect();
        let steps: Vec<f64> = (0..rows).map(|i| 7500.0 + ((i * 41) % 1200) as f64).collect();
        let heart: Vec<f64> = (0..rows).map(|i| 68.0 + ((i * 7) % 9) as f64).collect();
        let mood: Vec<f64> = (0..rows).map(|i| 3.0 + ((i * 3) % 3) as f64 * 0.5).collect();
        let social: Vec<f64> = (0..rows).map(|i| 40.0 + ((i * 13) % 20) as f64).collect();
        let productivity: Vec<f64> = (0..rows).map(|i| 80.0 + ((i * 19) % 30) as f64).collect();
        let entertainment: Vec<f64> = (0..rows).map(|i| 30.0 + ((i * 23) % 15) as f64).collect();
        FeatureTable::from_columns(vec![
            ("screen_time_min", screen),
            ("unlock_count", unlocks),
            ("sleep_hours", sleep),
            ("steps", steps),
            ("avg_heart_rate", heart),
            ("mood_score", mood),
            ("social_usage", social),
            ("productivity_usage", productivity),
            ("entertainment_usage", entertainment),
        ])
        .unwrap()
    }

    #[test]
    fn extreme_entry_is_flagged_as_anomaly() {
        let dir = tempdir().unwrap();
        let config = DetectorConfig::with_models_dir(dir.path());
        BaselineTrainer::new(config.clone())
            .train_and_persist(normal_table(120), "alice")
            .unwrap();

        // All-day screen time, rock-bottom mood, everything else at zero.
        let entry: NewEntry = serde_json::from_value(json!({
            "feature_values": {
                "screen_time_min": 500,
                "mood_score": 1,
                "unlock_count": 0,
                "app_usage_var": 0,
                "distinct_locations": 0,
                "steps": 0,
                "sleep_hours": 0,
                "calls_made": 0,
                "calls_missed": 0,
                "avg_heart_rate": 0
            }
        }))
        .unwrap();

        let result = AnomalyScorer::new(config).detect(&entry, "alice").unwrap();
        assert!(result.is_anomaly);
        assert!(result.decision_score < 0.0);
    }

    #[test]
    fn typical_entry_is_not_flagged() {
        let dir = tempdir().unwrap();
        let config = DetectorConfig::with_models_dir(dir.path());
        BaselineTrainer::new(config.clone())
            .train_and_persist(normal_table(120), "alice")
            .unwrap();

        let entry: NewEntry = serde_json::from_value(json!({
            "feature_values": {
                "screen_time_min": 300,
                "unlock_count": 70,
                "sleep_hours": 7.2,
                "steps": 8000,
                "avg_heart_rate": 70,
                "mood_score": 3.5,
                "social_usage": 45,
                "productivity_usage": 90,
                "entertainment_usage": 35
            }
        }))
        .unwrap();

        let result = AnomalyScorer::new(config).detect(&entry, "alice").unwrap();
        assert!(!result.is_anomaly);
    }

    #[test]
    fn missing_bundle_propagates_with_user_id() {
        let dir = tempdir().unwrap();
        let config = DetectorConfig::with_models_dir(dir.path());
        let entry: NewEntry = serde_json::from_value(json!({"screen_time_min": 100})).unwrap();

        let err = AnomalyScorer::new(config.clone())
            .detect(&entry, "ghost-user")
            .unwrap_err();
        match err {
            DetectError::BundleNotFound { user_id, path } => {
                assert_eq!(user_id, "ghost-user");
                assert_eq!(path, config.bundle_path("ghost-user"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn scoring_uses_the_bundles_stored_feature_list() {
        let dir = tempdir().unwrap();
        // Train with a reduced two-feature list.
        let config = DetectorConfig {
            feature_cols: vec!["screen_time_min".to_string(), "mood_score".to_string()],
            ..DetectorConfig::with_models_dir(dir.path())
        };
        BaselineTrainer::new(config)
            .train_and_persist(normal_table(60), "alice")
            .unwrap();

        // Score with the (wider) default config: the stored list must win,
        // so a sparse entry still resolves after normalization.
        let score_config = DetectorConfig::with_models_dir(dir.path());
        let entry: NewEntry =
            serde_json::from_value(json!({"screen_time_min": 290, "mood_score": 3})).unwrap();
        let result = AnomalyScorer::new(score_config)
            .detect(&entry, "alice")
            .unwrap();
        assert!(!result.is_anomaly);
    }

    #[test]
    fn result_serializes_with_flattened_record() {
        let record: IndexMap<String, Value> =
            [("screen_time_min".to_string(), json!(120))].into_iter().collect();
        let result = DetectionResult {
            record,
            is_anomaly: true,
            decision_score: -0.03,
            user_feedback: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["screen_time_min"], json!(120));
        assert_eq!(value["is_anomaly"], json!(true));
        assert!(value.get("user_feedback").is_none());
    }
}
