//! Baseline training
//!
//! Fits a per-user outlier baseline: the raw table is normalized, derived,
//! and projected onto the feature list, then a standardizing scaler and a
//! seeded isolation forest are fitted. The result is a persistable
//! [`ModelBundle`] carrying everything scoring needs.

use chrono::Utc;
use indexmap::IndexMap;
use ndarray::Array2;
use std::path::PathBuf;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::DetectorConfig;
use crate::error::DetectError;
use crate::forest::IsolationForest;
use crate::loader::Dataset;
use crate::matrix::FeatureMatrixBuilder;
use crate::pipeline;
use crate::scaler::StandardScaler;
use crate::store::{BundleMeta, ModelBundle, ModelBundleStore};
use crate::table::FeatureTable;

/// Outcome of training one group in multi-user mode
#[derive(Debug)]
pub struct UserTrainOutcome {
    pub user_id: String,
    pub n_rows: usize,
    pub result: Result<PathBuf, DetectError>,
}

/// Trains per-user baselines from raw tables
#[derive(Debug, Clone)]
pub struct BaselineTrainer {
    config: DetectorConfig,
}

impl BaselineTrainer {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Fit a bundle on one user's raw table. The only failure mode is an
    /// unresolvable feature column; tables with fewer rows than features
    /// are not guarded and may yield a degenerate model.
    pub fn train(&self, mut table: FeatureTable) -> Result<ModelBundle, DetectError> {
        pipeline::prepare(&mut table);
        let x = FeatureMatrixBuilder::build(&table, &self.config.feature_cols)?;

        let (scaler, xs) = StandardScaler::fit_transform(&x);
        let model = IsolationForest::fit(&xs, self.config.contamination, self.config.random_seed);

        let meta = BundleMeta {
            feature_cols: self.config.feature_cols.clone(),
            mean: column_stats(&x, &self.config.feature_cols, Stat::Mean),
            std: column_stats(&x, &self.config.feature_cols, Stat::Std),
            n_samples: x.nrows(),
            bundle_id: Uuid::new_v4(),
            trained_at: Utc::now(),
        };

        Ok(ModelBundle {
            scaler,
            model,
            meta,
        })
    }

    /// Train and persist a bundle for one user, returning the artifact path
    pub fn train_and_persist(
        &self,
        table: FeatureTable,
        user_id: &str,
    ) -> Result<PathBuf, DetectError> {
        let n_rows = table.n_rows();
        let bundle = self.train(table)?;
        let path = ModelBundleStore::new(&self.config.models_dir).persist(&bundle, user_id)?;
        info!(user_id, n_rows, "trained baseline");
        Ok(path)
    }

    /// Train one independent bundle per value of the grouping column,
    /// sequentially. A failure in one group never aborts the others; every
    /// outcome is collected and returned.
    pub fn train_per_user(
        &self,
        dataset: &Dataset,
        group_col: &str,
    ) -> Result<Vec<UserTrainOutcome>, DetectError> {
        let labels = dataset
            .group_labels(group_col)
            .ok_or_else(|| DetectError::MissingColumn(group_col.to_string()))?;

        let mut groups: IndexMap<String, Vec<usize>> = IndexMap::new();
        for (row, label) in labels.into_iter().enumerate() {
            groups.entry(label).or_default().push(row);
        }

        let mut outcomes = Vec::with_capacity(groups.len());
        for (user_id, rows) in groups {
            let subtable = dataset.table.select_rows(&rows);
            let result = self.train_and_persist(subtable, &user_id);
            if let Err(err) = &result {
                warn!(user_id = %user_id, %err, "baseline training failed for group");
            }
            outcomes.push(UserTrainOutcome {
                user_id,
                n_rows: rows.len(),
                result,
            });
        }
        Ok(outcomes)
    }
}

enum Stat {
    Mean,
    Std,
}

/// Per-feature statistic of the unscaled matrix, ddof=0, keyed by name
fn column_stats(x: &Array2<f64>, feature_cols: &[String], stat: Stat) -> IndexMap<String, f64> {
    let n = x.nrows().max(1) as f64;
    feature_cols
        .iter()
        .zip(x.columns())
        .map(|(name, col)| {
            let mean = col.sum() / n;
            let value = match stat {
                Stat::Mean => mean,
                Stat::Std => {
                    (col.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt()
                }
            };
            (name.clone(), value)
        })
        .collect()
}
