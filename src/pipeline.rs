//! Pipeline orchestration
//!
//! The one shared preparation path both training and scoring go through.
//! Keeping normalization and derivation behind a single function is what
//! rules out train/serve skew.

use std::path::Path;
use tracing::info;

use crate::baseline::{BaselineTrainer, UserTrainOutcome};
use crate::config::DetectorConfig;
use crate::error::DetectError;
use crate::features::FeatureDeriver;
use crate::loader::load_dataset;
use crate::normalizer::ColumnNormalizer;
use crate::table::FeatureTable;

/// Normalize raw columns, then derive ratio features, in place
pub fn prepare(table: &mut FeatureTable) {
    ColumnNormalizer::normalize(table);
    FeatureDeriver::derive(table);
}

/// Train baselines from a history file.
///
/// When `group_col` names a column of the file, one bundle is trained per
/// distinct value; otherwise the whole file trains a single bundle under
/// `default_user_id`.
pub fn train_from_file(
    path: &Path,
    group_col: Option<&str>,
    default_user_id: &str,
    config: &DetectorConfig,
) -> Result<Vec<UserTrainOutcome>, DetectError> {
    let dataset = load_dataset(path)?;
    let trainer = BaselineTrainer::new(config.clone());

    match group_col {
        Some(col) if dataset.has_column(col) => trainer.train_per_user(&dataset, col),
        _ => {
            info!(user_id = default_user_id, "training single-user baseline");
            let n_rows = dataset.table.n_rows();
            let result = trainer.train_and_persist(dataset.table, default_user_id);
            Ok(vec![UserTrainOutcome {
                user_id: default_user_id.to_string(),
                n_rows,
                result,
            }])
        }
    }
}
