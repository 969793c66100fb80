//! Feature matrix projection
//!
//! Projects a prepared table onto the ordered feature-column list. This is
//! the only stage that enforces column completeness as a hard failure.

use ndarray::Array2;

use crate::error::DetectError;
use crate::table::FeatureTable;

/// Projects tables onto the canonical ordered feature list
pub struct FeatureMatrixBuilder;

impl FeatureMatrixBuilder {
    /// Owned matrix with columns in the given order, one row per table row.
    /// Fails with [`DetectError::MissingColumn`] naming every feature that
    /// resolves to no column after derivation.
    pub fn build(table: &FeatureTable, feature_cols: &[String]) -> Result<Array2<f64>, DetectError> {
        let mut missing = Vec::new();
        let mut resolved = Vec::with_capacity(feature_cols.len());
        for name in feature_cols {
            match table.column(name) {
                Some(col) => resolved.push(col),
                None => missing.push(name.as_str()),
            }
        }
        if !missing.is_empty() {
            return Err(DetectError::MissingColumn(missing.join(", ")));
        }

        let n_rows = table.n_rows();
        let mut matrix = Array2::zeros((n_rows, feature_cols.len()));
        for (j, col) in resolved.iter().enumerate() {
            for (i, &value) in col.iter().enumerate() {
                matrix[[i, j]] = value;
            }
        }
        Ok(matrix)
    }
}
