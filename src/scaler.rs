//! Per-feature standardizing scaler
//!
//! Zero mean, unit variance per column, population (ddof=0) statistics.
//! Fitted parameters serialize with the bundle so scoring standardizes new
//! entries with the exact training-time parameters.

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::DetectError;

/// Fitted standardization parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    /// Fit per-column mean and scale. Zero-variance columns get scale 1.0 so
    /// they standardize to 0 instead of NaN.
    pub fn fit(x: &Array2<f64>) -> Self {
        let n_rows = x.nrows().max(1) as f64;
        let mut mean = Vec::with_capacity(x.ncols());
        let mut scale = Vec::with_capacity(x.ncols());

        for col in x.columns() {
            let m = col.sum() / n_rows;
            let var = col.iter().map(|v| (v - m).powi(2)).sum::<f64>() / n_rows;
            let s = var.sqrt();
            mean.push(m);
            scale.push(if s == 0.0 { 1.0 } else { s });
        }

        Self { mean, scale }
    }

    /// Standardize a matrix with the fitted parameters
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>, DetectError> {
        if x.ncols() != self.mean.len() {
            return Err(DetectError::ShapeMismatch {
                expected: self.mean.len(),
                actual: x.ncols(),
            });
        }
        Ok(self.apply(x))
    }

    /// Fit and transform in one step
    pub fn fit_transform(x: &Array2<f64>) -> (Self, Array2<f64>) {
        let scaler = Self::fit(x);
        let transformed = scaler.apply(x);
        (scaler, transformed)
    }

    fn apply(&self, x: &Array2<f64>) -> Array2<f64> {
        let mut out = x.clone();
        for (j, mut col) in out.columns_mut().into_iter().enumerate() {
            col.mapv_inplace(|v| (v - self.mean[j]) / self.scale[j]);
        }
        out
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }
}
