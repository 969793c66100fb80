//! Model bundle persistence
//!
//! One JSON artifact per user under the models directory. A bundle is
//! immutable after creation; retraining replaces the artifact wholesale.
//! JSON floats are written in shortest-round-trip form, so a reloaded
//! bundle scores identically to the in-memory one.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::bundle_path;
use crate::error::DetectError;
use crate::forest::IsolationForest;
use crate::scaler::StandardScaler;

/// Training metadata persisted alongside the fitted parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BundleMeta {
    /// Ordered feature list the model was trained with. Scoring projects
    /// onto this list, not a freshly-defaulted one, to rule out skew if the
    /// canonical list evolves after training.
    pub feature_cols: Vec<String>,
    /// Per-feature mean of the unscaled training matrix
    pub mean: IndexMap<String, f64>,
    /// Per-feature population std (ddof=0) of the unscaled training matrix
    pub std: IndexMap<String, f64>,
    /// Number of training rows
    pub n_samples: usize,
    /// Provenance: unique id of this training run
    pub bundle_id: Uuid,
    /// Provenance: when the bundle was created
    pub trained_at: DateTime<Utc>,
}

/// A persistable {scaler, model, metadata} bundle for one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub scaler: StandardScaler,
    pub model: IsolationForest,
    pub meta: BundleMeta,
}

/// Filesystem-backed bundle store keyed by user identity
#[derive(Debug, Clone)]
pub struct ModelBundleStore {
    models_dir: PathBuf,
}

impl ModelBundleStore {
    pub fn new<P: AsRef<Path>>(models_dir: P) -> Self {
        Self {
            models_dir: models_dir.as_ref().to_path_buf(),
        }
    }

    /// Artifact path for a user
    pub fn path_for(&self, user_id: &str) -> PathBuf {
        bundle_path(&self.models_dir, user_id)
    }

    /// Write the bundle, creating the models directory if absent and
    /// overwriting any existing artifact for the user (last writer wins).
    pub fn persist(&self, bundle: &ModelBundle, user_id: &str) -> Result<PathBuf, DetectError> {
        fs::create_dir_all(&self.models_dir)?;
        let path = self.path_for(user_id);
        let json = serde_json::to_string(bundle)?;
        fs::write(&path, json)?;
        info!(
            user_id,
            path = %path.display(),
            n_samples = bundle.meta.n_samples,
            "saved baseline bundle"
        );
        Ok(path)
    }

    /// Load a user's bundle, failing with [`DetectError::BundleNotFound`]
    /// when no artifact exists at the expected path.
    pub fn load(&self, user_id: &str) -> Result<ModelBundle, DetectError> {
        let path = self.path_for(user_id);
        if !path.exists() {
            return Err(DetectError::BundleNotFound {
                user_id: user_id.to_string(),
                path,
            });
        }
        let json = fs::read_to_string(&path)?;
        let bundle = serde_json::from_str(&json)?;
        debug!(user_id, path = %path.display(), "loaded baseline bundle");
        Ok(bundle)
    }
}
