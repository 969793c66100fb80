//! Mindtrack - per-user behavioral anomaly detection
//!
//! Mindtrack fits an unsupervised outlier baseline on a user's historical
//! digital-wellbeing metrics (screen time, app-usage ratios, sleep, heart
//! rate, mood) and scores new daily entries against it through a
//! deterministic pipeline: column normalization → feature derivation →
//! matrix projection → {baseline training | anomaly scoring}.
//!
//! Training and scoring share one preparation path ([`pipeline::prepare`]),
//! so a single new entry is treated exactly like a batch row. Fitted models
//! persist as one JSON bundle per user and reload bit-identically.
//!
//! ```no_run
//! use mindtrack::{AnomalyScorer, BaselineTrainer, DetectorConfig, NewEntry};
//!
//! # fn main() -> Result<(), mindtrack::DetectError> {
//! let config = DetectorConfig::with_models_dir("models");
//! let dataset = mindtrack::load_dataset("history.csv".as_ref())?;
//! BaselineTrainer::new(config.clone()).train_and_persist(dataset.table, "alice")?;
//!
//! let entry: NewEntry = serde_json::from_str(r#"{"screen_time_min": 500}"#)?;
//! let result = AnomalyScorer::new(config).detect(&entry, "alice")?;
//! println!("anomaly: {}", result.is_anomaly);
//! # Ok(())
//! # }
//! ```

pub mod baseline;
pub mod config;
pub mod detection;
pub mod entry;
pub mod error;
pub mod features;
pub mod feedback;
pub mod forest;
pub mod loader;
pub mod matrix;
pub mod normalizer;
pub mod pipeline;
pub mod scaler;
pub mod store;
pub mod table;

pub use baseline::{BaselineTrainer, UserTrainOutcome};
pub use config::{DetectorConfig, DEFAULT_CONTAMINATION, FEATURE_COLS, RAW_COLS};
pub use detection::{AnomalyScorer, DetectionResult};
pub use entry::{EntryAdapter, NewEntry};
pub use error::DetectError;
pub use features::FeatureDeriver;
pub use feedback::{FeedbackLabel, FeedbackLog};
pub use forest::IsolationForest;
pub use loader::{load_dataset, Dataset};
pub use matrix::FeatureMatrixBuilder;
pub use normalizer::ColumnNormalizer;
pub use scaler::StandardScaler;
pub use store::{BundleMeta, ModelBundle, ModelBundleStore};
pub use table::FeatureTable;

/// Crate version embedded in CLI output
pub const MINDTRACK_VERSION: &str = env!("CARGO_PKG_VERSION");
