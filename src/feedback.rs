//! Human feedback capture
//!
//! Append-only log of labeled detection results. Each append is a
//! whole-file read-modify-write of a JSON array; the log is a review
//! artifact, not a core pipeline stage.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::detection::DetectionResult;
use crate::error::DetectError;

/// Reviewer verdict on a flagged entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackLabel {
    TrueAnomaly,
    FalsePositive,
}

/// File-backed feedback log
#[derive(Debug, Clone)]
pub struct FeedbackLog {
    path: PathBuf,
}

impl FeedbackLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Append a labeled result, creating the log file on first use
    pub fn append(
        &self,
        mut result: DetectionResult,
        label: FeedbackLabel,
    ) -> Result<(), DetectError> {
        result.user_feedback = Some(label);
        let mut entries = self.entries()?;
        entries.push(result);
        let json = serde_json::to_string_pretty(&entries)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// All logged results, oldest first
    pub fn entries(&self) -> Result<Vec<DetectionResult>, DetectError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
