//! Dataset loading
//!
//! Loads tabular history files by extension: `.csv` for comma-separated
//! data, `.json` for arrays of flat records. Columns whose every non-empty
//! cell parses as a number become table columns; everything else (user ids,
//! free-text notes) is kept as a text column so it can serve as a grouping
//! key for multi-user training.

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::DetectError;
use crate::table::FeatureTable;

/// A loaded dataset: numeric columns plus side-band text columns
#[derive(Debug, Clone)]
pub struct Dataset {
    pub table: FeatureTable,
    pub text_cols: IndexMap<String, Vec<String>>,
}

impl Dataset {
    /// Per-row grouping labels for a column, whether text or numeric
    pub fn group_labels(&self, col: &str) -> Option<Vec<String>> {
        if let Some(values) = self.text_cols.get(col) {
            return Some(values.clone());
        }
        self.table
            .column(col)
            .map(|values| values.iter().map(|v| v.to_string()).collect())
    }

    pub fn has_column(&self, col: &str) -> bool {
        self.table.has_column(col) || self.text_cols.contains_key(col)
    }
}

/// Load a dataset from a path, dispatching on the file extension
pub fn load_dataset(path: &Path) -> Result<Dataset, DetectError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    let dataset = match ext.as_deref() {
        Some("csv") => load_csv(path)?,
        Some("json") => load_json(path)?,
        _ => return Err(DetectError::UnsupportedFileType(path.to_path_buf())),
    };
    debug!(
        path = %path.display(),
        rows = dataset.table.n_rows(),
        numeric_cols = dataset.table.n_cols(),
        text_cols = dataset.text_cols.len(),
        "loaded dataset"
    );
    Ok(dataset)
}

fn load_csv(path: &Path) -> Result<Dataset, DetectError> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (j, cell) in record.iter().enumerate() {
            if j < cells.len() {
                cells[j].push(cell.trim().to_string());
            }
        }
    }

    build_dataset(headers, cells)
}

fn load_json(path: &Path) -> Result<Dataset, DetectError> {
    let raw = fs::read_to_string(path)?;
    let records: Vec<IndexMap<String, Value>> = serde_json::from_str(&raw)?;

    // Column order follows first appearance across records.
    let mut headers: Vec<String> = Vec::new();
    for record in &records {
        for key in record.keys() {
            if !headers.iter().any(|h| h == key) {
                headers.push(key.clone());
            }
        }
    }

    let cells = headers
        .iter()
        .map(|name| {
            records
                .iter()
                .map(|record| match record.get(name) {
                    Some(Value::String(s)) => s.clone(),
                    Some(Value::Null) | None => String::new(),
                    Some(other) => other.to_string(),
                })
                .collect()
        })
        .collect();

    build_dataset(headers, cells)
}

/// Split string columns into numeric table columns and text columns.
/// Empty cells in an otherwise numeric column read as 0.
fn build_dataset(headers: Vec<String>, cells: Vec<Vec<String>>) -> Result<Dataset, DetectError> {
    let mut numeric: Vec<(String, Vec<f64>)> = Vec::new();
    let mut text_cols: IndexMap<String, Vec<String>> = IndexMap::new();

    for (name, column) in headers.into_iter().zip(cells) {
        let parsed: Option<Vec<f64>> = column
            .iter()
            .map(|cell| {
                if cell.is_empty() {
                    Some(0.0)
                } else {
                    cell.parse::<f64>().ok()
                }
            })
            .collect();
        match parsed {
            Some(values) => numeric.push((name, values)),
            None => {
                text_cols.insert(name, column);
            }
        }
    }

    Ok(Dataset {
        table: FeatureTable::from_columns(numeric)?,
        text_cols,
    })
}
