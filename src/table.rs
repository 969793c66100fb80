//! Column-oriented numeric table
//!
//! [`FeatureTable`] is the substrate every pipeline stage operates on: named
//! f64 columns of equal length, in insertion order. Grouping keys and other
//! non-numeric data live outside the table (see [`crate::loader::Dataset`]).

use indexmap::IndexMap;

use crate::error::DetectError;

/// A table of named numeric columns, all of the same length
#[derive(Debug, Clone, Default)]
pub struct FeatureTable {
    n_rows: usize,
    columns: IndexMap<String, Vec<f64>>,
}

impl FeatureTable {
    /// Empty table with a fixed row count
    pub fn new(n_rows: usize) -> Self {
        Self {
            n_rows,
            columns: IndexMap::new(),
        }
    }

    /// Build a table from (name, column) pairs, validating lengths
    pub fn from_columns<I, S>(columns: I) -> Result<Self, DetectError>
    where
        I: IntoIterator<Item = (S, Vec<f64>)>,
        S: Into<String>,
    {
        let mut table: Option<FeatureTable> = None;
        for (name, values) in columns {
            let name = name.into();
            match &mut table {
                None => {
                    let mut t = FeatureTable::new(values.len());
                    t.columns.insert(name, values);
                    table = Some(t);
                }
                Some(t) => {
                    if values.len() != t.n_rows {
                        return Err(DetectError::RaggedColumn {
                            name,
                            expected: t.n_rows,
                            actual: values.len(),
                        });
                    }
                    t.columns.insert(name, values);
                }
            }
        }
        Ok(table.unwrap_or_default())
    }

    /// One-row table from a (name, value) record
    pub fn from_record<I, S>(record: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: Into<String>,
    {
        let mut table = FeatureTable::new(1);
        for (name, value) in record {
            table.columns.insert(name.into(), vec![value]);
        }
        table
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Column names in insertion order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(|k| k.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.columns.get(name).map(|c| c.as_slice())
    }

    /// The existing column, or a freshly materialized constant column of the
    /// table's row count. A bare scalar never stands in for a column.
    pub fn column_or(&self, name: &str, default: f64) -> Vec<f64> {
        match self.columns.get(name) {
            Some(col) => col.clone(),
            None => vec![default; self.n_rows],
        }
    }

    /// Insert or replace a column. The length must match the table; this is
    /// an internal invariant, all external construction paths validate it.
    pub fn insert<S: Into<String>>(&mut self, name: S, values: Vec<f64>) {
        debug_assert_eq!(values.len(), self.n_rows);
        self.columns.insert(name.into(), values);
    }

    /// New table holding only the given rows (used for group partitioning)
    pub fn select_rows(&self, rows: &[usize]) -> Self {
        let mut out = FeatureTable::new(rows.len());
        for (name, col) in &self.columns {
            let values = rows.iter().map(|&i| col[i]).collect();
            out.columns.insert(name.clone(), values);
        }
        out
    }
}
