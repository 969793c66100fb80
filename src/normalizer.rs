//! Raw column normalization
//!
//! Guarantees the fixed raw-column set exists on any input table before
//! feature derivation. Missing columns are filled with 0; a legitimate zero
//! and an absent column are indistinguishable downstream, which is the
//! documented lossy policy.

use crate::config::RAW_COLS;
use crate::table::FeatureTable;

/// Normalizer guaranteeing raw column completeness
pub struct ColumnNormalizer;

impl ColumnNormalizer {
    /// Insert a zero-filled column for every absent raw column.
    /// Existing columns and values are untouched; nothing is removed.
    pub fn normalize(table: &mut FeatureTable) {
        for col in RAW_COLS {
            if !table.has_column(col) {
                table.insert(col, vec![0.0; table.n_rows()]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fills_every_missing_raw_column_with_zero() {
        let mut table = FeatureTable::from_columns(vec![
            ("screen_time_min", vec![310.0, 295.0]),
            ("mood_score", vec![4.0, 3.0]),
        ])
        .unwrap();

        ColumnNormalizer::normalize(&mut table);

        for col in RAW_COLS {
            assert!(table.has_column(col), "missing {}", col);
        }
        assert_eq!(table.column("steps").unwrap(), &[0.0, 0.0]);
        assert_eq!(table.column("sleep_hours").unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn existing_values_are_untouched() {
        let mut table = FeatureTable::from_columns(vec![
            ("steps", vec![8000.0]),
            ("extra_col", vec![7.0]),
        ])
        .unwrap();

        ColumnNormalizer::normalize(&mut table);

        assert_eq!(table.column("steps").unwrap(), &[8000.0]);
        // Unknown columns are never removed.
        assert_eq!(table.column("extra_col").unwrap(), &[7.0]);
    }

    #[test]
    fn empty_table_gains_all_raw_columns() {
        let mut table = FeatureTable::new(0);
        ColumnNormalizer::normalize(&mut table);
        assert_eq!(
            table.column_names().count(),
            RAW_COLS.len()
        );
    }
}
