//! Derived feature computation
//!
//! Computes the app-usage ratio trio and the check/leave ratio from raw
//! counters, only when the caller has not supplied them already. Both the
//! training and the scoring path run this stage, so the safe-division policy
//! is identical on either side.

use crate::table::FeatureTable;

const SOCIAL_RATIO: &str = "social_ratio";
const PRODUCTIVITY_RATIO: &str = "productivity_ratio";
const ENTERTAINMENT_RATIO: &str = "entertainment_ratio";
const CHECK_LEAVE_RATIO: &str = "check_leave_ratio";

/// Feature deriver for usage and check/leave ratios
pub struct FeatureDeriver;

impl FeatureDeriver {
    /// Append derived columns to the table. Idempotent: derived columns that
    /// already exist are left untouched on a second pass.
    pub fn derive(table: &mut FeatureTable) {
        derive_usage_ratios(table);
        derive_check_leave_ratio(table);
    }
}

/// social/productivity/entertainment ratios of total app usage.
///
/// The trio is recomputed whenever any of the three is missing, keeping the
/// ratios mutually consistent. A per-row total of 0 is substituted with 1 so
/// an all-zero-usage row reports 0 for each ratio instead of NaN.
fn derive_usage_ratios(table: &mut FeatureTable) {
    if table.has_column(SOCIAL_RATIO)
        && table.has_column(PRODUCTIVITY_RATIO)
        && table.has_column(ENTERTAINMENT_RATIO)
    {
        return;
    }

    let social = table.column_or("social_usage", 0.0);
    let productivity = table.column_or("productivity_usage", 0.0);
    let entertainment = table.column_or("entertainment_usage", 0.0);

    let totals: Vec<f64> = social
        .iter()
        .zip(&productivity)
        .zip(&entertainment)
        .map(|((s, p), e)| {
            let total = s + p + e;
            if total == 0.0 {
                1.0
            } else {
                total
            }
        })
        .collect();

    let ratio = |component: &[f64]| -> Vec<f64> {
        component
            .iter()
            .zip(&totals)
            .map(|(c, t)| c / t)
            .collect()
    };

    table.insert(SOCIAL_RATIO, ratio(&social));
    table.insert(PRODUCTIVITY_RATIO, ratio(&productivity));
    table.insert(ENTERTAINMENT_RATIO, ratio(&entertainment));
}

/// check_leave_count / total_checks.
///
/// An absent total_checks column defaults to a constant 1 column, which rules
/// out division by zero by construction. An explicitly supplied 0 still
/// divides to infinity; the reference policy only guards the absent case.
fn derive_check_leave_ratio(table: &mut FeatureTable) {
    if table.has_column(CHECK_LEAVE_RATIO) {
        return;
    }

    let counts = table.column_or("check_leave_count", 0.0);
    let totals = table.column_or("total_checks", 1.0);

    let ratio = counts
        .iter()
        .zip(&totals)
        .map(|(c, t)| c / t)
        .collect();
    table.insert(CHECK_LEAVE_RATIO, ratio);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn all_zero_usage_yields_zero_ratios_without_nan() {
        let mut table = FeatureTable::from_columns(vec![
            ("social_usage", vec![0.0, 0.0]),
            ("productivity_usage", vec![0.0, 0.0]),
            ("entertainment_usage", vec![0.0, 0.0]),
        ])
        .unwrap();

        FeatureDeriver::derive(&mut table);

        assert_eq!(table.column("social_ratio").unwrap(), &[0.0, 0.0]);
        assert_eq!(table.column("productivity_ratio").unwrap(), &[0.0, 0.0]);
        assert_eq!(table.column("entertainment_ratio").unwrap(), &[0.0, 0.0]);
    }

    #[test]
    fn nonzero_usage_ratios_sum_to_one() {
        let mut table = FeatureTable::from_columns(vec![
            ("social_usage", vec![30.0, 10.0]),
            ("productivity_usage", vec![50.0, 60.0]),
            ("entertainment_usage", vec![20.0, 30.0]),
        ])
        .unwrap();

        FeatureDeriver::derive(&mut table);

        for row in 0..2 {
            let s = table.column("social_ratio").unwrap()[row];
            let p = table.column("productivity_ratio").unwrap()[row];
            let e = table.column("entertainment_ratio").unwrap()[row];
            assert!((s + p + e - 1.0).abs() < 1e-12);
        }
        assert!((table.column("social_ratio").unwrap()[0] - 0.3).abs() < 1e-12);
        assert!((table.column("productivity_ratio").unwrap()[1] - 0.6).abs() < 1e-12);
    }

    #[test]
    fn absent_usage_columns_broadcast_to_zero() {
        let mut table = FeatureTable::from_columns(vec![("steps", vec![1.0, 2.0, 3.0])]).unwrap();

        FeatureDeriver::derive(&mut table);

        assert_eq!(table.column("social_ratio").unwrap(), &[0.0, 0.0, 0.0]);
        assert_eq!(table.column("check_leave_ratio").unwrap(), &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn derivation_is_idempotent() {
        let mut table = FeatureTable::from_columns(vec![
            ("social_usage", vec![30.0]),
            ("productivity_usage", vec![50.0]),
            ("entertainment_usage", vec![20.0]),
            ("check_leave_count", vec![4.0]),
            ("total_checks", vec![10.0]),
        ])
        .unwrap();

        FeatureDeriver::derive(&mut table);
        let first: Vec<Vec<f64>> = [
            "social_ratio",
            "productivity_ratio",
            "entertainment_ratio",
            "check_leave_ratio",
        ]
        .iter()
        .map(|c| table.column(c).unwrap().to_vec())
        .collect();

        FeatureDeriver::derive(&mut table);
        let second: Vec<Vec<f64>> = [
            "social_ratio",
            "productivity_ratio",
            "entertainment_ratio",
            "check_leave_ratio",
        ]
        .iter()
        .map(|c| table.column(c).unwrap().to_vec())
        .collect();

        assert_eq!(first, second);
    }

    #[test]
    fn caller_supplied_derived_columns_win() {
        let mut table = FeatureTable::from_columns(vec![
            ("social_ratio", vec![0.9]),
            ("productivity_ratio", vec![0.05]),
            ("entertainment_ratio", vec![0.05]),
            ("check_leave_ratio", vec![0.7]),
            ("social_usage", vec![1.0]),
            ("productivity_usage", vec![1.0]),
            ("entertainment_usage", vec![1.0]),
        ])
        .unwrap();

        FeatureDeriver::derive(&mut table);

        assert_eq!(table.column("social_ratio").unwrap(), &[0.9]);
        assert_eq!(table.column("check_leave_ratio").unwrap(), &[0.7]);
    }

    #[test]
    fn default_total_checks_is_one_not_zero() {
        let mut table =
            FeatureTable::from_columns(vec![("check_leave_count", vec![3.0])]).unwrap();

        FeatureDeriver::derive(&mut table);

        assert_eq!(table.column("check_leave_ratio").unwrap(), &[3.0]);
    }

    #[test]
    fn explicit_zero_total_checks_divides_to_infinity() {
        // Only the absent column is guarded. A supplied 0 divides through,
        // matching the reference policy.
        let mut table = FeatureTable::from_columns(vec![
            ("check_leave_count", vec![3.0, 2.0]),
            ("total_checks", vec![0.0, 10.0]),
        ])
        .unwrap();

        FeatureDeriver::derive(&mut table);

        let ratios = table.column("check_leave_ratio").unwrap();
        assert!(ratios[0].is_infinite());
        assert_eq!(ratios[1], 0.2);
    }
}
