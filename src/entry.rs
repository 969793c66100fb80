//! New-entry adaptation
//!
//! A new entry arrives either flat (feature name → value) or nested under a
//! `feature_values` key. The shape is resolved once here into a single
//! canonical mapping; everything downstream sees one record type.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DetectError;
use crate::table::FeatureTable;

/// A loosely-typed new-entry record, flat or nested
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NewEntry {
    /// `{"feature_values": {...}, ...}` — sibling fields (dates, notes)
    /// ride along and are echoed back in results
    Nested {
        feature_values: IndexMap<String, Value>,
        #[serde(flatten)]
        extra: IndexMap<String, Value>,
    },
    /// `{"screen_time_min": 500, ...}`
    Flat(IndexMap<String, Value>),
}

impl NewEntry {
    /// The canonical feature mapping, whichever shape the record arrived in
    pub fn values(&self) -> &IndexMap<String, Value> {
        match self {
            NewEntry::Nested { feature_values, .. } => feature_values,
            NewEntry::Flat(map) => map,
        }
    }

    /// The record's own top-level fields, for echoing back in results
    pub fn record(&self) -> IndexMap<String, Value> {
        match self {
            NewEntry::Nested {
                feature_values,
                extra,
            } => {
                let mut map = IndexMap::new();
                map.insert(
                    "feature_values".to_string(),
                    Value::Object(
                        feature_values
                            .iter()
                            .map(|(k, v)| (k.clone(), v.clone()))
                            .collect(),
                    ),
                );
                for (k, v) in extra {
                    map.insert(k.clone(), v.clone());
                }
                map
            }
            NewEntry::Flat(map) => map.clone(),
        }
    }
}

/// Adapter from new-entry records to the canonical feature ordering
pub struct EntryAdapter;

impl EntryAdapter {
    /// Ordered feature vector looked up directly from the record. This
    /// standalone path applies no defaults or derivation: any canonical name
    /// absent from the record fails with [`DetectError::MissingFeature`].
    pub fn feature_vector(
        entry: &NewEntry,
        feature_cols: &[String],
    ) -> Result<Vec<f64>, DetectError> {
        let values = entry.values();
        feature_cols
            .iter()
            .map(|name| {
                values
                    .get(name)
                    .and_then(Value::as_f64)
                    .ok_or_else(|| DetectError::MissingFeature(name.clone()))
            })
            .collect()
    }

    /// One-row table from the record's numeric fields. The scorer runs the
    /// full normalize → derive → build pipeline over this table so a single
    /// entry is treated exactly like a batch row.
    pub fn to_table(entry: &NewEntry) -> FeatureTable {
        FeatureTable::from_record(
            entry
                .values()
                .iter()
                .filter_map(|(name, value)| value.as_f64().map(|v| (name.clone(), v))),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn nested_and_flat_resolve_to_the_same_mapping() {
        let nested: NewEntry =
            serde_json::from_value(json!({"feature_values": {"steps": 900, "mood_score": 4}}))
                .unwrap();
        let flat: NewEntry =
            serde_json::from_value(json!({"steps": 900, "mood_score": 4})).unwrap();

        assert!(matches!(nested, NewEntry::Nested { .. }));
        assert!(matches!(flat, NewEntry::Flat(_)));
        assert_eq!(
            nested.values().get("steps").unwrap().as_f64(),
            flat.values().get("steps").unwrap().as_f64()
        );
    }

    #[test]
    fn feature_vector_preserves_canonical_order() {
        let entry: NewEntry =
            serde_json::from_value(json!({"b": 2.0, "a": 1.0, "c": 3.0})).unwrap();
        let vector =
            EntryAdapter::feature_vector(&entry, &cols(&["a", "b", "c"])).unwrap();
        assert_eq!(vector, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn missing_feature_names_the_feature() {
        let entry: NewEntry = serde_json::from_value(json!({"a": 1.0})).unwrap();
        let err = EntryAdapter::feature_vector(&entry, &cols(&["a", "sleep_hours"]))
            .unwrap_err();
        match err {
            DetectError::MissingFeature(name) => assert_eq!(name, "sleep_hours"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn to_table_keeps_numeric_fields_only() {
        let entry: NewEntry = serde_json::from_value(
            json!({"feature_values": {"steps": 900, "note": "tired", "mood_score": 2.5}}),
        )
        .unwrap();
        let table = EntryAdapter::to_table(&entry);
        assert_eq!(table.n_rows(), 1);
        assert_eq!(table.column("steps").unwrap(), &[900.0]);
        assert_eq!(table.column("mood_score").unwrap(), &[2.5]);
        assert!(!table.has_column("note"));
    }

    #[test]
    fn record_echoes_original_shape() {
        let entry: NewEntry =
            serde_json::from_value(json!({"feature_values": {"steps": 900}})).unwrap();
        let record = entry.record();
        assert!(record.contains_key("feature_values"));
    }

    #[test]
    fn nested_sibling_fields_ride_along() {
        let entry: NewEntry = serde_json::from_value(
            json!({"feature_values": {"steps": 900}, "date": "2024-03-02"}),
        )
        .unwrap();
        // Siblings are not features but are echoed back in the record.
        assert!(!entry.values().contains_key("date"));
        assert_eq!(entry.record()["date"], json!("2024-03-02"));
    }
}
