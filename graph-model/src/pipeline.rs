//! FILENAME: graph-model/src/pipeline.rs
//! Dataset Transform Pipeline - turns a dimensional dataset into graph points.
//!
//! Two layouts:
//! 1. Ranked ("top"): group by the key dimension, sort descending by value,
//!    one point per ranked item carrying the item's own fields.
//! 2. Breakdown: group by timestamp split by the active breakdown, optionally
//!    accumulate running totals, one point per time bucket.
//!
//! Every run rebuilds the full point sequence; nothing is patched in place.

use dataset::{create_date, DimensionalData, FieldValue, Granularity, Record};
use indexmap::IndexMap;
use log::debug;
use serde::Serialize;

use crate::definition::{GraphConfig, Structure, TIMESTAMP_FIELD, TOTAL_KEY};
use crate::error::GraphError;

/// Per-category values of one point, in category order.
pub type Totals = IndexMap<String, f64>;

// ============================================================================
// POINTS
// ============================================================================

/// One time-bucketed point of a graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphPoint {
    /// The ranked row's own fields, without the value field. Empty for
    /// breakdown points.
    #[serde(flatten)]
    pub fields: Record,

    /// Time-bucket key.
    pub month: String,

    /// Category key to value.
    pub total: Totals,
}

impl GraphPoint {
    pub fn new(month: &str, total: Totals) -> Self {
        GraphPoint {
            fields: Record::new(),
            month: month.to_string(),
            total,
        }
    }

    /// The single value of a ranked point (or of the total breakdown).
    pub fn total_value(&self) -> Option<f64> {
        self.total.get(TOTAL_KEY).copied()
    }

    /// Reads a numeric field of the ranked row, e.g. its rank.
    pub fn field_f64(&self, name: &str) -> Option<f64> {
        self.fields.get(name).and_then(FieldValue::as_f64)
    }

    /// Deep copy of the point as a nested record.
    pub fn to_record(&self) -> Record {
        let mut record = self.fields.clone();
        record.insert("month".to_string(), FieldValue::Text(self.month.clone()));
        let total: Record = self
            .total
            .iter()
            .map(|(k, v)| (k.clone(), FieldValue::Number(*v)))
            .collect();
        record.insert("total".to_string(), FieldValue::Map(total));
        record
    }
}

/// A breakdown row once its value field has been read.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesRow {
    pub timestamp: FieldValue,
    pub values: Totals,
}

impl SeriesRow {
    /// Reads `{timestamp, <value_field>: number | {category: number}}`.
    /// A bare number is the value of the total category. A missing or null
    /// value, or a null category, contributes nothing.
    pub fn from_record(row: &Record, value_field: &str) -> Result<Self, GraphError> {
        let timestamp = row
            .get(TIMESTAMP_FIELD)
            .cloned()
            .ok_or_else(|| GraphError::InvalidInput(format!("row has no '{}'", TIMESTAMP_FIELD)))?;

        let values = match row.get(value_field) {
            None | Some(FieldValue::Empty) => Totals::new(),
            Some(FieldValue::Number(n)) => {
                let mut values = Totals::new();
                values.insert(TOTAL_KEY.to_string(), *n);
                values
            }
            Some(FieldValue::Map(split)) => {
                let mut values = Totals::with_capacity(split.len());
                for (category, v) in split {
                    match v {
                        FieldValue::Empty => continue,
                        FieldValue::Number(n) => {
                            values.insert(category.clone(), *n);
                        }
                        _ => {
                            return Err(GraphError::InvalidInput(format!(
                                "'{}.{}' is not a number",
                                value_field, category
                            )))
                        }
                    }
                }
                values
            }
            Some(_) => {
                return Err(GraphError::InvalidInput(format!(
                    "'{}' is not a number or a category map",
                    value_field
                )))
            }
        };

        Ok(SeriesRow { timestamp, values })
    }
}

// ============================================================================
// DATASET TRANSFORMS
// ============================================================================

/// The transform applied to breakdown rows before they become points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetTransform {
    Identity,
    Accumulate,
}

impl DatasetTransform {
    pub fn for_config(config: &GraphConfig) -> Self {
        if config.cumulative {
            DatasetTransform::Accumulate
        } else {
            DatasetTransform::Identity
        }
    }

    pub fn apply(&self, rows: Vec<SeriesRow>) -> Vec<SeriesRow> {
        match self {
            DatasetTransform::Identity => rows,
            DatasetTransform::Accumulate => accumulate(&rows),
        }
    }
}

/// Running per-category totals, inclusive of each row.
///
/// A category first seen on a later row starts from zero; a category missing
/// from a row keeps its running value on that row.
pub fn accumulate(rows: &[SeriesRow]) -> Vec<SeriesRow> {
    let mut running = Totals::new();
    rows.iter()
        .map(|row| {
            for (category, value) in &row.values {
                *running.entry(category.clone()).or_insert(0.0) += value;
            }
            SeriesRow {
                timestamp: row.timestamp.clone(),
                values: running.clone(),
            }
        })
        .collect()
}

// ============================================================================
// LAYOUTS
// ============================================================================

/// Groups by `key` and sorts descending by `value`; ties keep dataset order.
pub fn top_x_by_y(
    data: &mut dyn DimensionalData,
    key: &str,
    value: &str,
) -> Result<Vec<(f64, Record)>, GraphError> {
    data.measure(key);
    let mut ranked = data
        .breakdown(value, None)?
        .into_iter()
        .map(|row| match row.get(value).and_then(FieldValue::as_f64) {
            Some(n) => Ok((n, row)),
            None => Err(GraphError::InvalidInput(format!("ranked row has no numeric '{}'", value))),
        })
        .collect::<Result<Vec<_>, GraphError>>()?;

    ranked.sort_by(|a, b| b.0.total_cmp(&a.0));
    Ok(ranked)
}

fn ranked_points(
    data: &mut dyn DimensionalData,
    config: &GraphConfig,
) -> Result<Vec<GraphPoint>, GraphError> {
    let value = config.value_field()?;
    let key = config.key_field()?;

    top_x_by_y(data, key, value)?
        .into_iter()
        .map(|(n, mut fields)| -> Result<GraphPoint, GraphError> {
            fields.shift_remove(value);
            let month = match fields.get(TIMESTAMP_FIELD) {
                Some(ts) => create_date(ts, config.granularity)?,
                None => {
                    return Err(GraphError::InvalidInput(format!(
                        "ranked row has no '{}'",
                        TIMESTAMP_FIELD
                    )))
                }
            };
            fields.shift_remove("month");
            fields.shift_remove("total");

            let mut total = Totals::new();
            total.insert(TOTAL_KEY.to_string(), n);
            Ok(GraphPoint { fields, month, total })
        })
        .collect()
}

fn breakdown_points(
    data: &mut dyn DimensionalData,
    config: &GraphConfig,
    breakdown_name: Option<&str>,
    transform: DatasetTransform,
) -> Result<Vec<GraphPoint>, GraphError> {
    let value = config.value_field()?;

    data.measure(TIMESTAMP_FIELD);
    let rows = data
        .breakdown(value, breakdown_name)?
        .iter()
        .map(|row| SeriesRow::from_record(row, value))
        .collect::<Result<Vec<_>, GraphError>>()?;

    transform
        .apply(rows)
        .into_iter()
        .map(|row| bucket(row, config.granularity))
        .collect()
}

fn bucket(row: SeriesRow, granularity: Granularity) -> Result<GraphPoint, GraphError> {
    Ok(GraphPoint {
        fields: Record::new(),
        month: create_date(&row.timestamp, granularity)?,
        total: row.values,
    })
}

/// Builds the full point sequence for a dataset.
pub fn build_points(
    data: &mut dyn DimensionalData,
    config: &GraphConfig,
    breakdown_name: Option<&str>,
    transform: DatasetTransform,
) -> Result<Vec<GraphPoint>, GraphError> {
    debug!(
        "building {:?} points for {:?} split by {:?}",
        config.structure, config.value, breakdown_name
    );
    let points = match config.structure {
        Structure::Top => ranked_points(data, config)?,
        Structure::Breakdown => breakdown_points(data, config, breakdown_name, transform)?,
    };
    debug!("built {} points", points.len());
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dataset::records_from_json;

    fn series(json: &str, value_field: &str) -> Vec<SeriesRow> {
        records_from_json(json)
            .unwrap()
            .iter()
            .map(|r| SeriesRow::from_record(r, value_field).unwrap())
            .collect()
    }

    fn values(row: &SeriesRow) -> Vec<(&str, f64)> {
        row.values.iter().map(|(k, v)| (k.as_str(), *v)).collect()
    }

    #[test]
    fn test_accumulate_running_totals() {
        let rows = series(
            r#"[{"timestamp": 1, "v": {"a": 5, "b": 1}}, {"timestamp": 2, "v": {"a": 3, "b": 2}}]"#,
            "v",
        );
        let acc = accumulate(&rows);

        assert_eq!(acc.len(), 2);
        assert_eq!(acc[0].timestamp, FieldValue::Number(1.0));
        assert_eq!(values(&acc[0]), vec![("a", 5.0), ("b", 1.0)]);
        assert_eq!(values(&acc[1]), vec![("a", 8.0), ("b", 3.0)]);
    }

    #[test]
    fn test_accumulate_late_and_missing_categories() {
        let rows = series(
            r#"[
                {"timestamp": 1, "v": {"a": 5}},
                {"timestamp": 2, "v": {"a": 1, "c": 4}},
                {"timestamp": 3, "v": {"c": 1}}
            ]"#,
            "v",
        );
        let acc = accumulate(&rows);

        assert_eq!(values(&acc[1]), vec![("a", 6.0), ("c", 4.0)]);
        assert_eq!(values(&acc[2]), vec![("a", 6.0), ("c", 5.0)]);
    }

    #[test]
    fn test_accumulate_empty() {
        assert!(accumulate(&[]).is_empty());
    }

    #[test]
    fn test_identity_transform_passes_rows_through() {
        let rows = series(r#"[{"timestamp": 1, "v": {"a": 5}}, {"timestamp": 2, "v": {"a": 3}}]"#, "v");
        assert_eq!(DatasetTransform::Identity.apply(rows.clone()), rows);
    }

    #[test]
    fn test_transform_for_config() {
        let mut config = GraphConfig::new("v");
        assert_eq!(DatasetTransform::for_config(&config), DatasetTransform::Identity);
        config.cumulative = true;
        assert_eq!(DatasetTransform::for_config(&config), DatasetTransform::Accumulate);
    }

    #[test]
    fn test_series_row_reads_scalar_as_total() {
        let rows = series(r#"[{"timestamp": "2024-01-01", "visits": 7}]"#, "visits");
        assert_eq!(values(&rows[0]), vec![("total", 7.0)]);
    }

    #[test]
    fn test_series_row_skips_null_values() {
        let rows = series(
            r#"[
                {"timestamp": 1, "visits": {"north": 10, "south": null}},
                {"timestamp": 2, "visits": null},
                {"timestamp": 3}
            ]"#,
            "visits",
        );
        assert_eq!(values(&rows[0]), vec![("north", 10.0)]);
        assert!(rows[1].values.is_empty());
        assert!(rows[2].values.is_empty());
    }

    #[test]
    fn test_series_row_rejects_malformed_rows() {
        let rows = records_from_json(
            r#"[
                {"visits": {"a": 1}},
                {"timestamp": 1, "visits": "lots"},
                {"timestamp": 1, "visits": true},
                {"timestamp": 1, "visits": {"a": "x"}}
            ]"#,
        )
        .unwrap();
        for row in &rows {
            assert!(matches!(
                SeriesRow::from_record(row, "visits"),
                Err(GraphError::InvalidInput(_))
            ));
        }
    }

    #[test]
    fn test_point_to_record_is_nested() {
        let mut total = Totals::new();
        total.insert("total".to_string(), 5.0);
        let record = GraphPoint::new("2024-01", total).to_record();

        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"month":"2024-01","total":{"total":5.0}}"#
        );
    }
}
