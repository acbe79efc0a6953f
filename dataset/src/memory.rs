//! FILENAME: dataset/src/memory.rs
//! PURPOSE: An in-memory `DimensionalData` over flat source rows.
//! CONTEXT: Each source row is one observation, e.g.
//! `{timestamp: "2024-01-01", region: "north", visits: 12}`. Measuring
//! `timestamp` and breaking `visits` down by `region` yields one row per
//! timestamp with a `{north: .., south: ..}` map of summed visits.
//!
//! Grouping keeps the order in which each group key first appears. Fields
//! that hold the same value on every row of a group (a rank or a timestamp
//! attached to a ranked item, for instance) are carried onto the grouped row.

use indexmap::IndexMap;
use log::warn;

use crate::error::DatasetError;
use crate::source::DimensionalData;
use crate::value::{FieldValue, Record};

/// A group of source rows sharing one value of the measured dimension.
#[derive(Debug)]
struct Group {
    /// The first-seen value of the measured dimension.
    key_value: FieldValue,
    /// Fields whose value is identical across every row seen so far.
    carried: Record,
    total: f64,
    splits: IndexMap<String, f64>,
}

/// Flat source rows plus the currently measured dimension.
#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    rows: Vec<Record>,
    measured: Option<String>,
}

impl MemoryDataset {
    pub fn new(rows: Vec<Record>) -> Self {
        MemoryDataset {
            rows,
            measured: None,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(crate::value::records_from_json(json)?))
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn measured_dimension(&self) -> Option<&str> {
        self.measured.as_deref()
    }

    /// Distinct category keys of a dimension, in order of first appearance.
    /// Rows without a usable value for the dimension are ignored.
    pub fn dimension_values(&self, dimension: &str) -> Vec<String> {
        let mut seen: IndexMap<String, ()> = IndexMap::new();
        for row in &self.rows {
            if let Some(key) = row.get(dimension).and_then(FieldValue::key_string) {
                seen.entry(key).or_insert(());
            }
        }
        seen.into_keys().collect()
    }

    fn require_field(&self, field: &str) -> Result<(), DatasetError> {
        if !self.rows.is_empty() && !self.rows.iter().any(|r| r.contains_key(field)) {
            return Err(DatasetError::MissingField(field.to_string()));
        }
        Ok(())
    }
}

impl DimensionalData for MemoryDataset {
    fn measure(&mut self, dimension: &str) {
        self.measured = Some(dimension.to_string());
    }

    fn breakdown(
        &self,
        value_field: &str,
        breakdown_dimension: Option<&str>,
    ) -> Result<Vec<Record>, DatasetError> {
        let dimension = self.measured.as_deref().ok_or(DatasetError::NoMeasure)?;
        self.require_field(dimension)?;
        self.require_field(value_field)?;
        if let Some(split_field) = breakdown_dimension {
            self.require_field(split_field)?;
        }

        let categories = breakdown_dimension
            .map(|d| self.dimension_values(d))
            .unwrap_or_default();

        let mut groups: IndexMap<String, Group> = IndexMap::new();

        for (row_index, row) in self.rows.iter().enumerate() {
            let Some(key_value) = row.get(dimension) else {
                warn!("row {} has no '{}', skipped", row_index, dimension);
                continue;
            };
            let Some(group_key) = key_value.key_string() else {
                warn!("row {} has an unusable '{}', skipped", row_index, dimension);
                continue;
            };

            let amount = match row.get(value_field) {
                Some(FieldValue::Number(n)) => *n,
                Some(FieldValue::Empty) | None => {
                    warn!("row {} has no '{}', skipped", row_index, value_field);
                    continue;
                }
                Some(_) => return Err(DatasetError::NotNumeric(value_field.to_string())),
            };

            let category = match breakdown_dimension {
                Some(split_field) => match row.get(split_field).and_then(FieldValue::key_string) {
                    Some(category) => Some(category),
                    None => {
                        warn!("row {} has no '{}', skipped", row_index, split_field);
                        continue;
                    }
                },
                None => None,
            };

            let is_carried = |field: &str| {
                field != dimension && field != value_field && Some(field) != breakdown_dimension
            };

            let group = groups.entry(group_key).or_insert_with(|| Group {
                key_value: key_value.clone(),
                carried: row
                    .iter()
                    .filter(|(k, _)| is_carried(k.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect(),
                total: 0.0,
                splits: IndexMap::new(),
            });

            group.carried.retain(|k, v| row.get(k) == Some(&*v));
            group.total += amount;
            if let Some(category) = category {
                *group.splits.entry(category).or_insert(0.0) += amount;
            }
        }

        let results = groups
            .into_values()
            .map(|group| {
                let mut out = Record::new();
                out.insert(dimension.to_string(), group.key_value);
                out.extend(group.carried);

                let value = if breakdown_dimension.is_some() {
                    let splits: Record = categories
                        .iter()
                        .map(|c| {
                            let n = group.splits.get(c).copied().unwrap_or(0.0);
                            (c.clone(), FieldValue::Number(n))
                        })
                        .collect();
                    FieldValue::Map(splits)
                } else {
                    FieldValue::Number(group.total)
                };
                out.insert(value_field.to_string(), value);
                out
            })
            .collect();

        Ok(results)
    }
}
