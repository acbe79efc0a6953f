//! FILENAME: graph-model/src/export.rs
//! Export Flattener - nested graph points to flat key/value rows.
//!
//! Tabular exports need one column per leaf, so nested maps are folded into
//! dot-joined keys: `{total: {a: 1, b: 2}}` becomes `{"total.a": 1, "total.b": 2}`.

use dataset::{FieldValue, Record};

use crate::pipeline::GraphPoint;

/// How nested keys are prefixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlattenMode {
    /// Every leaf key carries the full path from the top: `a.b.c`.
    FullPath,
    /// Leaf keys carry only their immediate parent: `{a: {b: {c: 1}}}`
    /// becomes `b.c`. Deeper paths can collide; empty values are dropped.
    /// Matches older CSV exports.
    ParentKey,
}

impl Default for FlattenMode {
    fn default() -> Self {
        FlattenMode::FullPath
    }
}

/// Flattens one nested record.
pub fn flatten(record: &Record, mode: FlattenMode) -> Record {
    let mut flat = Record::new();
    match mode {
        FlattenMode::FullPath => flatten_full_path(record, None, &mut flat),
        FlattenMode::ParentKey => flatten_parent_key(record, None, &mut flat),
    }
    flat
}

fn join(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(p) => format!("{}.{}", p, key),
        None => key.to_string(),
    }
}

fn flatten_full_path(record: &Record, prefix: Option<&str>, flat: &mut Record) {
    for (key, value) in record {
        let path = join(prefix, key);
        match value {
            FieldValue::Map(nested) => flatten_full_path(nested, Some(path.as_str()), flat),
            leaf => {
                flat.insert(path, leaf.clone());
            }
        }
    }
}

fn flatten_parent_key(record: &Record, prefix: Option<&str>, flat: &mut Record) {
    for (key, value) in record {
        match value {
            FieldValue::Map(nested) => flatten_parent_key(nested, Some(key.as_str()), flat),
            FieldValue::Empty => {}
            leaf => {
                flat.insert(join(prefix, key), leaf.clone());
            }
        }
    }
}

/// Flat export rows for a point sequence. Rows are built from copies; the
/// points are not touched.
pub fn download_rows(points: &[GraphPoint], mode: FlattenMode) -> Vec<Record> {
    points
        .iter()
        .map(|p| flatten(&p.to_record(), mode))
        .collect()
}
