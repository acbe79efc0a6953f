//! FILENAME: dataset/src/value.rs
//! PURPOSE: Defines the dynamically-shaped record used across the graph pipeline.
//! CONTEXT: Rows coming out of a dimensional dataset have no fixed schema: the
//! grouping dimension, the value field and any carried attributes are named
//! by configuration. A `Record` keeps its fields in insertion order so that
//! exported rows list columns the way the source produced them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An insertion-ordered mapping from field name to value.
pub type Record = IndexMap<String, FieldValue>;

/// A single field of a record.
///
/// Serializes untagged so that plain JSON (`null`, booleans, numbers,
/// strings and objects) reads straight into records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Empty,
    Boolean(bool),
    Number(f64),
    Text(String),
    Map(Record),
}

impl FieldValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Record> {
        match self {
            FieldValue::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Empty)
    }

    /// Returns the value as a category key, or None for empty and nested values.
    /// Whole numbers are rendered without a fractional part so that `3.0`
    /// and `"3"` name the same category.
    pub fn key_string(&self) -> Option<String> {
        match self {
            FieldValue::Empty | FieldValue::Map(_) => None,
            FieldValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{:.0}", n))
                } else {
                    Some(format!("{}", n))
                }
            }
            FieldValue::Text(s) => Some(s.clone()),
            FieldValue::Boolean(b) => Some(b.to_string()),
        }
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        FieldValue::Empty
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<Record> for FieldValue {
    fn from(value: Record) -> Self {
        FieldValue::Map(value)
    }
}

/// Parses a JSON array of objects into records, keeping field order.
pub fn records_from_json(json: &str) -> Result<Vec<Record>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_reads_into_ordered_record() {
        let rows = records_from_json(
            r#"[{"timestamp": "2024-01-01", "visits": {"b": 2, "a": 1}, "flag": true, "gap": null}]"#,
        )
        .unwrap();

        let row = &rows[0];
        let keys: Vec<&str> = row.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["timestamp", "visits", "flag", "gap"]);
        assert_eq!(row["timestamp"], FieldValue::Text("2024-01-01".to_string()));
        assert_eq!(row["flag"], FieldValue::Boolean(true));
        assert!(row["gap"].is_empty());

        let visits = row["visits"].as_map().unwrap();
        let split_keys: Vec<&str> = visits.keys().map(|k| k.as_str()).collect();
        assert_eq!(split_keys, vec!["b", "a"]);
        assert_eq!(visits["a"].as_f64(), Some(1.0));
    }

    #[test]
    fn test_key_string() {
        assert_eq!(FieldValue::Number(3.0).key_string(), Some("3".to_string()));
        assert_eq!(FieldValue::Number(2.5).key_string(), Some("2.5".to_string()));
        assert_eq!(FieldValue::from("north").key_string(), Some("north".to_string()));
        assert_eq!(FieldValue::Boolean(false).key_string(), Some("false".to_string()));
        assert_eq!(FieldValue::Empty.key_string(), None);
        assert_eq!(FieldValue::Map(Record::new()).key_string(), None);
    }

    #[test]
    fn test_empty_serializes_as_null() {
        let mut row = Record::new();
        row.insert("a".to_string(), FieldValue::Empty);
        row.insert("b".to_string(), FieldValue::from(1.5));
        assert_eq!(serde_json::to_string(&row).unwrap(), r#"{"a":null,"b":1.5}"#);
    }
}
