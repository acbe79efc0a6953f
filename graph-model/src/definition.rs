//! FILENAME: graph-model/src/definition.rs
//! Graph Definition - The serializable chart configuration.
//!
//! This module contains all the types needed to DESCRIBE a graph.
//! These structures are designed to be:
//! - Deserializable from the dashboard's camelCase JSON metric configs
//! - Immutable snapshots of what the chart shows (the model copies them)

use dataset::Granularity;
use serde::{Deserialize, Serialize};

use crate::error::GraphError;

/// Key of the single value held by the synthetic total breakdown.
pub const TOTAL_KEY: &str = "total";

/// Display name of the synthetic total breakdown.
pub const TOTAL_NAME: &str = "Total";

/// The dimension every non-ranked graph is measured along.
pub const TIMESTAMP_FIELD: &str = "timestamp";

// ============================================================================
// STRUCTURE
// ============================================================================

/// How a graph lays out its points.
///
/// Any structure name other than `"top"` selects the breakdown layout, so
/// configs written for other chart kinds ("line", "bar") still load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Structure {
    /// Rows ranked by value, one point per ranked item.
    Top,
    /// One point per time bucket, split by the active breakdown.
    Breakdown,
}

impl Default for Structure {
    fn default() -> Self {
        Structure::Breakdown
    }
}

impl From<String> for Structure {
    fn from(value: String) -> Self {
        if value == "top" {
            Structure::Top
        } else {
            Structure::Breakdown
        }
    }
}

impl From<Structure> for String {
    fn from(value: Structure) -> Self {
        match value {
            Structure::Top => "top".to_string(),
            Structure::Breakdown => "breakdown".to_string(),
        }
    }
}

// ============================================================================
// BREAKDOWNS
// ============================================================================

/// One category within a breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownValue {
    /// Display name.
    pub name: String,

    /// Category key as produced by the dataset for this dimension.
    pub key: String,

    /// Whether the category is included in statistics.
    #[serde(default)]
    pub on: bool,
}

impl BreakdownValue {
    pub fn new(name: &str, key: &str, on: bool) -> Self {
        BreakdownValue {
            name: name.to_string(),
            key: key.to_string(),
            on,
        }
    }
}

/// A named partition of the data into categorical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakdown {
    /// Display label.
    pub name: String,

    /// The dimension the data is split by; None for the synthetic total.
    #[serde(default)]
    pub breakdown_name: Option<String>,

    /// Marks the synthetic total breakdown.
    #[serde(default)]
    pub total: bool,

    #[serde(default)]
    pub values: Vec<BreakdownValue>,
}

impl Breakdown {
    pub fn new(name: &str, breakdown_name: &str, values: Vec<BreakdownValue>) -> Self {
        Breakdown {
            name: name.to_string(),
            breakdown_name: Some(breakdown_name.to_string()),
            total: false,
            values,
        }
    }

    /// The implicit "Total" breakdown: no split, a single category that is on.
    pub fn total() -> Self {
        Breakdown {
            name: TOTAL_NAME.to_string(),
            breakdown_name: None,
            total: true,
            values: vec![BreakdownValue::new(TOTAL_KEY, TOTAL_KEY, true)],
        }
    }
}

// ============================================================================
// GRAPH CONFIG
// ============================================================================

/// The complete configuration of one graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphConfig {
    /// Name of the numeric field to extract.
    pub value: Option<String>,

    /// Point layout; ranked ("top") or breakdown.
    pub structure: Structure,

    /// Dimension ranked in the top layout.
    pub key: Option<String>,

    /// Show running totals instead of per-bucket values.
    pub cumulative: bool,

    /// Whether the aggregate is a sum (true) or an average (false).
    pub additive: bool,

    /// Presentation hint, passed through untouched.
    pub area: Option<serde_json::Value>,

    /// Presentation hint, passed through untouched.
    pub dark_color: Option<serde_json::Value>,

    /// Breakdowns offered for this graph, in display order.
    pub breakdowns: Vec<Breakdown>,

    /// Width of the time buckets points are keyed by.
    pub granularity: Granularity,
}

impl GraphConfig {
    pub fn new(value: &str) -> Self {
        GraphConfig {
            value: Some(value.to_string()),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, GraphError> {
        Ok(serde_json::from_str(json)?)
    }

    pub(crate) fn value_field(&self) -> Result<&str, GraphError> {
        self.value
            .as_deref()
            .ok_or_else(|| GraphError::InvalidInput("graph config has no value field".to_string()))
    }

    pub(crate) fn key_field(&self) -> Result<&str, GraphError> {
        self.key
            .as_deref()
            .ok_or_else(|| GraphError::InvalidInput("top graph config has no key field".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_camel_case_json() {
        let config = GraphConfig::from_json(
            r##"{
                "value": "edits",
                "additive": true,
                "cumulative": true,
                "area": true,
                "darkColor": "#2c3e50",
                "granularity": "daily",
                "breakdowns": [{
                    "name": "Editor type",
                    "breakdownName": "editor_type",
                    "values": [
                        {"name": "Anonymous", "key": "anonymous", "on": true},
                        {"name": "Bot", "key": "bot"}
                    ]
                }]
            }"##,
        )
        .unwrap();

        assert_eq!(config.value.as_deref(), Some("edits"));
        assert_eq!(config.structure, Structure::Breakdown);
        assert!(config.additive && config.cumulative);
        assert_eq!(config.dark_color, Some(serde_json::json!("#2c3e50")));
        assert_eq!(config.granularity, Granularity::Daily);

        let breakdown = &config.breakdowns[0];
        assert_eq!(breakdown.breakdown_name.as_deref(), Some("editor_type"));
        assert!(!breakdown.total);
        assert!(breakdown.values[0].on);
        assert!(!breakdown.values[1].on, "absent toggles read as off");
    }

    #[test]
    fn test_structure_names() {
        let top = GraphConfig::from_json(r#"{"value": "views", "structure": "top", "key": "article"}"#).unwrap();
        assert_eq!(top.structure, Structure::Top);
        assert_eq!(top.key_field().unwrap(), "article");

        let line = GraphConfig::from_json(r#"{"value": "views", "structure": "line"}"#).unwrap();
        assert_eq!(line.structure, Structure::Breakdown);
    }

    #[test]
    fn test_missing_fields_fail_at_use() {
        let config = GraphConfig::from_json("{}").unwrap();
        assert!(matches!(config.value_field(), Err(GraphError::InvalidInput(_))));
        assert!(matches!(config.key_field(), Err(GraphError::InvalidInput(_))));
    }

    #[test]
    fn test_malformed_json_is_a_config_error() {
        let result = GraphConfig::from_json(r#"{"value": 12}"#);
        assert!(matches!(result, Err(GraphError::Config(_))));
    }

    #[test]
    fn test_total_breakdown_shape() {
        let total = Breakdown::total();
        assert_eq!(total.name, "Total");
        assert_eq!(total.breakdown_name, None);
        assert!(total.total);
        assert_eq!(total.values, vec![BreakdownValue::new("total", "total", true)]);
    }
}
