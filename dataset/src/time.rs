//! FILENAME: dataset/src/time.rs
//! PURPOSE: Turns raw timestamps into canonical time-bucket keys.
//! CONTEXT: Chart points are keyed by bucket ("2024-01" for a monthly chart)
//! rather than by the raw timestamp, so that every series lines up on the
//! same x-axis labels regardless of how the source encoded its dates.
//!
//! Accepted encodings:
//! - Numbers: milliseconds since the Unix epoch
//! - RFC 3339 text: "2024-01-15T00:00:00Z"
//! - Naive date-time text: "2024-01-15T00:00:00"
//! - Plain dates: "2024-01-15"
//! - Compact dates: "20240115" and "2024011500" (trailing hour)

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::DatasetError;
use crate::value::FieldValue;

/// Width of a time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Monthly,
    Yearly,
}

impl Default for Granularity {
    fn default() -> Self {
        Granularity::Monthly
    }
}

impl Granularity {
    fn format_str(&self) -> &'static str {
        match self {
            Granularity::Daily => "%Y-%m-%d",
            Granularity::Monthly => "%Y-%m",
            Granularity::Yearly => "%Y",
        }
    }
}

/// Creates the bucket key for a timestamp value.
pub fn create_date(timestamp: &FieldValue, granularity: Granularity) -> Result<String, DatasetError> {
    let date = parse_timestamp(timestamp)?;
    Ok(date.format(granularity.format_str()).to_string())
}

/// Parses any accepted timestamp encoding into a calendar date.
pub fn parse_timestamp(timestamp: &FieldValue) -> Result<NaiveDate, DatasetError> {
    match timestamp {
        FieldValue::Number(ms) => {
            if !ms.is_finite() {
                return Err(DatasetError::InvalidTimestamp(ms.to_string()));
            }
            DateTime::from_timestamp_millis(*ms as i64)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| DatasetError::InvalidTimestamp(ms.to_string()))
        }
        FieldValue::Text(s) => parse_text(s.trim())
            .ok_or_else(|| DatasetError::InvalidTimestamp(s.clone())),
        other => Err(DatasetError::InvalidTimestamp(format!("{:?}", other))),
    }
}

fn parse_text(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s.len() {
        8 => NaiveDate::parse_from_str(s, "%Y%m%d").ok(),
        10 => {
            let hour: u32 = s[8..].parse().ok()?;
            if hour > 23 {
                return None;
            }
            NaiveDate::parse_from_str(&s[..8], "%Y%m%d").ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly(ts: FieldValue) -> String {
        create_date(&ts, Granularity::Monthly).unwrap()
    }

    #[test]
    fn test_text_encodings_share_a_bucket() {
        assert_eq!(monthly("2024-01-15T10:30:00Z".into()), "2024-01");
        assert_eq!(monthly("2024-01-15T10:30:00.000".into()), "2024-01");
        assert_eq!(monthly("2024-01-15".into()), "2024-01");
        assert_eq!(monthly("20240115".into()), "2024-01");
        assert_eq!(monthly("2024011500".into()), "2024-01");
    }

    #[test]
    fn test_epoch_millis() {
        // 2024-02-01T00:00:00Z
        assert_eq!(monthly(FieldValue::Number(1_706_745_600_000.0)), "2024-02");
        assert_eq!(monthly(FieldValue::Number(0.0)), "1970-01");
    }

    #[test]
    fn test_granularities() {
        let ts = FieldValue::from("2023-07-04");
        assert_eq!(create_date(&ts, Granularity::Daily).unwrap(), "2023-07-04");
        assert_eq!(create_date(&ts, Granularity::Monthly).unwrap(), "2023-07");
        assert_eq!(create_date(&ts, Granularity::Yearly).unwrap(), "2023");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(create_date(&"last tuesday".into(), Granularity::Monthly).is_err());
        assert!(create_date(&"2024011599".into(), Granularity::Monthly).is_err());
        assert!(create_date(&"20241301".into(), Granularity::Monthly).is_err());
        assert!(create_date(&FieldValue::Empty, Granularity::Monthly).is_err());
        assert!(create_date(&FieldValue::Number(f64::NAN), Granularity::Monthly).is_err());
    }

    #[test]
    fn test_granularity_reads_lowercase() {
        let g: Granularity = serde_json::from_str("\"daily\"").unwrap();
        assert_eq!(g, Granularity::Daily);
        assert_eq!(Granularity::default(), Granularity::Monthly);
    }
}
