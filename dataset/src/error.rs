//! FILENAME: dataset/src/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DatasetError {
    #[error("Field not found: {0}")]
    MissingField(String),

    #[error("Field is not numeric: {0}")]
    NotNumeric(String),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("No dimension has been measured")]
    NoMeasure,
}
