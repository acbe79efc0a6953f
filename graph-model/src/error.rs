//! FILENAME: graph-model/src/error.rs

use dataset::DatasetError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid graph config: {0}")]
    Config(#[from] serde_json::Error),
}

impl From<DatasetError> for GraphError {
    fn from(err: DatasetError) -> Self {
        GraphError::InvalidInput(err.to_string())
    }
}
