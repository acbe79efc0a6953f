//! FILENAME: dataset/src/lib.rs
//! PURPOSE: Shared record types and the data-source boundary for graph models.
//! CONTEXT: A graph model never reads raw observations itself. It asks a
//! `DimensionalData` source to group them (`measure`) and sum a value field
//! (`breakdown`), then buckets each row's timestamp with `create_date`.

pub mod error;
pub mod memory;
pub mod source;
pub mod time;
pub mod value;

pub use error::DatasetError;
pub use memory::MemoryDataset;
pub use source::DimensionalData;
pub use time::{create_date, parse_timestamp, Granularity};
pub use value::{records_from_json, FieldValue, Record};
