//! FILENAME: graph-model/src/lib.rs
//! Graph model for time-series dashboard charts.
//!
//! This crate reshapes dimensional time-series data into chart points and
//! computes the summary numbers shown next to a chart. It depends on
//! `dataset` for records, the data-source trait and date bucketing.
//!
//! Layers:
//! - `definition`: Serializable configuration (what the graph IS)
//! - `registry`: Breakdowns on offer and which categories are switched on
//! - `pipeline`: Dataset to points (ranked or breakdown, optional running totals)
//! - `stats`: Totals, averages, ranges and percent change over active categories
//! - `export`: Flat key/value rows for tabular downloads
//! - `annotations`: The pending annotation fetch
//! - `model`: `GraphModel`, tying the layers together

pub mod annotations;
pub mod definition;
pub mod error;
pub mod export;
pub mod model;
pub mod pipeline;
pub mod registry;
pub mod stats;


pub use annotations::{Annotation, AnnotationSlot};
pub use definition::*;
pub use error::GraphError;
pub use export::{download_rows, flatten, FlattenMode};
pub use model::GraphModel;
pub use pipeline::{accumulate, build_points, top_x_by_y, DatasetTransform, GraphPoint, SeriesRow, Totals};
pub use registry::{ActiveSet, BreakdownId, BreakdownRegistry, DEFAULT_BREAKDOWN};
pub use stats::MinMax;
