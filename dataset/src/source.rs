//! FILENAME: dataset/src/source.rs
//! PURPOSE: The boundary between a graph model and whatever holds the raw data.

use crate::error::DatasetError;
use crate::value::Record;

/// A dataset that can be grouped along one dimension and summed.
///
/// Callers first `measure` the dimension to group by and then ask for a
/// `breakdown` of a value field. Each returned row holds the measured
/// dimension and the value field. Without a breakdown dimension the value is
/// a number; with one it is a map from category key to number.
pub trait DimensionalData {
    /// Declares the dimension subsequent breakdowns group by.
    fn measure(&mut self, dimension: &str);

    /// Groups the data by the measured dimension, in the dataset's native order.
    fn breakdown(
        &self,
        value_field: &str,
        breakdown_dimension: Option<&str>,
    ) -> Result<Vec<Record>, DatasetError>;
}
