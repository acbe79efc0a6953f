//! FILENAME: graph-model/src/model.rs
//! Graph Model - one dashboard graph: its config, breakdowns, points and stats.
//!
//! Lifecycle:
//! 1. `GraphModel::new(config)` builds the breakdown registry and picks the
//!    dataset transform (running totals for cumulative metrics).
//! 2. `set_data(dataset)` reshapes the dataset into points and keeps both.
//! 3. Statistics and exports read the stored points on demand, filtered by
//!    the active breakdown's switched-on categories.
//! 4. After `activate_breakdown_if_available`, `refresh()` re-splits the
//!    stored dataset along the newly active breakdown.

use std::future::Future;

use dataset::{DimensionalData, Record};
use log::debug;

use crate::annotations::{Annotation, AnnotationSlot};
use crate::definition::{Breakdown, GraphConfig, Structure};
use crate::error::GraphError;
use crate::export::{download_rows, FlattenMode};
use crate::pipeline::{build_points, DatasetTransform, GraphPoint};
use crate::registry::{ActiveSet, BreakdownRegistry};
use crate::stats::{self, MinMax};

pub struct GraphModel {
    config: GraphConfig,
    registry: BreakdownRegistry,
    transform: DatasetTransform,
    graph_data: Vec<GraphPoint>,
    data: Option<Box<dyn DimensionalData>>,
    annotations: AnnotationSlot,
}

impl GraphModel {
    pub fn new(config: GraphConfig) -> Self {
        let registry = BreakdownRegistry::new(&config.breakdowns);
        let transform = DatasetTransform::for_config(&config);

        GraphModel {
            config,
            registry,
            transform,
            graph_data: Vec::new(),
            data: None,
            annotations: AnnotationSlot::new(),
        }
    }

    // ========================================================================
    // CONFIG
    // ========================================================================

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn area(&self) -> Option<&serde_json::Value> {
        self.config.area.as_ref()
    }

    pub fn dark_color(&self) -> Option<&serde_json::Value> {
        self.config.dark_color.as_ref()
    }

    pub fn transform(&self) -> DatasetTransform {
        self.transform
    }

    // ========================================================================
    // BREAKDOWNS
    // ========================================================================

    pub fn breakdowns(&self) -> &[Breakdown] {
        self.registry.breakdowns()
    }

    pub fn default_breakdown(&self) -> &Breakdown {
        self.registry.default_breakdown()
    }

    pub fn active_breakdown(&self) -> &Breakdown {
        self.registry.active()
    }

    pub fn active_breakdown_values(&self) -> ActiveSet {
        self.registry.active_values()
    }

    /// See `BreakdownRegistry::activate_if_available`. Points are not
    /// rebuilt; call `refresh` to re-split the stored dataset.
    pub fn activate_breakdown_if_available(&mut self, candidate: &Breakdown) -> bool {
        self.registry.activate_if_available(candidate)
    }

    // ========================================================================
    // DATA
    // ========================================================================

    /// Stores the dataset and rebuilds every point from it.
    ///
    /// On error the dataset is still stored but the previous points are kept.
    pub fn set_data<D>(&mut self, data: D) -> Result<(), GraphError>
    where
        D: DimensionalData + 'static,
    {
        self.data = Some(Box::new(data));
        self.refresh()
    }

    /// Rebuilds the points from the stored dataset. A no-op before `set_data`.
    pub fn refresh(&mut self) -> Result<(), GraphError> {
        let Some(data) = self.data.as_deref_mut() else {
            debug!("refresh before set_data, nothing to rebuild");
            return Ok(());
        };

        let breakdown_name = self.registry.active().breakdown_name.as_deref();
        self.graph_data = build_points(data, &self.config, breakdown_name, self.transform)?;
        Ok(())
    }

    pub fn graph_data(&self) -> &[GraphPoint] {
        &self.graph_data
    }

    pub fn data(&self) -> Option<&dyn DimensionalData> {
        self.data.as_deref()
    }

    // ========================================================================
    // STATISTICS
    // ========================================================================

    pub fn aggregate_label(&self) -> &'static str {
        if self.config.additive {
            "Total"
        } else {
            "Average"
        }
    }

    /// Per-point sums of the active categories, last `limit_to_last_n` only.
    pub fn aggregated_values(&self, limit_to_last_n: Option<usize>) -> Vec<f64> {
        stats::aggregated_values(&self.graph_data, &self.registry.active_values(), limit_to_last_n)
    }

    pub fn limited_aggregate(&self, limit_to_last_n: Option<usize>) -> Option<f64> {
        stats::aggregate(&self.aggregated_values(limit_to_last_n), self.config.additive)
    }

    pub fn aggregate(&self) -> Option<f64> {
        self.limited_aggregate(None)
    }

    pub fn change_over_range(&self) -> Option<String> {
        stats::change_over_range(&self.aggregated_values(None))
    }

    /// Axis range. None only for a ranked graph without points.
    pub fn min_max(&self) -> Option<MinMax> {
        match self.config.structure {
            Structure::Top => stats::ranked_min_max(&self.graph_data),
            Structure::Breakdown => Some(stats::breakdown_min_max(
                &self.graph_data,
                &self.registry.active_values(),
            )),
        }
    }

    // ========================================================================
    // EXPORT
    // ========================================================================

    pub fn download_data(&self) -> Vec<Record> {
        self.download_data_with(FlattenMode::FullPath)
    }

    pub fn download_data_with(&self, mode: FlattenMode) -> Vec<Record> {
        download_rows(&self.graph_data, mode)
    }

    // ========================================================================
    // ANNOTATIONS
    // ========================================================================

    pub fn set_annotations<F>(&mut self, fetch: F)
    where
        F: Future<Output = Vec<Annotation>> + Send + 'static,
    {
        self.annotations.set(fetch);
    }

    /// Runs `callback` with the annotations once the pending fetch resolves.
    ///
    /// Returns None when no fetch was set. The callback is not registered
    /// anywhere: it only runs when the returned future is polled, and
    /// dropping the future drops the callback with it.
    #[must_use = "the callback only runs when the returned future is polled"]
    pub fn after_annotations<C, R>(&self, callback: C) -> Option<impl Future<Output = R>>
    where
        C: FnOnce(&[Annotation]) -> R,
    {
        self.annotations.after(callback)
    }
}

impl std::fmt::Debug for GraphModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphModel")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("transform", &self.transform)
            .field("graph_data", &self.graph_data.len())
            .field("has_data", &self.data.is_some())
            .field("annotations", &self.annotations)
            .finish()
    }
}
