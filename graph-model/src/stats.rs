//! FILENAME: graph-model/src/stats.rs
//! Aggregation & Statistics - summary numbers over graph points.
//!
//! Every statistic only counts the categories in the active set, so switching
//! a category off in the legend changes totals, averages and ranges alike.
//! Results that have no meaningful value on empty data are `Option`s.

use serde::Serialize;
use smallvec::SmallVec;

use crate::pipeline::GraphPoint;
use crate::registry::ActiveSet;

/// Axis range of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

/// Sum of each point's active categories, keeping the last `limit` points.
///
/// No limit, a zero limit and a limit past the end all return every point.
pub fn aggregated_values(points: &[GraphPoint], active: &ActiveSet, limit: Option<usize>) -> Vec<f64> {
    let values: Vec<f64> = points
        .iter()
        .map(|p| {
            p.total
                .iter()
                .filter(|(key, _)| active.contains(key.as_str()))
                .map(|(_, v)| *v)
                .sum::<f64>()
        })
        .collect();

    let keep = match limit {
        Some(n) if n > 0 => n.min(values.len()),
        _ => values.len(),
    };
    values[values.len() - keep..].to_vec()
}

/// Sum when additive, otherwise the mean rounded to one decimal.
/// The mean of no values is None.
pub fn aggregate(values: &[f64], additive: bool) -> Option<f64> {
    let total: f64 = values.iter().sum();
    if additive {
        return Some(total);
    }
    if values.is_empty() {
        return None;
    }
    Some(round_half_up(total / values.len() as f64, 1))
}

/// Percent change from the first to the last value, two decimals.
/// None when there are no values or the first is zero.
///
/// Ties round away from zero (0.125 gives "0.13", -0.125 gives "-0.13").
pub fn change_over_range(values: &[f64]) -> Option<String> {
    let (first, last) = (values.first()?, values.last()?);
    if *first == 0.0 {
        return None;
    }
    let change = (last - first) / first * 100.0;
    let rounded = round_half_up(change.abs(), 2).copysign(change);
    Some(format!("{:.2}", rounded))
}

/// Range over active category values, seeded at zero so the axis always
/// includes zero. Points with no active category are ignored.
pub fn breakdown_min_max(points: &[GraphPoint], active: &ActiveSet) -> MinMax {
    let mut range = MinMax { min: 0.0, max: 0.0 };

    for point in points {
        let values: SmallVec<[f64; 8]> = point
            .total
            .iter()
            .filter(|(key, _)| active.contains(key.as_str()))
            .map(|(_, v)| *v)
            .collect();

        for v in values {
            range.min = range.min.min(v);
            range.max = range.max.max(v);
        }
    }
    range
}

/// Range of ranked points: the head of the rank order is the max, the tail
/// is the min. Points without a numeric rank sort last.
pub fn ranked_min_max(points: &[GraphPoint]) -> Option<MinMax> {
    let mut by_rank: Vec<&GraphPoint> = points.iter().collect();
    by_rank.sort_by(|a, b| match (a.field_f64("rank"), b.field_f64("rank")) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });

    let head = by_rank.first()?;
    let tail = by_rank.last()?;
    Some(MinMax {
        min: tail.total_value().unwrap_or(0.0),
        max: head.total_value().unwrap_or(0.0),
    })
}

/// Rounds halves towards positive infinity, the way dashboards round labels.
pub fn round_half_up(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor + 0.5).floor() / factor
}
