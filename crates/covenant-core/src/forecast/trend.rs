use serde::{Deserialize, Serialize};

use super::linear::linear_regression;
use crate::types::TimeSeriesPoint;

/// Direction of a ratio series over its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Slope-to-mean ratio below which a series counts as stable.
const STABILITY_THRESHOLD: f64 = 0.05;

/// Classify the direction of a series from its OLS slope relative to the
/// series mean. Fewer than two points, or a zero mean, is Stable.
pub fn classify_trend(series: &[TimeSeriesPoint]) -> Trend {
    if series.len() < 2 {
        return Trend::Stable;
    }

    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    let (slope, _) = linear_regression(&values);

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean == 0.0 {
        return Trend::Stable;
    }

    let relative_slope = slope.abs() / mean;
    if relative_slope < STABILITY_THRESHOLD {
        return Trend::Stable;
    }

    if slope > 0.0 {
        Trend::Up
    } else {
        Trend::Down
    }
}

/// Period-over-period change in percent; zero when the base value is zero.
pub fn percentage_change(old_value: f64, new_value: f64) -> f64 {
    if old_value == 0.0 {
        return 0.0;
    }
    (new_value - old_value) / old_value * 100.0
}
