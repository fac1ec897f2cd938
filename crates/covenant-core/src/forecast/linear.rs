use std::time::Instant;

use crate::{types::*, CovenantError, CovenantResult};

/// Calendar-month labels recognised by the forecaster. Labels advance through
/// this table cyclically; anything else gets a synthetic "M+k" label.
pub(crate) const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Minimum number of historical points before a projection is attempted.
const MIN_HISTORY: usize = 3;

/// Ordinary least squares over x = 0..n-1, returning (slope, intercept).
///
/// Callers must supply at least two values so the denominator is non-zero.
pub fn linear_regression(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut sum_xy = 0.0;
    let mut sum_xx = 0.0;
    for (i, y) in values.iter().enumerate() {
        let x = i as f64;
        sum_x += x;
        sum_y += y;
        sum_xy += x * y;
        sum_xx += x * x;
    }

    let slope = (n * sum_xy - sum_x * sum_y) / (n * sum_xx - sum_x * sum_x);
    let intercept = (sum_y - slope * sum_x) / n;
    (slope, intercept)
}

/// Project a historical ratio series `horizon` periods forward with an OLS
/// linear fit.
///
/// Fewer than three historical points returns the series unchanged; too
/// little data for a meaningful projection is a policy outcome, not an
/// error. Projections are rounded to one decimal and clamped at zero, since
/// ratios and exposures cannot go negative. Historical points come back
/// untouched, with forecast points appended after them.
pub fn forecast(
    history: &[TimeSeriesPoint],
    horizon: usize,
) -> CovenantResult<ComputationOutput<Vec<TimeSeriesPoint>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    for point in history {
        if point.is_forecast {
            return Err(CovenantError::InvalidInput {
                field: "history".to_string(),
                reason: format!(
                    "point '{}' is already a forecast; supply historical data only",
                    point.period_label
                ),
            });
        }
        if !point.value.is_finite() {
            return Err(CovenantError::InvalidMetric {
                name: point.period_label.clone(),
                value: point.value,
            });
        }
    }

    let mut combined: Vec<TimeSeriesPoint> = history.to_vec();

    if history.len() < MIN_HISTORY {
        warnings.push(format!(
            "Only {} historical points; at least {MIN_HISTORY} required, forecast not attempted.",
            history.len()
        ));
    } else {
        let values: Vec<f64> = history.iter().map(|p| p.value).collect();
        let (slope, intercept) = linear_regression(&values);
        let n = values.len();
        let last_label = &history[n - 1].period_label;

        for k in 1..=horizon {
            let predicted = intercept + slope * (n + k - 1) as f64;
            combined.push(TimeSeriesPoint {
                period_label: advance_month_label(last_label, k),
                value: round_1dp(predicted).max(0.0),
                is_forecast: true,
            });
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "history_points": history.len(),
        "horizon": horizon,
    });

    Ok(with_metadata(
        "OLS Linear Regression Forecast",
        &assumptions,
        warnings,
        elapsed,
        combined,
    ))
}

/// Smooth a series with a trailing moving average, rounded to one decimal.
/// Points before the window fills retain their original values; a series
/// shorter than the window is returned unchanged.
pub fn moving_average(series: &[TimeSeriesPoint], window: usize) -> Vec<TimeSeriesPoint> {
    if window == 0 || series.len() < window {
        return series.to_vec();
    }

    series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            if i < window - 1 {
                return point.clone();
            }
            let sum: f64 = series[i + 1 - window..=i].iter().map(|p| p.value).sum();
            TimeSeriesPoint {
                value: round_1dp(sum / window as f64),
                ..point.clone()
            }
        })
        .collect()
}

/// Advance a month label `ahead` months through the cyclic month table.
fn advance_month_label(last_label: &str, ahead: usize) -> String {
    match MONTH_NAMES.iter().position(|m| last_label.starts_with(m)) {
        Some(idx) => MONTH_NAMES[(idx + ahead) % 12].to_string(),
        None => format!("M+{ahead}"),
    }
}

fn round_1dp(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn series(labels_values: &[(&str, f64)]) -> Vec<TimeSeriesPoint> {
        labels_values
            .iter()
            .map(|(label, v)| TimeSeriesPoint::historical(*label, *v))
            .collect()
    }

    #[test]
    fn test_regression_on_perfect_line() {
        // y = 2x + 1
        let (slope, intercept) = linear_regression(&[1.0, 3.0, 5.0, 7.0]);
        assert!((slope - 2.0).abs() < 1e-12);
        assert!((intercept - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_regression_on_flat_series() {
        let (slope, intercept) = linear_regression(&[4.0, 4.0, 4.0]);
        assert!(slope.abs() < 1e-12);
        assert!((intercept - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_forecast_appends_horizon_points() {
        let history = series(&[("Jan", 3.0), ("Feb", 3.5), ("Mar", 4.0)]);
        let result = forecast(&history, 2).unwrap().result;
        assert_eq!(result.len(), 5);
        assert!(result[..3].iter().all(|p| !p.is_forecast));
        assert!(result[3..].iter().all(|p| p.is_forecast));
        // Historical points come back untouched.
        assert_eq!(&result[..3], &history[..]);
    }

    #[test]
    fn test_forecast_zero_horizon_is_identity() {
        let history = series(&[("Jan", 3.0), ("Feb", 3.5), ("Mar", 4.0)]);
        let result = forecast(&history, 0).unwrap().result;
        assert_eq!(result, history);
    }

    #[test]
    fn test_short_history_returned_unchanged() {
        let history = series(&[("Jan", 3.0), ("Feb", 3.5)]);
        let output = forecast(&history, 3).unwrap();
        assert_eq!(output.result, history);
        assert!(output.warnings.iter().any(|w| w.contains("forecast not attempted")));
    }

    #[test]
    fn test_nine_month_leverage_projection() {
        // Portfolio risk history from May..Jan relabelled Jan..Sep; OLS gives
        // slope 72/540 and intercept 29/9, so the next three projections land
        // on 4.4, 4.6 and 4.7 after one-decimal rounding.
        let history = series(&[
            ("Jan", 3.2),
            ("Feb", 3.4),
            ("Mar", 3.1),
            ("Apr", 3.8),
            ("May", 4.0),
            ("Jun", 3.9),
            ("Jul", 4.1),
            ("Aug", 4.3),
            ("Sep", 4.0),
        ]);
        let result = forecast(&history, 3).unwrap().result;
        assert_eq!(result.len(), 12);

        let projected: Vec<(&str, f64, bool)> = result[9..]
            .iter()
            .map(|p| (p.period_label.as_str(), p.value, p.is_forecast))
            .collect();
        assert_eq!(
            projected,
            vec![("Oct", 4.4, true), ("Nov", 4.6, true), ("Dec", 4.7, true)]
        );
    }

    #[test]
    fn test_month_labels_wrap_across_year_end() {
        let history = series(&[("Oct", 3.0), ("Nov", 3.0), ("Dec", 3.0)]);
        let result = forecast(&history, 3).unwrap().result;
        let labels: Vec<&str> = result[3..].iter().map(|p| p.period_label.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar"]);
    }

    #[test]
    fn test_unknown_label_gets_synthetic_names() {
        let history = series(&[("P1", 3.0), ("P2", 3.5), ("P3", 4.0)]);
        let result = forecast(&history, 2).unwrap().result;
        let labels: Vec<&str> = result[3..].iter().map(|p| p.period_label.as_str()).collect();
        assert_eq!(labels, vec!["M+1", "M+2"]);
    }

    #[test]
    fn test_negative_projection_clamped_to_zero() {
        // Steep downtrend: the fit goes negative well inside the horizon.
        let history = series(&[("Jan", 9.0), ("Feb", 6.0), ("Mar", 3.0)]);
        let result = forecast(&history, 4).unwrap().result;
        assert!(result[3..].iter().all(|p| p.value >= 0.0));
        assert_eq!(result[4].value, 0.0);
    }

    #[test]
    fn test_forecast_point_in_history_rejected() {
        let mut history = series(&[("Jan", 3.0), ("Feb", 3.5), ("Mar", 4.0)]);
        history[2].is_forecast = true;
        let err = forecast(&history, 1).unwrap_err();
        assert!(matches!(err, CovenantError::InvalidInput { .. }));
    }

    #[test]
    fn test_non_finite_history_rejected() {
        let history = series(&[("Jan", 3.0), ("Feb", f64::NAN), ("Mar", 4.0)]);
        let err = forecast(&history, 1).unwrap_err();
        match err {
            CovenantError::InvalidMetric { name, .. } => assert_eq!(name, "Feb"),
            other => panic!("Expected InvalidMetric, got {other:?}"),
        }
    }

    #[test]
    fn test_forecast_is_deterministic() {
        let history = series(&[("Jan", 3.2), ("Feb", 3.4), ("Mar", 3.1), ("Apr", 3.8)]);
        let a = forecast(&history, 3).unwrap().result;
        let b = forecast(&history, 3).unwrap().result;
        assert_eq!(a, b);
    }

    #[test]
    fn test_moving_average_smooths_trailing_window() {
        let data = series(&[("Jan", 3.0), ("Feb", 4.0), ("Mar", 5.0), ("Apr", 6.0)]);
        let smoothed = moving_average(&data, 3);
        let values: Vec<f64> = smoothed.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![3.0, 4.0, 4.0, 5.0]);
        // Labels and flags survive smoothing.
        assert_eq!(smoothed[2].period_label, "Mar");
    }

    #[test]
    fn test_moving_average_short_series_unchanged() {
        let data = series(&[("Jan", 3.0), ("Feb", 4.0)]);
        assert_eq!(moving_average(&data, 3), data);
    }

    #[test]
    fn test_moving_average_zero_window_unchanged() {
        let data = series(&[("Jan", 3.0), ("Feb", 4.0)]);
        assert_eq!(moving_average(&data, 0), data);
    }
}
