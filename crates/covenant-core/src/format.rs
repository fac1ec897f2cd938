use rust_decimal::RoundingStrategy;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::{Currency, Money, TimeSeriesPoint};

/// Render a monetary value for dashboard display: currency symbol, thousands
/// grouping and a fixed single decimal. Values already scaled to millions get
/// an "M" suffix; raw values are scaled down without one.
///
/// The output is locale-stable so display strings can be asserted in tests.
pub fn format_currency(value: Money, currency: &Currency, in_millions: bool) -> String {
    let display_value = if in_millions {
        value
    } else {
        value / dec!(1_000_000)
    };

    let rounded = display_value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    let suffix = if in_millions { "M" } else { "" };
    format!(
        "{}{}{}",
        currency.symbol(),
        group_thousands(&format!("{rounded:.1}")),
        suffix
    )
}

/// Render a covenant ratio fixed to `decimals` places with the conventional
/// "x" suffix, e.g. 4.5 -> "4.50x".
pub fn format_ratio(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}x")
}

/// Chart row with historical and forecast values split into separate fields,
/// so the two render as distinct lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub historical: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forecast: Option<f64>,
}

/// Split a combined series into chart rows.
pub fn chart_points(series: &[TimeSeriesPoint]) -> Vec<ChartPoint> {
    series
        .iter()
        .map(|point| ChartPoint {
            name: point.period_label.clone(),
            historical: (!point.is_forecast).then_some(point.value),
            forecast: point.is_forecast.then_some(point.value),
        })
        .collect()
}

/// Insert thousands separators into the integer part of a fixed-point
/// decimal string.
fn group_thousands(fixed: &str) -> String {
    let (sign, unsigned) = match fixed.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", fixed),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}
