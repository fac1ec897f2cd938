use clap::Args;
use serde_json::Value;

use covenant_core::forecast;
use covenant_core::TimeSeriesPoint;

use crate::input;

/// Arguments for OLS forecasting
#[derive(Args)]
pub struct ForecastArgs {
    /// Path to a JSON array of series points (or pipe via stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Number of periods to project forward
    #[arg(long, default_value_t = 3)]
    pub horizon: usize,
}

/// Arguments for trend classification
#[derive(Args)]
pub struct TrendArgs {
    /// Path to a JSON array of series points (or pipe via stdin)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for moving-average smoothing
#[derive(Args)]
pub struct MovingAverageArgs {
    /// Path to a JSON array of series points (or pipe via stdin)
    #[arg(long)]
    pub input: Option<String>,

    /// Trailing window length
    #[arg(long, default_value_t = 3)]
    pub window: usize,
}

pub fn run_forecast(args: ForecastArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series = read_series(args.input.as_deref())?;
    let result = forecast::forecast(&series, args.horizon)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_trend(args: TrendArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series = read_series(args.input.as_deref())?;
    let trend = forecast::classify_trend(&series);
    Ok(serde_json::json!({
        "trend": trend,
        "observations": series.len(),
    }))
}

pub fn run_moving_average(args: MovingAverageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let series = read_series(args.input.as_deref())?;
    let smoothed = forecast::moving_average(&series, args.window);
    Ok(serde_json::to_value(smoothed)?)
}

fn read_series(path: Option<&str>) -> Result<Vec<TimeSeriesPoint>, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        return input::file::read_json(path);
    }
    if let Some(data) = input::stdin::read_stdin()? {
        return Ok(serde_json::from_value(data)?);
    }
    Err("a series is required; pass --input or pipe a JSON array via stdin".into())
}
