use napi::Result as NapiResult;
use napi_derive::napi;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Covenant compliance
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct EvaluateBindingInput {
    ratios: covenant_core::covenant::CovenantRatios,
    #[serde(default)]
    rules: Vec<covenant_core::covenant::CovenantRule>,
    #[serde(default)]
    bands: Option<covenant_core::covenant::SeverityBands>,
}

#[napi]
pub fn evaluate_covenants(input_json: String) -> NapiResult<String> {
    let input: EvaluateBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rules = if input.rules.is_empty() {
        covenant_core::covenant::standard_lma_rules()
    } else {
        input.rules
    };
    let bands = input.bands.unwrap_or_default();
    let output = covenant_core::covenant::evaluate_with_bands(&input.ratios, &rules, &bands)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn derive_ratios(input_json: String) -> NapiResult<String> {
    let metrics: std::collections::BTreeMap<String, covenant_core::FinancialMetric> =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let ratios = covenant_core::covenant::ratios_from_metrics(&metrics);
    serde_json::to_string(&ratios).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Forecasting
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct ForecastBindingInput {
    history: Vec<covenant_core::TimeSeriesPoint>,
    horizon: usize,
}

#[napi]
pub fn forecast_series(input_json: String) -> NapiResult<String> {
    let input: ForecastBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        covenant_core::forecast::forecast(&input.history, input.horizon).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn classify_trend(input_json: String) -> NapiResult<String> {
    let series: Vec<covenant_core::TimeSeriesPoint> =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let trend = covenant_core::forecast::classify_trend(&series);
    serde_json::to_string(&trend).map_err(to_napi_error)
}

#[derive(serde::Deserialize)]
struct MovingAverageBindingInput {
    series: Vec<covenant_core::TimeSeriesPoint>,
    window: usize,
}

#[napi]
pub fn moving_average(input_json: String) -> NapiResult<String> {
    let input: MovingAverageBindingInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let smoothed = covenant_core::forecast::moving_average(&input.series, input.window);
    serde_json::to_string(&smoothed).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Waiver letters
// ---------------------------------------------------------------------------

#[derive(serde::Deserialize)]
struct WaiverBindingInput {
    company_name: String,
    breach: covenant_core::covenant::Breach,
    reporting_period: String,
    date: chrono::NaiveDate,
}

#[napi]
pub fn compose_waiver_letter(input_json: String) -> NapiResult<String> {
    let input: WaiverBindingInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let request =
        covenant_core::waiver::compose(&input.company_name, &input.breach, &input.reporting_period)
            .map_err(to_napi_error)?;
    let letter = covenant_core::waiver::template_letter(&request, input.date);
    serde_json::to_string(&serde_json::json!({
        "request": request,
        "letter": letter,
    }))
    .map_err(to_napi_error)
}
