use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CovenantError, CovenantResult};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Currency code
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    GBP,
    #[default]
    USD,
    EUR,
    CHF,
    JPY,
    CAD,
    AUD,
    HKD,
    SGD,
    Other(String),
}

impl Currency {
    /// ISO 4217 code for serialisation into collaborator payloads.
    pub fn code(&self) -> &str {
        match self {
            Currency::GBP => "GBP",
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::CHF => "CHF",
            Currency::JPY => "JPY",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::HKD => "HKD",
            Currency::SGD => "SGD",
            Currency::Other(code) => code,
        }
    }

    /// Display prefix used by the currency formatter.
    pub fn symbol(&self) -> String {
        match self {
            Currency::GBP => "£".to_string(),
            Currency::USD => "$".to_string(),
            Currency::EUR => "€".to_string(),
            Currency::JPY => "¥".to_string(),
            Currency::CAD => "C$".to_string(),
            Currency::AUD => "A$".to_string(),
            Currency::HKD => "HK$".to_string(),
            Currency::SGD => "S$".to_string(),
            Currency::CHF => "CHF ".to_string(),
            Currency::Other(code) => format!("{code} "),
        }
    }
}

/// A single financial figure extracted from a lender document.
///
/// Immutable once produced by the extraction collaborator; the confidence
/// score and source page travel with the value for audit purposes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialMetric {
    pub value: Money,
    #[serde(default)]
    pub currency: Currency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

/// Reporting period granularity as stated in the financial document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodType {
    Q1,
    Q2,
    Q3,
    Q4,
    Annual,
    YTD,
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PeriodType::Q1 => "Q1",
            PeriodType::Q2 => "Q2",
            PeriodType::Q3 => "Q3",
            PeriodType::Q4 => "Q4",
            PeriodType::Annual => "Annual",
            PeriodType::YTD => "YTD",
        };
        f.write_str(s)
    }
}

/// The reporting window a set of metrics covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub period_type: PeriodType,
}

impl ReportingPeriod {
    /// Build a period, enforcing start_date <= end_date.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        period_type: PeriodType,
    ) -> CovenantResult<Self> {
        if start_date > end_date {
            return Err(CovenantError::InvalidInput {
                field: "reporting_period".to_string(),
                reason: format!("start_date {start_date} is after end_date {end_date}"),
            });
        }
        Ok(Self {
            start_date,
            end_date,
            period_type,
        })
    }

    /// Human label, e.g. "Q4 2025".
    pub fn label(&self) -> String {
        format!("{} {}", self.period_type, self.end_date.year())
    }
}

/// One point of a covenant-ratio time series. Historical points precede all
/// forecast points; forecast points are appended, never interleaved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesPoint {
    pub period_label: String,
    pub value: f64,
    #[serde(default)]
    pub is_forecast: bool,
}

impl TimeSeriesPoint {
    pub fn historical(period_label: impl Into<String>, value: f64) -> Self {
        Self {
            period_label: period_label.into(),
            value,
            is_forecast: false,
        }
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
