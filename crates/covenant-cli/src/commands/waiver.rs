use chrono::{Local, NaiveDate};
use clap::Args;
use serde_json::Value;

use covenant_core::covenant::{Breach, SeverityBands};
use covenant_core::waiver;

use crate::input;

/// Arguments for waiver request composition
#[derive(Args)]
pub struct WaiverArgs {
    /// Path to a JSON breach record (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Name of the breached covenant
    #[arg(long)]
    pub covenant_name: Option<String>,

    /// Agreed covenant threshold
    #[arg(long)]
    pub threshold: Option<f64>,

    /// Actual recorded ratio
    #[arg(long)]
    pub actual: Option<f64>,

    /// Borrower company name
    #[arg(long)]
    pub company: String,

    /// Reporting period label, e.g. "Q4 2025"
    #[arg(long)]
    pub period: String,

    /// Letter date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    pub date: Option<NaiveDate>,
}

pub fn run_waiver(args: WaiverArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let breach: Breach = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        let covenant_name = args
            .covenant_name
            .ok_or("--covenant-name is required (or provide --input)")?;
        let threshold = args
            .threshold
            .ok_or("--threshold is required (or provide --input)")?;
        let actual = args
            .actual
            .ok_or("--actual is required (or provide --input)")?;

        if threshold <= 0.0 {
            return Err("--threshold must be positive".into());
        }
        let deviation = (actual - threshold).abs() / threshold;
        Breach {
            covenant_name,
            threshold,
            actual,
            severity: SeverityBands::default().classify(deviation),
        }
    };

    let request = waiver::compose(&args.company, &breach, &args.period)?;
    let date = args.date.unwrap_or_else(|| Local::now().date_naive());
    let letter = waiver::template_letter(&request, date);

    Ok(serde_json::json!({
        "request": request,
        "letter": letter,
    }))
}
