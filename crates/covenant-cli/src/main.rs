mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::covenant::EvaluateArgs;
use commands::forecast::{ForecastArgs, MovingAverageArgs, TrendArgs};
use commands::waiver::WaiverArgs;

/// Loan covenant monitoring calculations
#[derive(Parser)]
#[command(
    name = "covpulse",
    version,
    about = "Loan covenant compliance evaluation and ratio forecasting",
    long_about = "A CLI for loan covenant monitoring: evaluate extracted covenant \
                  ratios against a rule set, project ratio series forward with OLS \
                  linear regression, classify trends, smooth series, and compose \
                  waiver request letters from breach records."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate covenant ratios against a rule set
    Evaluate(EvaluateArgs),
    /// Project a ratio series forward with OLS linear regression
    Forecast(ForecastArgs),
    /// Classify the trend direction of a ratio series
    Trend(TrendArgs),
    /// Smooth a ratio series with a trailing moving average
    MovingAverage(MovingAverageArgs),
    /// Compose a covenant waiver request letter from a breach record
    Waiver(WaiverArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::covenant::run_evaluate(args),
        Commands::Forecast(args) => commands::forecast::run_forecast(args),
        Commands::Trend(args) => commands::forecast::run_trend(args),
        Commands::MovingAverage(args) => commands::forecast::run_moving_average(args),
        Commands::Waiver(args) => commands::waiver::run_waiver(args),
        Commands::Version => {
            println!("covpulse {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
