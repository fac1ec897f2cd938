use clap::Args;
use serde::Deserialize;
use serde_json::Value;

use covenant_core::covenant::{self, CovenantRatios, CovenantRule};

use crate::input;

/// Arguments for covenant evaluation
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to a JSON file with `ratios` and `rules` (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Ratio as key=value, repeatable (e.g. --ratio leverage_ratio=5.8)
    #[arg(long = "ratio", value_name = "KEY=VALUE")]
    pub ratios: Vec<String>,

    /// Test against the standard LMA rule set (leverage <= 3.5x, interest
    /// coverage >= 4.0x) when the input carries no rules
    #[arg(long)]
    pub standard_lma: bool,
}

#[derive(Deserialize)]
struct EvaluateInput {
    ratios: CovenantRatios,
    #[serde(default)]
    rules: Vec<CovenantRule>,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut evaluate_input: EvaluateInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        EvaluateInput {
            ratios: parse_ratio_flags(&args.ratios)?,
            rules: Vec::new(),
        }
    };

    if evaluate_input.rules.is_empty() && args.standard_lma {
        evaluate_input.rules = covenant::standard_lma_rules();
    }
    if evaluate_input.rules.is_empty() {
        return Err(
            "no covenant rules given; supply `rules` in the input or pass --standard-lma".into(),
        );
    }

    let result = covenant::evaluate(&evaluate_input.ratios, &evaluate_input.rules)?;
    Ok(serde_json::to_value(result)?)
}

fn parse_ratio_flags(pairs: &[String]) -> Result<CovenantRatios, Box<dyn std::error::Error>> {
    if pairs.is_empty() {
        return Err("provide --input, piped JSON, or at least one --ratio".into());
    }

    let mut ratios = CovenantRatios::new();
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("--ratio '{pair}' is not in key=value form"))?;
        let parsed: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("--ratio '{pair}' has a non-numeric value"))?;
        ratios.insert(key.trim().to_string(), parsed);
    }
    Ok(ratios)
}
