use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Rule types
// ---------------------------------------------------------------------------

/// Comparison direction of a covenant threshold, using the wire spelling of
/// the extraction payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CovenantOperator {
    /// Actual must not exceed threshold.
    #[serde(rename = "<=")]
    AtMost,
    /// Actual must not fall below threshold.
    #[serde(rename = ">=")]
    AtLeast,
}

/// A single covenant threshold. Rules are tagged data injected into the
/// evaluator, never compiled-in policy; thresholds must be positive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CovenantRule {
    pub covenant_name: String,
    pub ratio_key: String,
    pub operator: CovenantOperator,
    pub threshold: f64,
}

impl CovenantRule {
    pub fn new(
        covenant_name: impl Into<String>,
        ratio_key: impl Into<String>,
        operator: CovenantOperator,
        threshold: f64,
    ) -> Self {
        Self {
            covenant_name: covenant_name.into(),
            ratio_key: ratio_key.into(),
            operator,
            threshold,
        }
    }
}

/// The default LMA-style rule set used by the original monitoring prompt:
/// leverage capped at 3.5x, interest coverage floored at 4.0x.
pub fn standard_lma_rules() -> Vec<CovenantRule> {
    vec![
        CovenantRule::new(
            "Maximum Leverage Ratio",
            "leverage_ratio",
            CovenantOperator::AtMost,
            3.5,
        ),
        CovenantRule::new(
            "Minimum Interest Coverage",
            "interest_coverage",
            CovenantOperator::AtLeast,
            4.0,
        ),
    ]
}

// ---------------------------------------------------------------------------
// Severity policy
// ---------------------------------------------------------------------------

/// Breach severity tier. Ordered: Minor < Major < Critical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Major,
    Critical,
}

/// Fractional-deviation breakpoints for severity classification.
///
/// A breach with deviation d = |actual - threshold| / threshold is Minor when
/// d < minor_below, Major when d < major_below, Critical otherwise. The
/// defaults (10% / 25%) are policy constants, not a lender contract, and can
/// be overridden per evaluation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SeverityBands {
    pub minor_below: f64,
    pub major_below: f64,
}

impl Default for SeverityBands {
    fn default() -> Self {
        Self {
            minor_below: 0.10,
            major_below: 0.25,
        }
    }
}

impl SeverityBands {
    pub fn classify(&self, deviation: f64) -> Severity {
        if deviation < self.minor_below {
            Severity::Minor
        } else if deviation < self.major_below {
            Severity::Major
        } else {
            Severity::Critical
        }
    }
}

// ---------------------------------------------------------------------------
// Headroom status
// ---------------------------------------------------------------------------

/// Traffic-light status for a single covenant, including the
/// approaching-threshold band shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadroomStatus {
    Compliant,
    Warning,
    Breach,
}

/// Classify how close an actual ratio sits to its threshold. The warning band
/// is the last 10% of headroom before the limit.
pub fn headroom_status(actual: f64, threshold: f64, operator: CovenantOperator) -> HeadroomStatus {
    let (breached, warning) = match operator {
        CovenantOperator::AtMost => (actual > threshold, actual > threshold * 0.9),
        CovenantOperator::AtLeast => (actual < threshold, actual < threshold * 1.1),
    };

    if breached {
        HeadroomStatus::Breach
    } else if warning {
        HeadroomStatus::Warning
    } else {
        HeadroomStatus::Compliant
    }
}
