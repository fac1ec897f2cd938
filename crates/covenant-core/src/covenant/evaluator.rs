use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use super::rules::{CovenantOperator, CovenantRule, SeverityBands, Severity};
use crate::{types::*, CovenantError, CovenantResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Named covenant ratios as delivered by the extraction collaborator,
/// e.g. "leverage_ratio" -> 5.8. Ordered for deterministic serialisation.
pub type CovenantRatios = BTreeMap<String, f64>;

/// A single covenant violation. Created only by the evaluator and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breach {
    pub covenant_name: String,
    pub threshold: f64,
    pub actual: f64,
    pub severity: Severity,
}

/// Verdict over a full rule set. Invariant: is_compliant holds exactly when
/// breaches is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    pub is_compliant: bool,
    pub breaches: Vec<Breach>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Evaluate extracted covenant ratios against a rule set using the default
/// severity bands.
pub fn evaluate(
    ratios: &CovenantRatios,
    rules: &[CovenantRule],
) -> CovenantResult<ComputationOutput<ComplianceResult>> {
    evaluate_with_bands(ratios, rules, &SeverityBands::default())
}

/// Evaluate extracted covenant ratios against a rule set.
///
/// Rules whose ratio key is absent from `ratios` are skipped with a warning:
/// missing data is not non-compliance. A non-finite ratio referenced by a
/// rule is a data-integrity failure and aborts the evaluation. Breaches are
/// emitted in rule declaration order.
pub fn evaluate_with_bands(
    ratios: &CovenantRatios,
    rules: &[CovenantRule],
    bands: &SeverityBands,
) -> CovenantResult<ComputationOutput<ComplianceResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if rules.is_empty() {
        warnings.push("No covenant rules provided; nothing was tested.".to_string());
    }

    let mut breaches: Vec<Breach> = Vec::new();

    for rule in rules {
        if rule.threshold <= 0.0 {
            return Err(CovenantError::InvalidInput {
                field: "threshold".to_string(),
                reason: format!(
                    "covenant '{}' has non-positive threshold {}",
                    rule.covenant_name, rule.threshold
                ),
            });
        }

        let actual = match ratios.get(&rule.ratio_key) {
            Some(v) => *v,
            None => {
                warnings.push(format!(
                    "Covenant '{}': ratio '{}' not present in extracted ratios; skipped.",
                    rule.covenant_name, rule.ratio_key
                ));
                continue;
            }
        };

        if !actual.is_finite() {
            return Err(CovenantError::InvalidMetric {
                name: rule.ratio_key.clone(),
                value: actual,
            });
        }

        let violated = match rule.operator {
            CovenantOperator::AtMost => actual > rule.threshold,
            CovenantOperator::AtLeast => actual < rule.threshold,
        };

        if violated {
            let deviation = (actual - rule.threshold).abs() / rule.threshold;
            breaches.push(Breach {
                covenant_name: rule.covenant_name.clone(),
                threshold: rule.threshold,
                actual,
                severity: bands.classify(deviation),
            });
        }
    }

    let is_compliant = breaches.is_empty();
    let output = ComplianceResult {
        is_compliant,
        breaches,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "rule_count": rules.len(),
        "severity_bands": bands,
    });

    Ok(with_metadata(
        "Covenant Compliance Evaluation",
        &assumptions,
        warnings,
        elapsed,
        output,
    ))
}

/// Recompute the standard covenant ratios from named financial metrics.
///
/// leverage_ratio = net_debt / ebitda, interest_coverage = ebitda /
/// interest_expense, debt_service_coverage = ebitda / debt_service. Ratios
/// whose inputs are missing or whose denominator is zero are simply omitted;
/// the evaluator treats absent ratios as untestable.
pub fn ratios_from_metrics(metrics: &BTreeMap<String, FinancialMetric>) -> CovenantRatios {
    let mut ratios = CovenantRatios::new();

    let value = |key: &str| metrics.get(key).and_then(|m| m.value.to_f64());

    if let (Some(net_debt), Some(ebitda)) = (value("net_debt"), value("ebitda")) {
        if ebitda != 0.0 {
            ratios.insert("leverage_ratio".to_string(), net_debt / ebitda);
        }
    }

    if let (Some(ebitda), Some(interest)) = (value("ebitda"), value("interest_expense")) {
        if interest != 0.0 {
            ratios.insert("interest_coverage".to_string(), ebitda / interest);
        }
    }

    if let (Some(ebitda), Some(debt_service)) = (value("ebitda"), value("debt_service")) {
        if debt_service != 0.0 {
            ratios.insert("debt_service_coverage".to_string(), ebitda / debt_service);
        }
    }

    ratios
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covenant::rules::standard_lma_rules;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn ratios(pairs: &[(&str, f64)]) -> CovenantRatios {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    fn leverage_rule(threshold: f64) -> CovenantRule {
        CovenantRule::new(
            "Maximum Leverage Ratio",
            "leverage_ratio",
            CovenantOperator::AtMost,
            threshold,
        )
    }

    #[test]
    fn test_critical_leverage_breach() {
        // 5.8 vs a 4.5 cap: deviation 1.3 / 4.5 ≈ 28.9% => critical
        let result = evaluate(&ratios(&[("leverage_ratio", 5.8)]), &[leverage_rule(4.5)]).unwrap();
        let compliance = &result.result;

        assert!(!compliance.is_compliant);
        assert_eq!(compliance.breaches.len(), 1);
        let b = &compliance.breaches[0];
        assert_eq!(b.actual, 5.8);
        assert_eq!(b.threshold, 4.5);
        assert_eq!(b.severity, Severity::Critical);
    }

    #[test]
    fn test_boundary_value_is_compliant() {
        let result = evaluate(&ratios(&[("leverage_ratio", 4.5)]), &[leverage_rule(4.5)]).unwrap();
        assert!(result.result.is_compliant);
        assert!(result.result.breaches.is_empty());
    }

    #[test]
    fn test_min_covenant_boundary_is_compliant() {
        let rule = CovenantRule::new(
            "Minimum Interest Coverage",
            "interest_coverage",
            CovenantOperator::AtLeast,
            4.0,
        );
        let result = evaluate(&ratios(&[("interest_coverage", 4.0)]), &[rule]).unwrap();
        assert!(result.result.is_compliant);
    }

    #[test]
    fn test_minor_and_major_tiers() {
        // 4.7 vs 4.5 cap: deviation ~4.4% => minor
        let minor = evaluate(&ratios(&[("leverage_ratio", 4.7)]), &[leverage_rule(4.5)]).unwrap();
        assert_eq!(minor.result.breaches[0].severity, Severity::Minor);

        // 5.2 vs 4.5 cap: deviation ~15.6% => major
        let major = evaluate(&ratios(&[("leverage_ratio", 5.2)]), &[leverage_rule(4.5)]).unwrap();
        assert_eq!(major.result.breaches[0].severity, Severity::Major);
    }

    #[test]
    fn test_missing_ratio_skipped_with_warning() {
        let rules = standard_lma_rules();
        let result = evaluate(&ratios(&[("leverage_ratio", 2.8)]), &rules).unwrap();

        // Interest coverage was never extracted: no breach, only a warning.
        assert!(result.result.is_compliant);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("interest_coverage")));
    }

    #[test]
    fn test_non_finite_ratio_is_an_error() {
        let err = evaluate(
            &ratios(&[("leverage_ratio", f64::NAN)]),
            &[leverage_rule(4.5)],
        )
        .unwrap_err();
        match err {
            CovenantError::InvalidMetric { name, .. } => assert_eq!(name, "leverage_ratio"),
            other => panic!("Expected InvalidMetric, got {other:?}"),
        }

        let err = evaluate(
            &ratios(&[("leverage_ratio", f64::INFINITY)]),
            &[leverage_rule(4.5)],
        )
        .unwrap_err();
        assert!(matches!(err, CovenantError::InvalidMetric { .. }));
    }

    #[test]
    fn test_non_finite_ratio_not_referenced_by_any_rule_is_ignored() {
        let result = evaluate(
            &ratios(&[("leverage_ratio", 2.0), ("dscr", f64::NAN)]),
            &[leverage_rule(4.5)],
        )
        .unwrap();
        assert!(result.result.is_compliant);
    }

    #[test]
    fn test_non_positive_threshold_rejected() {
        let err = evaluate(&ratios(&[("leverage_ratio", 2.0)]), &[leverage_rule(0.0)])
            .unwrap_err();
        assert!(matches!(err, CovenantError::InvalidInput { .. }));
    }

    #[test]
    fn test_breach_order_follows_rule_declaration_order() {
        let rules = vec![
            CovenantRule::new("Min DSCR", "debt_service_coverage", CovenantOperator::AtLeast, 1.2),
            leverage_rule(4.5),
            CovenantRule::new(
                "Minimum Interest Coverage",
                "interest_coverage",
                CovenantOperator::AtLeast,
                4.0,
            ),
        ];
        let result = evaluate(
            &ratios(&[
                ("leverage_ratio", 5.8),
                ("interest_coverage", 3.2),
                ("debt_service_coverage", 0.9),
            ]),
            &rules,
        )
        .unwrap();

        let names: Vec<&str> = result
            .result
            .breaches
            .iter()
            .map(|b| b.covenant_name.as_str())
            .collect();
        assert_eq!(
            names,
            vec!["Min DSCR", "Maximum Leverage Ratio", "Minimum Interest Coverage"]
        );
    }

    #[test]
    fn test_is_compliant_iff_no_breaches() {
        let rules = standard_lma_rules();
        for leverage in [1.0, 3.5, 3.6, 5.8] {
            let result = evaluate(&ratios(&[("leverage_ratio", leverage)]), &rules).unwrap();
            assert_eq!(
                result.result.is_compliant,
                result.result.breaches.is_empty()
            );
        }
    }

    #[test]
    fn test_empty_rule_set_is_trivially_compliant() {
        let result = evaluate(&ratios(&[("leverage_ratio", 9.9)]), &[]).unwrap();
        assert!(result.result.is_compliant);
        assert!(result.warnings.iter().any(|w| w.contains("No covenant rules")));
    }

    #[test]
    fn test_custom_bands_reclassify() {
        let bands = SeverityBands {
            minor_below: 0.50,
            major_below: 0.75,
        };
        let result = evaluate_with_bands(
            &ratios(&[("leverage_ratio", 5.8)]),
            &[leverage_rule(4.5)],
            &bands,
        )
        .unwrap();
        // 28.9% deviation is minor under the loosened bands
        assert_eq!(result.result.breaches[0].severity, Severity::Minor);
    }

    #[test]
    fn test_metadata_populated() {
        let result = evaluate(&ratios(&[("leverage_ratio", 2.0)]), &[leverage_rule(3.5)]).unwrap();
        assert!(!result.methodology.is_empty());
        assert_eq!(result.metadata.precision, "rust_decimal_128bit");
    }

    #[test]
    fn test_ratios_from_metrics() {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "net_debt".to_string(),
            FinancialMetric {
                value: dec!(301.6),
                currency: Currency::USD,
                source_page: Some(7),
                confidence: Some(0.90),
            },
        );
        metrics.insert(
            "ebitda".to_string(),
            FinancialMetric {
                value: dec!(52),
                currency: Currency::USD,
                source_page: Some(5),
                confidence: Some(0.92),
            },
        );

        let ratios = ratios_from_metrics(&metrics);
        let leverage = ratios["leverage_ratio"];
        assert!((leverage - 5.8).abs() < 1e-9);
        // No interest expense extracted: coverage omitted, not zero.
        assert!(!ratios.contains_key("interest_coverage"));
    }

    #[test]
    fn test_ratios_from_metrics_zero_denominator_omitted() {
        let mut metrics = BTreeMap::new();
        metrics.insert(
            "net_debt".to_string(),
            FinancialMetric {
                value: dec!(100),
                currency: Currency::USD,
                source_page: None,
                confidence: None,
            },
        );
        metrics.insert(
            "ebitda".to_string(),
            FinancialMetric {
                value: dec!(0),
                currency: Currency::USD,
                source_page: None,
                confidence: None,
            },
        );

        let ratios = ratios_from_metrics(&metrics);
        assert!(!ratios.contains_key("leverage_ratio"));
    }
}
