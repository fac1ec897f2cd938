pub mod evaluator;
pub mod rules;

pub use evaluator::{
    evaluate, evaluate_with_bands, ratios_from_metrics, Breach, ComplianceResult, CovenantRatios,
};
pub use rules::{
    headroom_status, standard_lma_rules, CovenantOperator, CovenantRule, HeadroomStatus, Severity,
    SeverityBands,
};
