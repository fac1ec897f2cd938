use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::covenant::Breach;
use crate::{CovenantError, CovenantResult};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// The breach facts carried into a waiver request. A snapshot, detached from
/// the evaluation result that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreachSnapshot {
    pub covenant_name: String,
    pub threshold: f64,
    pub actual: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lender_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub borrower_representative: Option<String>,
}

/// Everything the letter-drafting collaborator needs to produce a waiver
/// request letter. Built at user-trigger time from a single breach; the core
/// does not persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaiverLetterRequest {
    pub company_name: String,
    pub breach_details: BreachSnapshot,
    pub reporting_period: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<ContactInfo>,
}

/// Drafts the actual letter text from a composed request. Implementations
/// wrap an external generative model; `template_letter` is the offline
/// fallback.
pub trait LetterDrafter {
    fn draft(&self, request: &WaiverLetterRequest) -> CovenantResult<String>;
}

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Assemble a waiver request from a breach record.
///
/// The threshold must be positive: the deviation percentage quoted in the
/// letter divides by it.
pub fn compose(
    company_name: &str,
    breach: &Breach,
    reporting_period_label: &str,
) -> CovenantResult<WaiverLetterRequest> {
    if breach.threshold <= 0.0 {
        return Err(CovenantError::Composition(format!(
            "covenant '{}' has non-positive threshold {}; cannot quote a deviation percentage",
            breach.covenant_name, breach.threshold
        )));
    }

    Ok(WaiverLetterRequest {
        company_name: company_name.to_string(),
        breach_details: BreachSnapshot {
            covenant_name: breach.covenant_name.clone(),
            threshold: breach.threshold,
            actual: breach.actual,
        },
        reporting_period: reporting_period_label.to_string(),
        contact_info: None,
    })
}

/// Deterministic LMA-style waiver letter used when no drafting collaborator
/// is configured. The date is injected so output is reproducible.
pub fn template_letter(request: &WaiverLetterRequest, date: NaiveDate) -> String {
    let details = &request.breach_details;
    let deviation_pct =
        (details.actual - details.threshold).abs() / details.threshold * 100.0;
    let addressee = request
        .contact_info
        .as_ref()
        .and_then(|c| c.lender_name.as_deref())
        .unwrap_or("The Lender Group");

    format!(
        "{date}\n\n\
         {addressee}\n\
         [Lender Address]\n\n\
         Dear Sirs/Madams,\n\n\
         Re: Waiver Request - {covenant} Covenant Breach\n\n\
         We write to you on behalf of {company} (\"the Company\") to formally request a \
         waiver in respect of a covenant breach identified in our recent compliance testing.\n\n\
         During the {period} reporting period, the Company recorded a {covenant} of \
         {actual:.2}x against the agreed threshold of {threshold:.2}x, a deviation of \
         approximately {deviation:.1}%.\n\n\
         The Company has implemented corrective measures including enhanced cash flow \
         management and cost optimisation initiatives to ensure future compliance. We are \
         confident that the Company's financial position remains fundamentally sound, and we \
         project full compliance with all covenant requirements from the next reporting \
         period onwards.\n\n\
         In light of these circumstances, we respectfully request that {addressee} grant a \
         one-time waiver for this covenant breach. We remain committed to transparent \
         reporting and would be pleased to provide any additional information at your \
         convenience.\n\n\
         Yours faithfully,\n\n\
         _______________________\n\
         {signatory}\n\
         {company}",
        date = date.format("%d %B %Y"),
        addressee = addressee,
        covenant = details.covenant_name,
        company = request.company_name,
        period = request.reporting_period,
        actual = details.actual,
        threshold = details.threshold,
        deviation = deviation_pct,
        signatory = request
            .contact_info
            .as_ref()
            .and_then(|c| c.borrower_representative.as_deref())
            .unwrap_or("[Name]"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::covenant::Severity;

    fn leverage_breach() -> Breach {
        Breach {
            covenant_name: "Maximum Leverage Ratio".to_string(),
            threshold: 4.5,
            actual: 5.8,
            severity: Severity::Critical,
        }
    }

    #[test]
    fn test_compose_snapshot() {
        let request = compose("TechCore Industries", &leverage_breach(), "Q4 2025").unwrap();
        assert_eq!(request.company_name, "TechCore Industries");
        assert_eq!(request.breach_details.covenant_name, "Maximum Leverage Ratio");
        assert_eq!(request.breach_details.threshold, 4.5);
        assert_eq!(request.breach_details.actual, 5.8);
        assert_eq!(request.reporting_period, "Q4 2025");
        assert!(request.contact_info.is_none());
    }

    #[test]
    fn test_compose_rejects_non_positive_threshold() {
        let mut breach = leverage_breach();
        breach.threshold = 0.0;
        let err = compose("TechCore Industries", &breach, "Q4 2025").unwrap_err();
        assert!(matches!(err, CovenantError::Composition(_)));

        breach.threshold = -1.0;
        let err = compose("TechCore Industries", &breach, "Q4 2025").unwrap_err();
        assert!(matches!(err, CovenantError::Composition(_)));
    }

    #[test]
    fn test_template_letter_content() {
        let request = compose("TechCore Industries", &leverage_breach(), "Q4 2025").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        let letter = template_letter(&request, date);

        assert!(letter.starts_with("08 January 2026"));
        assert!(letter.contains("The Lender Group"));
        assert!(letter.contains("Maximum Leverage Ratio"));
        assert!(letter.contains("5.80x"));
        assert!(letter.contains("4.50x"));
        // Deviation 1.3 / 4.5 ≈ 28.9%
        assert!(letter.contains("28.9%"));
        assert!(letter.ends_with("TechCore Industries"));
    }

    #[test]
    fn test_template_letter_uses_contact_info() {
        let mut request = compose("TechCore Industries", &leverage_breach(), "Q4 2025").unwrap();
        request.contact_info = Some(ContactInfo {
            lender_name: Some("Northbank Syndicate".to_string()),
            borrower_representative: Some("J. Whitfield, CFO".to_string()),
        });
        let letter = template_letter(&request, NaiveDate::from_ymd_opt(2026, 1, 8).unwrap());
        assert!(letter.contains("Northbank Syndicate"));
        assert!(letter.contains("J. Whitfield, CFO"));
        assert!(!letter.contains("[Name]"));
    }

    #[test]
    fn test_template_letter_is_deterministic() {
        let request = compose("TechCore Industries", &leverage_breach(), "Q4 2025").unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        assert_eq!(template_letter(&request, date), template_letter(&request, date));
    }
}
