use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;
use crate::{CovenantError, CovenantResult};

/// Monitoring status of a single loan on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    Healthy,
    Watch,
    Breach,
}

/// One loan's headline figures as shown in the portfolio table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanSummary {
    pub borrower: String,
    pub sector: String,
    /// Committed exposure in millions.
    pub exposure: Money,
    pub leverage_ratio: f64,
    pub interest_coverage: f64,
    pub status: LoanStatus,
}

/// Aggregate view over the monitored book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioStats {
    pub total_loans: usize,
    pub total_exposure: Money,
    pub healthy_loans: usize,
    pub watch_loans: usize,
    pub breach_loans: usize,
    /// Mean leverage across the book, one decimal.
    pub avg_leverage_ratio: f64,
}

/// Aggregate headline statistics for the portfolio dashboard.
pub fn portfolio_stats(loans: &[LoanSummary]) -> CovenantResult<PortfolioStats> {
    if loans.is_empty() {
        return Err(CovenantError::InsufficientData(
            "At least one loan is required to compute portfolio statistics.".into(),
        ));
    }

    let total_exposure: Money = loans.iter().map(|l| l.exposure).sum::<Decimal>();
    let count = |status: LoanStatus| loans.iter().filter(|l| l.status == status).count();

    let avg_leverage =
        loans.iter().map(|l| l.leverage_ratio).sum::<f64>() / loans.len() as f64;

    Ok(PortfolioStats {
        total_loans: loans.len(),
        total_exposure,
        healthy_loans: count(LoanStatus::Healthy),
        watch_loans: count(LoanStatus::Watch),
        breach_loans: count(LoanStatus::Breach),
        avg_leverage_ratio: (avg_leverage * 10.0).round() / 10.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn loan(borrower: &str, exposure: Money, leverage: f64, status: LoanStatus) -> LoanSummary {
        LoanSummary {
            borrower: borrower.to_string(),
            sector: "Technology".to_string(),
            exposure,
            leverage_ratio: leverage,
            interest_coverage: 4.0,
            status,
        }
    }

    #[test]
    fn test_portfolio_stats() {
        let loans = vec![
            loan("TechCore Industries", dec!(450), 5.8, LoanStatus::Breach),
            loan("GreenEnergy Solutions", dec!(680), 2.8, LoanStatus::Healthy),
            loan("MediPharm Global", dec!(320), 4.2, LoanStatus::Watch),
        ];

        let stats = portfolio_stats(&loans).unwrap();
        assert_eq!(stats.total_loans, 3);
        assert_eq!(stats.total_exposure, dec!(1450));
        assert_eq!(stats.healthy_loans, 1);
        assert_eq!(stats.watch_loans, 1);
        assert_eq!(stats.breach_loans, 1);
        // (5.8 + 2.8 + 4.2) / 3 = 4.266... -> 4.3
        assert_eq!(stats.avg_leverage_ratio, 4.3);
    }

    #[test]
    fn test_empty_book_rejected() {
        let err = portfolio_stats(&[]).unwrap_err();
        assert!(matches!(err, CovenantError::InsufficientData(_)));
    }
}
