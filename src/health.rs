//! Financial health scorer
//!
//! A coarse scorecard, not a statistical model. Thresholds are strict, so a
//! value sitting exactly on a threshold lands in the lower bucket.

use crate::models::{round_half_up, FinancialSnapshot, HealthBand, ScoreBreakdown};

const HIGH_BUCKET: u8 = 30;
const LOW_BUCKET: u8 = 15;
const MAX_INVESTMENT_SCORE: u8 = 40;
const LIQUIDITY_MONTHS: f64 = 3.0;
const GOOD_CREDIT: i64 = 750;
const HEALTHY_SAVINGS_RATIO: f64 = 0.2;

/// Component scores behind the headline number.
pub fn breakdown(snapshot: &FinancialSnapshot) -> ScoreBreakdown {
    let savings_ratio = snapshot.monthly_surplus() / snapshot.income.max(1.0);

    let liquidity_score = if snapshot.balance > snapshot.expenses * LIQUIDITY_MONTHS {
        HIGH_BUCKET
    } else {
        LOW_BUCKET
    };

    let debt_score = if snapshot.credit_score > GOOD_CREDIT {
        HIGH_BUCKET
    } else {
        LOW_BUCKET
    };

    // Below the healthy ratio this is at most round(0.2 * 200) = 40.
    let investment_score = if savings_ratio > HEALTHY_SAVINGS_RATIO {
        MAX_INVESTMENT_SCORE
    } else {
        round_half_up(savings_ratio.max(0.0) * 200.0).clamp(0, MAX_INVESTMENT_SCORE as i64) as u8
    };

    ScoreBreakdown {
        savings_ratio,
        liquidity_score,
        debt_score,
        investment_score,
    }
}

/// Health score in `[0, 100]`.
pub fn score(snapshot: &FinancialSnapshot) -> u8 {
    let parts = breakdown(snapshot);
    let total = parts.liquidity_score as i64 + parts.debt_score as i64 + parts.investment_score as i64;
    total.clamp(0, 100) as u8
}

pub fn band(score: u8) -> HealthBand {
    if score > 70 {
        HealthBand::Strong
    } else if score > 40 {
        HealthBand::Fair
    } else {
        HealthBand::Weak
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_zero_snapshot() {
        let snapshot = FinancialSnapshot::new(0.0, 0.0, 0.0, 0);
        let parts = breakdown(&snapshot);
        assert_eq!(parts.liquidity_score, 15);
        assert_eq!(parts.debt_score, 15);
        assert_eq!(parts.savings_ratio, 0.0);
        assert_eq!(parts.investment_score, 0);
        assert_eq!(score(&snapshot), 30);
    }

    #[test]
    fn test_strong_profile_caps_at_100() {
        let snapshot = FinancialSnapshot::new(10000.0, 2000.0, 100000.0, 820);
        assert_eq!(score(&snapshot), 100);
        assert_eq!(band(score(&snapshot)), HealthBand::Strong);
    }

    #[test]
    fn test_threshold_ties_fall_low() {
        // balance == expenses * 3, credit == 750
        let snapshot = FinancialSnapshot::new(1000.0, 1000.0, 3000.0, 750);
        let parts = breakdown(&snapshot);
        assert_eq!(parts.liquidity_score, 15);
        assert_eq!(parts.debt_score, 15);
        assert_eq!(parts.investment_score, 0);
    }

    #[test]
    fn test_partial_investment_score() {
        // savings ratio 0.1 -> round(20)
        let snapshot = FinancialSnapshot::new(1000.0, 900.0, 0.0, 600);
        assert_eq!(breakdown(&snapshot).investment_score, 20);
        assert_eq!(score(&snapshot), 50);

        // exactly 0.2 is not above the threshold -> round(40)
        let snapshot = FinancialSnapshot::new(1000.0, 800.0, 0.0, 600);
        assert_eq!(breakdown(&snapshot).investment_score, 40);
    }

    #[test]
    fn test_overspending_scores_no_investment() {
        let snapshot = FinancialSnapshot::new(1000.0, 5000.0, -200.0, 300);
        assert_eq!(breakdown(&snapshot).investment_score, 0);
        assert_eq!(score(&snapshot), 30);
    }

    #[test]
    fn test_score_always_in_range() {
        let values = [-1.0e12, -1.0, 0.0, 0.5, 1.0, 750.0, 3000.0, 1.0e12];
        let credits = [i64::MIN, 0, 300, 750, 751, 900, i64::MAX];
        for &income in &values {
            for &expenses in &values {
                for &balance in &values {
                    for &credit in &credits {
                        let s = score(&FinancialSnapshot::new(income, expenses, balance, credit));
                        assert!(s <= 100);
                        assert!(s >= 30);
                    }
                }
            }
        }
    }

    #[test]
    fn test_bands() {
        assert_eq!(band(71), HealthBand::Strong);
        assert_eq!(band(70), HealthBand::Fair);
        assert_eq!(band(41), HealthBand::Fair);
        assert_eq!(band(40), HealthBand::Weak);
    }
}
