//! Credit history domain model and scoring rules

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 1000;
const BASE_SCORE: i64 = 300;

/// Score needed to be offered a consumer loan
pub const CREDIT_THRESHOLD: i64 = 400;
/// Score needed to be offered a mortgage
pub const MORTGAGE_THRESHOLD: i64 = 600;

/// Past or current loan on the user's record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanHistory {
    pub is_active: bool,
    /// An active loan whose next payment date has passed
    pub is_overdue: bool,
    pub late_payments: u32,
}

/// Past or current mortgage on the user's record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MortgageHistory {
    pub is_active: bool,
    pub amount: Decimal,
    pub late_payments: u32,
}

/// Everything the scoring rules look at
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreditProfile {
    pub account_age_days: u32,
    pub balance: Decimal,
    pub transaction_count: u32,
    /// Transactions in the last month
    pub recent_transaction_count: u32,
    #[serde(default)]
    pub loans: Vec<LoanHistory>,
    #[serde(default)]
    pub mortgages: Vec<MortgageHistory>,
}

/// Score with the contribution of each factor, for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditScore {
    pub score: i64,
    pub account_age_bonus: i64,
    pub transaction_bonus: i64,
    pub balance_bonus: i64,
    pub loan_adjustment: i64,
    pub mortgage_adjustment: i64,
    pub recent_activity_bonus: i64,
}

impl CreditProfile {
    pub fn score(&self) -> CreditScore {
        let account_age_bonus = i64::from(self.account_age_days / 7).min(100);
        let transaction_bonus = (i64::from(self.transaction_count) * 5).min(100);

        let balance_bonus = if self.balance >= Decimal::from(100_000) {
            100
        } else if self.balance >= Decimal::from(50_000) {
            50
        } else if self.balance >= Decimal::from(10_000) {
            25
        } else {
            0
        };

        let loan_adjustment: i64 = self
            .loans
            .iter()
            .map(|loan| {
                let mut delta = if loan.is_active {
                    if loan.is_overdue {
                        -70
                    } else {
                        -20
                    }
                } else {
                    75
                };
                delta -= i64::from(loan.late_payments) * 30;
                delta
            })
            .sum();

        let balance_floor = self.balance.max(Decimal::ONE);
        let mortgage_adjustment: i64 = self
            .mortgages
            .iter()
            .map(|mortgage| {
                let mut delta = if mortgage.is_active {
                    // Reasonable size relative to the balance earns a bonus
                    if mortgage.amount / balance_floor <= Decimal::from(3) {
                        50
                    } else {
                        30
                    }
                } else {
                    150
                };
                delta -= i64::from(mortgage.late_payments) * 50;
                delta
            })
            .sum();

        let recent_activity_bonus = if self.recent_transaction_count >= 5 { 25 } else { 0 };

        let raw = BASE_SCORE
            + account_age_bonus
            + transaction_bonus
            + balance_bonus
            + loan_adjustment
            + mortgage_adjustment
            + recent_activity_bonus;

        CreditScore {
            score: raw.clamp(MIN_SCORE, MAX_SCORE),
            account_age_bonus,
            transaction_bonus,
            balance_bonus,
            loan_adjustment,
            mortgage_adjustment,
            recent_activity_bonus,
        }
    }

    pub fn has_active_mortgage(&self) -> bool {
        self.mortgages.iter().any(|m| m.is_active)
    }
}

/// Annual loan rate offered for a score, in percent
pub fn interest_rate_for_score(score: i64) -> Decimal {
    let rate = match score {
        900.. => 8,
        800..=899 => 10,
        700..=799 => 12,
        600..=699 => 14,
        400..=599 => 16,
        _ => 20,
    };
    Decimal::from(rate)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_profile_scores_base() {
        let score = CreditProfile::default().score();
        assert_eq!(score.score, 300);
        assert_eq!(score.balance_bonus, 0);
    }

    #[test]
    fn test_bonuses_are_capped() {
        let profile = CreditProfile {
            account_age_days: 7 * 500,
            transaction_count: 1000,
            recent_transaction_count: 10,
            balance: Decimal::from(250_000),
            ..Default::default()
        };
        let score = profile.score();
        assert_eq!(score.account_age_bonus, 100);
        assert_eq!(score.transaction_bonus, 100);
        assert_eq!(score.balance_bonus, 100);
        assert_eq!(score.recent_activity_bonus, 25);
        assert_eq!(score.score, 625);
    }

    #[test]
    fn test_loan_history_adjustments() {
        let profile = CreditProfile {
            loans: vec![
                LoanHistory { is_active: false, is_overdue: false, late_payments: 0 },
                LoanHistory { is_active: true, is_overdue: true, late_payments: 1 },
            ],
            ..Default::default()
        };
        // +75 for the closed loan, -20 -50 -30 for the overdue one
        assert_eq!(profile.score().loan_adjustment, -25);
    }

    #[test]
    fn test_mortgage_ratio_bonus() {
        let profile = CreditProfile {
            balance: Decimal::from(1_000_000),
            mortgages: vec![MortgageHistory {
                is_active: true,
                amount: Decimal::from(2_000_000),
                late_payments: 0,
            }],
            ..Default::default()
        };
        assert_eq!(profile.score().mortgage_adjustment, 50);
        assert!(profile.has_active_mortgage());
    }

    #[test]
    fn test_score_is_clamped() {
        let profile = CreditProfile {
            loans: vec![LoanHistory { is_active: true, is_overdue: true, late_payments: 20 }],
            ..Default::default()
        };
        assert_eq!(profile.score().score, 0);
    }

    #[test]
    fn test_rate_tiers() {
        assert_eq!(interest_rate_for_score(950), Decimal::from(8));
        assert_eq!(interest_rate_for_score(800), Decimal::from(10));
        assert_eq!(interest_rate_for_score(650), Decimal::from(14));
        assert_eq!(interest_rate_for_score(400), Decimal::from(16));
        assert_eq!(interest_rate_for_score(399), Decimal::from(20));
    }
}
