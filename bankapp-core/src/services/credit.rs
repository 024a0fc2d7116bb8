//! Credit service - eligibility and limits derived from the credit score

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::credit::{
    interest_rate_for_score, CreditProfile, CreditScore, CREDIT_THRESHOLD, MORTGAGE_THRESHOLD,
};
use crate::domain::result::{Error, Result};

const MORTGAGE_CAP: i64 = 10_000_000;
const BALANCE_UNIT: i64 = 10_000;

/// Full credit picture for a profile
#[derive(Debug, Clone, Serialize)]
pub struct CreditAssessment {
    pub score: CreditScore,
    pub interest_rate_percent: Decimal,
    pub can_take_credit: bool,
    pub max_credit_amount: Decimal,
    pub can_take_mortgage: bool,
    pub max_mortgage_amount: Decimal,
}

/// Stateless service; every answer is a function of the profile alone
#[derive(Debug, Clone, Copy, Default)]
pub struct CreditService;

impl CreditService {
    pub fn new() -> Self {
        Self
    }

    pub fn score(&self, profile: &CreditProfile) -> CreditScore {
        profile.score()
    }

    /// Annual loan rate offered at the profile's score
    pub fn interest_rate(&self, profile: &CreditProfile) -> Decimal {
        interest_rate_for_score(profile.score().score)
    }

    pub fn can_take_credit(&self, profile: &CreditProfile) -> bool {
        profile.score().score >= CREDIT_THRESHOLD
    }

    /// Largest consumer loan on offer
    ///
    /// A base amount by score tier, scaled by the balance in units of
    /// 10 000 and capped at twice the base.
    pub fn max_credit_amount(&self, profile: &CreditProfile) -> Decimal {
        let base = match profile.score().score {
            800.. => 1_000_000,
            600..=799 => 500_000,
            400..=599 => 100_000,
            _ => 0,
        };
        let multiplier = (non_negative(profile.balance) / Decimal::from(BALANCE_UNIT))
            .min(Decimal::TWO);
        Decimal::from(base) * multiplier
    }

    /// Only one active mortgage at a time, and only from a good score
    pub fn can_take_mortgage(&self, profile: &CreditProfile) -> bool {
        !profile.has_active_mortgage() && profile.score().score >= MORTGAGE_THRESHOLD
    }

    /// Balance times a score-tier multiplier, capped at 10 000 000
    pub fn max_mortgage_amount(&self, profile: &CreditProfile) -> Decimal {
        let multiplier = match profile.score().score {
            900.. => 5,
            800..=899 => 4,
            700..=799 => 3,
            600..=699 => 2,
            _ => 0,
        };
        (non_negative(profile.balance) * Decimal::from(multiplier)).min(Decimal::from(MORTGAGE_CAP))
    }

    /// Refuse a consumer loan the profile does not qualify for
    pub fn check_loan(&self, profile: &CreditProfile, amount: Decimal) -> Result<()> {
        if !self.can_take_credit(profile) {
            return Err(Error::credit_denied(format!(
                "a credit score of at least {} is required for a loan",
                CREDIT_THRESHOLD
            )));
        }
        let limit = self.max_credit_amount(profile);
        if amount > limit {
            return Err(Error::credit_denied(format!(
                "loan amount exceeds the limit of {}",
                limit
            )));
        }
        Ok(())
    }

    /// Refuse a mortgage the profile does not qualify for
    pub fn check_mortgage(&self, profile: &CreditProfile, amount: Decimal) -> Result<()> {
        if profile.has_active_mortgage() {
            return Err(Error::credit_denied("an active mortgage is already open"));
        }
        if !self.can_take_mortgage(profile) {
            return Err(Error::credit_denied(format!(
                "a credit score of at least {} is required for a mortgage",
                MORTGAGE_THRESHOLD
            )));
        }
        let limit = self.max_mortgage_amount(profile);
        if amount > limit {
            return Err(Error::credit_denied(format!(
                "mortgage amount exceeds the limit of {}",
                limit
            )));
        }
        Ok(())
    }

    pub fn assess(&self, profile: &CreditProfile) -> CreditAssessment {
        let score = profile.score();
        CreditAssessment {
            interest_rate_percent: interest_rate_for_score(score.score),
            can_take_credit: self.can_take_credit(profile),
            max_credit_amount: self.max_credit_amount(profile),
            can_take_mortgage: self.can_take_mortgage(profile),
            max_mortgage_amount: self.max_mortgage_amount(profile),
            score,
        }
    }
}

fn non_negative(amount: Decimal) -> Decimal {
    amount.max(Decimal::ZERO)
}
