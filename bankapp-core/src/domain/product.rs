//! Financial product requests and quotes
//!
//! Requests are validated value objects; quotes are produced by the
//! calculator service and never mutated afterwards. All amounts are kept at
//! full `Decimal` precision; use [`round_money`] only for presentation.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use super::result::{Error, Result};

/// Minimum share of the property cost, in percent, paid up front
pub const MIN_DOWN_PAYMENT_PERCENT: u32 = 10;

/// Longest term any product accepts, in months (100 years)
pub const MAX_TERM_MONTHS: u32 = 1200;

/// Round a money amount to the currency's minor unit
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

fn check_principal(principal: Decimal) -> Result<()> {
    if principal <= Decimal::ZERO {
        return Err(Error::invalid_parameters("principal must be positive"));
    }
    Ok(())
}

fn check_term(term: u32, max: u32, unit: &str) -> Result<()> {
    if term == 0 {
        return Err(Error::invalid_parameters(format!(
            "term must be at least one {}",
            unit
        )));
    }
    if term > max {
        return Err(Error::invalid_parameters(format!(
            "term must be at most {} {}s",
            max, unit
        )));
    }
    Ok(())
}

fn check_rate(rate: Decimal) -> Result<()> {
    if rate < Decimal::ZERO || rate > Decimal::ONE_HUNDRED {
        return Err(Error::invalid_parameters(
            "annual rate must be between 0 and 100 percent",
        ));
    }
    Ok(())
}

/// Consumer loan parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub principal: Decimal,
    pub term_months: u32,
    pub annual_rate_percent: Decimal,
}

impl LoanRequest {
    pub fn new(principal: Decimal, term_months: u32, annual_rate_percent: Decimal) -> Result<Self> {
        check_principal(principal)?;
        check_term(term_months, MAX_TERM_MONTHS, "month")?;
        check_rate(annual_rate_percent)?;
        Ok(Self {
            principal,
            term_months,
            annual_rate_percent,
        })
    }
}

/// Mortgage parameters; the term is given in years
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MortgageRequest {
    pub principal: Decimal,
    pub term_years: u32,
    pub annual_rate_percent: Decimal,
}

impl MortgageRequest {
    pub fn new(principal: Decimal, term_years: u32, annual_rate_percent: Decimal) -> Result<Self> {
        check_principal(principal)?;
        check_term(term_years, MAX_TERM_MONTHS / 12, "year")?;
        check_rate(annual_rate_percent)?;
        Ok(Self {
            principal,
            term_years,
            annual_rate_percent,
        })
    }

    /// Build a mortgage from the property cost and the down payment
    ///
    /// The down payment must cover at least [`MIN_DOWN_PAYMENT_PERCENT`] of
    /// the cost and stay below the cost itself.
    pub fn from_property(
        property_cost: Decimal,
        down_payment: Decimal,
        term_years: u32,
        annual_rate_percent: Decimal,
    ) -> Result<Self> {
        if property_cost <= Decimal::ZERO {
            return Err(Error::invalid_parameters("property cost must be positive"));
        }
        let minimum = property_cost * Decimal::from(MIN_DOWN_PAYMENT_PERCENT) / Decimal::ONE_HUNDRED;
        if down_payment < minimum {
            return Err(Error::invalid_parameters(
                "down payment must be at least 10% of the property cost",
            ));
        }
        if down_payment >= property_cost {
            return Err(Error::invalid_parameters(
                "down payment must be below the property cost",
            ));
        }
        Self::new(property_cost - down_payment, term_years, annual_rate_percent)
    }

    /// Number of monthly payments
    pub fn term_months(&self) -> Result<u32> {
        self.term_years
            .checked_mul(12)
            .ok_or_else(|| Error::invalid_parameters("term is too long"))
    }
}

/// Deposit parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub principal: Decimal,
    pub term_months: u32,
    /// Non-replenishable deposits earn the higher tier
    pub non_replenishable: bool,
}

impl DepositRequest {
    pub fn new(principal: Decimal, term_months: u32, non_replenishable: bool) -> Result<Self> {
        check_principal(principal)?;
        check_term(term_months, MAX_TERM_MONTHS, "month")?;
        Ok(Self {
            principal,
            term_months,
            non_replenishable,
        })
    }
}

/// Two-tier deposit rate policy, in annual percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepositRates {
    pub deposit_non_replenishable: Decimal,
    pub deposit_replenishable: Decimal,
}

impl DepositRates {
    pub fn rate_for(&self, non_replenishable: bool) -> Decimal {
        if non_replenishable {
            self.deposit_non_replenishable
        } else {
            self.deposit_replenishable
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_rate(self.deposit_non_replenishable)?;
        check_rate(self.deposit_replenishable)
    }
}

impl Default for DepositRates {
    fn default() -> Self {
        Self {
            deposit_non_replenishable: Decimal::from(19),
            deposit_replenishable: Decimal::from(17),
        }
    }
}

/// Repayment figures for an amortizing loan or mortgage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanQuote {
    pub principal: Decimal,
    pub term_months: u32,
    pub annual_rate_percent: Decimal,
    pub monthly_rate: Decimal,
    pub monthly_payment: Decimal,
    pub total_payment: Decimal,
    /// `total_payment - principal`
    pub overpayment: Decimal,
}

/// One period of an amortization schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub payment: Decimal,
    pub interest: Decimal,
    pub principal: Decimal,
    /// Outstanding balance after this payment
    pub balance: Decimal,
}

impl LoanQuote {
    /// Month-by-month split of each payment into interest and principal
    ///
    /// The final row settles whatever balance remains, so the closing
    /// balance is exactly zero.
    pub fn schedule(&self) -> Vec<AmortizationRow> {
        let mut rows = Vec::with_capacity(self.term_months.min(MAX_TERM_MONTHS) as usize);
        let mut balance = self.principal;

        for month in 1..=self.term_months {
            let interest = balance * self.monthly_rate;
            let (payment, principal) = if month == self.term_months {
                (balance + interest, balance)
            } else {
                (self.monthly_payment, self.monthly_payment - interest)
            };
            balance -= principal;
            rows.push(AmortizationRow {
                month,
                payment,
                interest,
                principal,
                balance,
            });
        }

        rows
    }

    /// Copy with every money field rounded for display
    ///
    /// The overpayment is derived from the rounded total so the displayed
    /// figures still add up.
    pub fn rounded(&self) -> Self {
        let total_payment = round_money(self.total_payment);
        Self {
            monthly_payment: round_money(self.monthly_payment),
            total_payment,
            overpayment: round_money(total_payment - self.principal),
            ..*self
        }
    }
}

/// Accrued interest and payout for a deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositQuote {
    pub principal: Decimal,
    pub term_months: u32,
    pub annual_rate_percent: Decimal,
    pub non_replenishable: bool,
    pub interest: Decimal,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loan_request_validation() {
        assert!(LoanRequest::new(Decimal::from(1000), 12, Decimal::from(10)).is_ok());
        assert!(matches!(
            LoanRequest::new(Decimal::ZERO, 12, Decimal::from(10)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            LoanRequest::new(Decimal::from(-5), 12, Decimal::from(10)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            LoanRequest::new(Decimal::from(1000), 0, Decimal::from(10)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            LoanRequest::new(Decimal::from(1000), 12, Decimal::from(-1)),
            Err(Error::InvalidParameters(_))
        ));
        assert!(matches!(
            LoanRequest::new(Decimal::from(1000), 12, Decimal::from(101)),
            Err(Error::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_term_upper_bound() {
        let amount = Decimal::from(1000);
        assert!(LoanRequest::new(amount, MAX_TERM_MONTHS, Decimal::TEN).is_ok());
        assert!(LoanRequest::new(amount, MAX_TERM_MONTHS + 1, Decimal::TEN).is_err());
        assert!(MortgageRequest::new(amount, 100, Decimal::TEN).is_ok());
        assert!(MortgageRequest::new(amount, 101, Decimal::TEN).is_err());
        assert!(DepositRequest::new(amount, MAX_TERM_MONTHS + 1, true).is_err());
    }

    #[test]
    fn test_mortgage_from_property() {
        let req = MortgageRequest::from_property(
            Decimal::from(5_000_000),
            Decimal::from(1_000_000),
            20,
            Decimal::from(10),
        )
        .unwrap();
        assert_eq!(req.principal, Decimal::from(4_000_000));
        assert_eq!(req.term_months().unwrap(), 240);
    }

    #[test]
    fn test_mortgage_down_payment_bounds() {
        let cost = Decimal::from(1_000_000);
        assert!(MortgageRequest::from_property(cost, Decimal::from(99_999), 10, Decimal::TEN).is_err());
        assert!(MortgageRequest::from_property(cost, Decimal::from(100_000), 10, Decimal::TEN).is_ok());
        assert!(MortgageRequest::from_property(cost, cost, 10, Decimal::TEN).is_err());
    }

    #[test]
    fn test_deposit_rates_default_tiers() {
        let rates = DepositRates::default();
        assert_eq!(rates.rate_for(true), Decimal::from(19));
        assert_eq!(rates.rate_for(false), Decimal::from(17));
    }

    #[test]
    fn test_round_money() {
        assert_eq!(round_money(Decimal::new(12345, 3)), Decimal::new(1235, 2));
        assert_eq!(round_money(Decimal::new(-12345, 3)), Decimal::new(-1235, 2));
    }

    #[test]
    fn test_zero_rate_schedule_closes_at_zero() {
        let quote = LoanQuote {
            principal: Decimal::from(100),
            term_months: 3,
            annual_rate_percent: Decimal::ZERO,
            monthly_rate: Decimal::ZERO,
            monthly_payment: Decimal::from(100) / Decimal::from(3),
            total_payment: Decimal::from(100),
            overpayment: Decimal::ZERO,
        };
        let rows = quote.schedule();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2].balance, Decimal::ZERO);
        let paid: Decimal = rows.iter().map(|r| r.payment).sum();
        assert_eq!(paid, Decimal::from(100));
    }
}
