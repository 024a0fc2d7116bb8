//! Calculator service - loan, mortgage and deposit figures
//!
//! The `compute_*` functions are pure and deterministic: the same request
//! always yields the same quote, so callers may memoize freely.

use rust_decimal::{Decimal, MathematicalOps, RoundingStrategy};

use crate::domain::credit::{interest_rate_for_score, CreditProfile};
use crate::domain::product::{
    DepositQuote, DepositRates, DepositRequest, LoanQuote, LoanRequest, MortgageRequest,
};
use crate::domain::result::{Error, Result};
use crate::services::credit::CreditService;

const MONTHS_PER_YEAR: u32 = 12;

fn overflow() -> Error {
    Error::invalid_parameters("amount is too large to calculate")
}

/// Standard annuity: equal monthly payments over `months` periods
fn amortize(principal: Decimal, months: u32, annual_rate_percent: Decimal) -> Result<LoanQuote> {
    let n = Decimal::from(months);
    let monthly_rate = annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(MONTHS_PER_YEAR);

    let (monthly_payment, total_payment) = if monthly_rate.is_zero() {
        (principal / n, principal)
    } else {
        // M = P * r * (1+r)^n / ((1+r)^n - 1), same as P * r / (1 - (1+r)^-n)
        let growth = (Decimal::ONE + monthly_rate)
            .checked_powi(i64::from(months))
            .ok_or_else(overflow)?;
        let monthly_payment = principal
            .checked_mul(monthly_rate)
            .and_then(|v| v.checked_mul(growth))
            .and_then(|v| v.checked_div(growth - Decimal::ONE))
            .ok_or_else(overflow)?;
        let total_payment = monthly_payment.checked_mul(n).ok_or_else(overflow)?;
        (monthly_payment, total_payment)
    };

    Ok(LoanQuote {
        principal,
        term_months: months,
        annual_rate_percent,
        monthly_rate,
        monthly_payment,
        total_payment,
        overpayment: total_payment - principal,
    })
}

/// Monthly payment, total payment and overpayment for a consumer loan
pub fn compute_loan(request: &LoanRequest) -> Result<LoanQuote> {
    amortize(
        request.principal,
        request.term_months,
        request.annual_rate_percent,
    )
}

/// Same annuity formula as [`compute_loan`] over `term_years * 12` months
pub fn compute_mortgage(request: &MortgageRequest) -> Result<LoanQuote> {
    amortize(
        request.principal,
        request.term_months()?,
        request.annual_rate_percent,
    )
}

/// Simple interest at the tier rate, rounded to a whole currency unit
pub fn compute_deposit(request: &DepositRequest, rates: &DepositRates) -> Result<DepositQuote> {
    let rate = rates.rate_for(request.non_replenishable);
    let interest = request
        .principal
        .checked_mul(rate)
        .and_then(|v| v.checked_mul(Decimal::from(request.term_months)))
        .ok_or_else(overflow)?
        / Decimal::from(100 * MONTHS_PER_YEAR);
    let interest = interest.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    Ok(DepositQuote {
        principal: request.principal,
        term_months: request.term_months,
        annual_rate_percent: rate,
        non_replenishable: request.non_replenishable,
        interest,
        total: request.principal.checked_add(interest).ok_or_else(overflow)?,
    })
}

/// Calculator service holding the configured deposit rate policy
#[derive(Debug, Clone, Default)]
pub struct CalculatorService {
    deposit_rates: DepositRates,
}

impl CalculatorService {
    pub fn new(deposit_rates: DepositRates) -> Self {
        Self { deposit_rates }
    }

    pub fn deposit_rates(&self) -> &DepositRates {
        &self.deposit_rates
    }

    /// Quote a consumer loan
    pub fn loan(
        &self,
        principal: Decimal,
        term_months: u32,
        annual_rate_percent: Decimal,
    ) -> Result<LoanQuote> {
        compute_loan(&LoanRequest::new(principal, term_months, annual_rate_percent)?)
    }

    /// Quote a loan at the rate the profile's credit score earns
    ///
    /// Fails with `CreditDenied` when the score is below the loan threshold
    /// or the amount is above the profile's credit limit.
    pub fn loan_for_profile(
        &self,
        principal: Decimal,
        term_months: u32,
        profile: &CreditProfile,
    ) -> Result<LoanQuote> {
        let request = LoanRequest::new(
            principal,
            term_months,
            interest_rate_for_score(profile.score().score),
        )?;
        CreditService::new().check_loan(profile, principal)?;
        compute_loan(&request)
    }

    /// Quote a mortgage on an already-known loan amount
    pub fn mortgage(
        &self,
        principal: Decimal,
        term_years: u32,
        annual_rate_percent: Decimal,
    ) -> Result<LoanQuote> {
        compute_mortgage(&MortgageRequest::new(principal, term_years, annual_rate_percent)?)
    }

    /// Quote a mortgage from the property cost and down payment
    pub fn mortgage_from_property(
        &self,
        property_cost: Decimal,
        down_payment: Decimal,
        term_years: u32,
        annual_rate_percent: Decimal,
    ) -> Result<LoanQuote> {
        compute_mortgage(&MortgageRequest::from_property(
            property_cost,
            down_payment,
            term_years,
            annual_rate_percent,
        )?)
    }

    /// Quote a mortgage the profile qualifies for
    pub fn mortgage_for_profile(
        &self,
        principal: Decimal,
        term_years: u32,
        annual_rate_percent: Decimal,
        profile: &CreditProfile,
    ) -> Result<LoanQuote> {
        let request = MortgageRequest::new(principal, term_years, annual_rate_percent)?;
        CreditService::new().check_mortgage(profile, principal)?;
        compute_mortgage(&request)
    }

    /// Quote a deposit at the configured tier rate
    pub fn deposit(
        &self,
        principal: Decimal,
        term_months: u32,
        non_replenishable: bool,
    ) -> Result<DepositQuote> {
        compute_deposit(
            &DepositRequest::new(principal, term_months, non_replenishable)?,
            &self.deposit_rates,
        )
    }
}
