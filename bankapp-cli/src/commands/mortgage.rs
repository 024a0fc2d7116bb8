//! Mortgage command - price a mortgage from the loan amount or the property

use std::path::PathBuf;

use anyhow::Result;
use rust_decimal::Decimal;

use bankapp_core::domain::CreditProfile;
use bankapp_core::LogEvent;

use super::loan::print_quote;
use super::{exit_with_json_error, get_context, get_logger, log_event, log_failure, read_profile};

/// Loan amount, or property cost and down payment, plus term and rate
pub struct MortgageTerms {
    pub principal: Option<Decimal>,
    pub cost: Option<Decimal>,
    pub down_payment: Option<Decimal>,
    pub years: u32,
    pub rate: Decimal,
}

pub fn run(terms: MortgageTerms, profile: Option<PathBuf>, schedule: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let calculator = &ctx.calculator_service;
    let profile: Option<CreditProfile> = profile.as_deref().map(read_profile).transpose()?;

    let MortgageTerms { principal, cost, down_payment, years, rate } = terms;
    let result = match (principal, cost, down_payment) {
        (Some(principal), None, None) => match &profile {
            Some(profile) => calculator.mortgage_for_profile(principal, years, rate, profile),
            None => calculator.mortgage(principal, years, rate),
        },
        (None, Some(cost), Some(down_payment)) => calculator
            .mortgage_from_property(cost, down_payment, years, rate)
            .and_then(|quote| match &profile {
                Some(profile) => calculator.mortgage_for_profile(quote.principal, years, rate, profile),
                None => Ok(quote),
            }),
        _ => anyhow::bail!("Pass either --principal, or --cost together with --down-payment"),
    };

    let quote = match result {
        Ok(quote) => quote,
        Err(e) => {
            log_failure(&logger, "mortgage_failed", "mortgage", &e);
            if json {
                exit_with_json_error(&e);
            }
            return Err(e.into());
        }
    };
    log_event(&logger, LogEvent::new("mortgage_calculated").with_command("mortgage"));

    print_quote(&format!("Mortgage over {} years", years), &quote, schedule, json)
}
