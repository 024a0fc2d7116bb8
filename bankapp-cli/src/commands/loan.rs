//! Loan command - price a consumer loan

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;
use serde::Serialize;

use bankapp_core::domain::product::round_money;
use bankapp_core::domain::{AmortizationRow, LoanQuote};
use bankapp_core::LogEvent;

use super::{exit_with_json_error, get_context, get_logger, log_event, log_failure, read_profile};
use crate::output::{create_table, format_money, format_percent};

#[derive(Serialize)]
struct QuoteOutput {
    #[serde(flatten)]
    quote: LoanQuote,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<Vec<AmortizationRow>>,
}

pub fn run(
    principal: Decimal,
    months: u32,
    rate: Option<Decimal>,
    profile: Option<PathBuf>,
    schedule: bool,
    json: bool,
) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;

    let result = match (rate, profile) {
        (Some(rate), _) => ctx.calculator_service.loan(principal, months, rate),
        (None, Some(path)) => {
            let profile = read_profile(&path)?;
            ctx.calculator_service.loan_for_profile(principal, months, &profile)
        }
        (None, None) => anyhow::bail!("Pass --rate or --profile to choose the interest rate"),
    };

    let quote = match result {
        Ok(quote) => quote,
        Err(e) => {
            log_failure(&logger, "loan_failed", "loan", &e);
            if json {
                exit_with_json_error(&e);
            }
            return Err(e.into());
        }
    };
    log_event(&logger, LogEvent::new("loan_calculated").with_command("loan"));

    print_quote("Loan", &quote, schedule, json)
}

/// Print a loan or mortgage quote, optionally with its payment schedule
pub fn print_quote(title: &str, quote: &LoanQuote, schedule: bool, json: bool) -> Result<()> {
    let rows = schedule.then(|| quote.schedule().into_iter().map(round_row).collect::<Vec<_>>());

    if json {
        let output = QuoteOutput {
            quote: quote.rounded(),
            schedule: rows,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let rounded = quote.rounded();
    println!("{}", title.bold());
    println!();

    let mut table = create_table();
    table.add_row(vec!["Principal".to_string(), format_money(rounded.principal)]);
    table.add_row(vec!["Term".to_string(), format!("{} months", rounded.term_months)]);
    table.add_row(vec!["Annual rate".to_string(), format_percent(rounded.annual_rate_percent)]);
    table.add_row(vec!["Monthly payment".to_string(), format_money(rounded.monthly_payment)]);
    table.add_row(vec!["Total payment".to_string(), format_money(rounded.total_payment)]);
    table.add_row(vec!["Overpayment".to_string(), format_money(rounded.overpayment)]);
    println!("{}", table);

    if let Some(rows) = rows {
        println!();
        println!("{}", "Payment schedule".bold());
        let mut table = create_table();
        table.set_header(vec!["Month", "Payment", "Interest", "Principal", "Balance"]);
        for row in rows {
            table.add_row(vec![
                row.month.to_string(),
                format_money(row.payment),
                format_money(row.interest),
                format_money(row.principal),
                format_money(row.balance),
            ]);
        }
        println!("{}", table);
    }

    Ok(())
}

fn round_row(row: AmortizationRow) -> AmortizationRow {
    AmortizationRow {
        month: row.month,
        payment: round_money(row.payment),
        interest: round_money(row.interest),
        principal: round_money(row.principal),
        balance: round_money(row.balance),
    }
}
