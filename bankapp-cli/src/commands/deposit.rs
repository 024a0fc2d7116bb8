//! Deposit command - accrued interest on a term deposit

use anyhow::Result;
use colored::Colorize;
use rust_decimal::Decimal;

use bankapp_core::LogEvent;

use super::{exit_with_json_error, get_context, get_logger, log_event, log_failure};
use crate::output::{create_table, format_money, format_percent};

pub fn run(amount: Decimal, months: u32, non_replenishable: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;

    let quote = match ctx.calculator_service.deposit(amount, months, non_replenishable) {
        Ok(quote) => quote,
        Err(e) => {
            log_failure(&logger, "deposit_failed", "deposit", &e);
            if json {
                exit_with_json_error(&e);
            }
            return Err(e.into());
        }
    };
    log_event(&logger, LogEvent::new("deposit_calculated").with_command("deposit"));

    if json {
        println!("{}", serde_json::to_string_pretty(&quote)?);
        return Ok(());
    }

    let kind = if quote.non_replenishable {
        "Non-replenishable deposit"
    } else {
        "Replenishable deposit"
    };
    println!("{}", kind.bold());
    println!();

    let mut table = create_table();
    table.add_row(vec!["Amount".to_string(), format_money(quote.principal)]);
    table.add_row(vec!["Term".to_string(), format!("{} months", quote.term_months)]);
    table.add_row(vec!["Annual rate".to_string(), format_percent(quote.annual_rate_percent)]);
    table.add_row(vec!["Interest".to_string(), format_money(quote.interest)]);
    table.add_row(vec!["Payout".to_string(), format_money(quote.total)]);
    println!("{}", table);

    Ok(())
}
