//! Credit command - score a credit profile and show what it qualifies for

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use bankapp_core::LogEvent;

use super::{get_context, get_logger, log_event, read_profile};
use crate::output::{create_table, format_money, format_percent};

fn yes_no(value: bool) -> String {
    if value {
        "yes".green().to_string()
    } else {
        "no".red().to_string()
    }
}

fn signed(value: i64) -> String {
    if value > 0 {
        format!("+{}", value)
    } else {
        value.to_string()
    }
}

pub fn run(profile_path: &Path, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let profile = read_profile(profile_path)?;
    let assessment = ctx.credit_service.assess(&profile);
    log_event(&logger, LogEvent::new("credit_assessed").with_command("credit"));

    if json {
        println!("{}", serde_json::to_string_pretty(&assessment)?);
        return Ok(());
    }

    let score = &assessment.score;
    println!("{} {}", "Credit score:".bold(), score.score);
    println!();

    let mut table = create_table();
    table.set_header(vec!["Factor", "Points"]);
    table.add_row(vec!["Account age".to_string(), signed(score.account_age_bonus)]);
    table.add_row(vec!["Transactions".to_string(), signed(score.transaction_bonus)]);
    table.add_row(vec!["Balance".to_string(), signed(score.balance_bonus)]);
    table.add_row(vec!["Loans".to_string(), signed(score.loan_adjustment)]);
    table.add_row(vec!["Mortgages".to_string(), signed(score.mortgage_adjustment)]);
    table.add_row(vec!["Recent activity".to_string(), signed(score.recent_activity_bonus)]);
    println!("{}", table);
    println!();

    let mut table = create_table();
    table.add_row(vec!["Loan rate".to_string(), format_percent(assessment.interest_rate_percent)]);
    table.add_row(vec!["Loan available".to_string(), yes_no(assessment.can_take_credit)]);
    table.add_row(vec!["Max loan".to_string(), format_money(assessment.max_credit_amount)]);
    table.add_row(vec!["Mortgage available".to_string(), yes_no(assessment.can_take_mortgage)]);
    table.add_row(vec!["Max mortgage".to_string(), format_money(assessment.max_mortgage_amount)]);
    println!("{}", table);

    Ok(())
}
