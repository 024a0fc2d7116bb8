//! Status command - signed-in user and active settings

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use uuid::Uuid;

use super::{get_context, get_data_dir};
use crate::output::{create_table, format_percent};

#[derive(Serialize)]
struct StatusSummary {
    data_dir: String,
    registered_users: usize,
    signed_in_user: Option<SignedInUser>,
    max_pin_attempts: u32,
    deposit_rate_non_replenishable: String,
    deposit_rate_replenishable: String,
}

#[derive(Serialize)]
struct SignedInUser {
    user_id: Uuid,
    display_name: String,
}

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let users = ctx.auth_service.list_users()?;

    ctx.auth_service.resume_signed_in()?;
    let signed_in_user = ctx.auth_service.current_user()?.map(|c| SignedInUser {
        user_id: c.user_id,
        display_name: c.display_name,
    });

    let rates = ctx.calculator_service.deposit_rates();
    let status = StatusSummary {
        data_dir: get_data_dir()?.display().to_string(),
        registered_users: users.len(),
        signed_in_user,
        max_pin_attempts: ctx.config.max_pin_attempts,
        deposit_rate_non_replenishable: format_percent(rates.deposit_non_replenishable),
        deposit_rate_replenishable: format_percent(rates.deposit_replenishable),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Bank App Status".bold());
    println!();

    let signed_in = match &status.signed_in_user {
        Some(user) => user.display_name.green().to_string(),
        None => "nobody".dimmed().to_string(),
    };

    let mut table = create_table();
    table.add_row(vec!["Signed in".to_string(), signed_in]);
    table.add_row(vec!["Registered users".to_string(), status.registered_users.to_string()]);
    table.add_row(vec!["PIN attempts before lockout".to_string(), status.max_pin_attempts.to_string()]);
    table.add_row(vec!["Deposit rate (non-replenishable)".to_string(), status.deposit_rate_non_replenishable]);
    table.add_row(vec!["Deposit rate (replenishable)".to_string(), status.deposit_rate_replenishable]);
    table.add_row(vec!["Data directory".to_string(), status.data_dir]);
    println!("{}", table);

    Ok(())
}
