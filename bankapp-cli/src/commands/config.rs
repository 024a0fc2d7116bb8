//! Config command - show or change the settings in settings.json

use anyhow::{Context, Result};
use colored::Colorize;
use rust_decimal::Decimal;

use bankapp_core::config::Config;
use bankapp_core::LogEvent;

use super::{get_data_dir, get_logger, log_event};
use crate::output::{create_table, format_percent, success};

/// Requested changes; `None` leaves a setting as it is
pub struct ConfigChanges {
    pub deposit_non_replenishable: Option<Decimal>,
    pub deposit_replenishable: Option<Decimal>,
    pub max_pin_attempts: Option<u32>,
}

impl ConfigChanges {
    fn is_empty(&self) -> bool {
        self.deposit_non_replenishable.is_none()
            && self.deposit_replenishable.is_none()
            && self.max_pin_attempts.is_none()
    }
}

pub fn run(changes: ConfigChanges, json: bool) -> Result<()> {
    let data_dir = get_data_dir()?;
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    let mut config = Config::load(&data_dir)?;

    let changed = !changes.is_empty();
    if changed {
        if let Some(rate) = changes.deposit_non_replenishable {
            config.deposit_rates.deposit_non_replenishable = rate;
        }
        if let Some(rate) = changes.deposit_replenishable {
            config.deposit_rates.deposit_replenishable = rate;
        }
        if let Some(attempts) = changes.max_pin_attempts {
            config.max_pin_attempts = attempts;
        }
        config.save(&data_dir)?;
        log_event(&get_logger(), LogEvent::new("config_updated").with_command("config"));
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "rates": config.deposit_rates,
                "auth": { "maxPinAttempts": config.max_pin_attempts },
            }))?
        );
        return Ok(());
    }

    if changed {
        success("Settings saved");
    }
    let mut table = create_table();
    table.set_header(vec!["Setting", "Value"]);
    table.add_row(vec![
        "rates.depositNonReplenishable".to_string(),
        format_percent(config.deposit_rates.deposit_non_replenishable),
    ]);
    table.add_row(vec![
        "rates.depositReplenishable".to_string(),
        format_percent(config.deposit_rates.deposit_replenishable),
    ]);
    table.add_row(vec![
        "auth.maxPinAttempts".to_string(),
        config.max_pin_attempts.to_string(),
    ]);
    println!("{}", table);
    println!("{}", data_dir.join("settings.json").display().to_string().dimmed());

    Ok(())
}
