//! User commands - register and list users

use std::env;

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Password;
use serde::Serialize;
use uuid::Uuid;

use bankapp_core::LogEvent;

use super::{exit_with_json_error, get_context, get_logger, log_event, log_failure, PIN_ENV};
use crate::output::{create_table, success};

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register a new user with a 4-digit PIN
    Register {
        /// Display name
        name: String,
        /// PIN (prompted with confirmation if omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List registered users
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// What the CLI shows about a user; the PIN digest never leaves the store
#[derive(Serialize)]
struct UserSummary {
    user_id: Uuid,
    display_name: String,
    signed_in: bool,
    created_at: String,
}

/// PIN and confirmation from --pin, BANKAPP_PIN, or two hidden prompts
fn get_pin_with_confirm(pin_flag: Option<String>) -> Result<(String, String)> {
    if let Some(p) = pin_flag {
        return Ok((p.clone(), p));
    }
    if let Ok(p) = env::var(PIN_ENV) {
        return Ok((p.clone(), p));
    }

    let pin = Password::new().with_prompt("Choose a 4-digit PIN").interact()?;
    let confirm = Password::new().with_prompt("Repeat the PIN").interact()?;
    Ok((pin, confirm))
}

pub fn run(command: UserCommands) -> Result<()> {
    match command {
        UserCommands::Register { name, pin, json } => {
            let logger = get_logger();
            let ctx = get_context()?;
            let (pin, confirm) = get_pin_with_confirm(pin)?;

            match ctx.auth_service.register(&name, &pin, &confirm) {
                Ok(credential) => {
                    log_event(&logger, LogEvent::new("user_registered").with_command("user register"));
                    if json {
                        let summary = UserSummary {
                            user_id: credential.user_id,
                            display_name: credential.display_name,
                            signed_in: credential.is_authenticated,
                            created_at: credential.created_at.to_rfc3339(),
                        };
                        println!("{}", serde_json::to_string_pretty(&summary)?);
                    } else {
                        success(&format!("Registered {}", credential.display_name));
                        println!("  ID: {}", credential.user_id.to_string().dimmed());
                    }
                }
                Err(e) => {
                    log_failure(&logger, "user_register_failed", "user register", &e);
                    if json {
                        exit_with_json_error(&e);
                    }
                    return Err(e.into());
                }
            }
        }
        UserCommands::List { json } => {
            let ctx = get_context()?;
            let users: Vec<UserSummary> = ctx
                .auth_service
                .list_users()?
                .into_iter()
                .map(|c| UserSummary {
                    user_id: c.user_id,
                    display_name: c.display_name,
                    signed_in: c.is_authenticated,
                    created_at: c.created_at.format("%Y-%m-%d %H:%M").to_string(),
                })
                .collect();

            if json {
                println!("{}", serde_json::to_string_pretty(&users)?);
                return Ok(());
            }

            if users.is_empty() {
                println!("No users registered. Run 'bank user register <name>' to add one.");
                return Ok(());
            }

            let mut table = create_table();
            table.set_header(vec!["Name", "ID", "Registered", "Signed in"]);
            for user in users {
                let signed_in = if user.signed_in {
                    "yes".green().to_string()
                } else {
                    String::new()
                };
                table.add_row(vec![
                    user.display_name,
                    user.user_id.to_string(),
                    user.created_at,
                    signed_in,
                ]);
            }
            println!("{}", table);
        }
    }

    Ok(())
}
