//! CLI command implementations

pub mod config;
pub mod credit;
pub mod deposit;
pub mod loan;
pub mod login;
pub mod logs;
pub mod mortgage;
pub mod status;
pub mod user;

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::Password;
use uuid::Uuid;

use bankapp_core::domain::CreditProfile;
use bankapp_core::{
    BankAppContext, EntryPoint, Error, LogEvent, LoggingService, OperationResult, UserCredential,
};

/// Environment variable holding a PIN for non-interactive use
pub const PIN_ENV: &str = "BANKAPP_PIN";

/// Get the logging service for CLI operations
///
/// Returns None if logging fails to initialize (shouldn't block operations)
pub fn get_logger() -> Option<LoggingService> {
    let data_dir = get_data_dir().ok()?;
    std::fs::create_dir_all(&data_dir).ok()?;
    LoggingService::new(&data_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION")).ok()
}

/// Log an event, ignoring any errors (logging should never break the app)
pub fn log_event(logger: &Option<LoggingService>, event: LogEvent) {
    if let Some(l) = logger {
        let _ = l.log(event);
    }
}

/// Log a failed command by error kind only
pub fn log_failure(logger: &Option<LoggingService>, event: &str, command: &str, error: &Error) {
    log_event(
        logger,
        LogEvent::new(event).with_command(command).with_error(error.kind()),
    );
}

/// Get the data directory from environment or default
pub fn get_data_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("BANKAPP_DIR") {
        return Ok(PathBuf::from(dir));
    }
    let home = dirs::home_dir().context("Could not find home directory")?;
    Ok(home.join(".bankapp"))
}

/// Get or create the bank app context
pub fn get_context() -> Result<BankAppContext> {
    let data_dir = get_data_dir()?;
    BankAppContext::new(&data_dir).context("Failed to initialize bank app context")
}

/// Print a failure envelope and exit; used by `--json` output
pub fn exit_with_json_error(error: &Error) -> ! {
    let envelope: OperationResult<()> = OperationResult::from_error(error);
    match serde_json::to_string_pretty(&envelope) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", serde_json::json!({"success": false, "error": error.to_string()})),
    }
    std::process::exit(1);
}

/// Get a PIN from the --pin flag, BANKAPP_PIN, or a hidden prompt
///
/// The second value is true when the PIN was supplied up front, in which
/// case callers must not loop on it.
pub fn get_pin_or_prompt(pin_flag: Option<String>, prompt: &str) -> Result<(String, bool)> {
    if let Some(p) = pin_flag {
        return Ok((p, true));
    }
    if let Ok(p) = env::var(PIN_ENV) {
        return Ok((p, true));
    }
    let p = Password::new().with_prompt(prompt).interact()?;
    Ok((p, false))
}

/// Find a user by ID or by display name (case-insensitive)
pub fn find_user(users: &[UserCredential], query: &str) -> Result<UserCredential> {
    if let Ok(id) = Uuid::parse_str(query) {
        if let Some(user) = users.iter().find(|u| u.user_id == id) {
            return Ok(user.clone());
        }
    }

    let matches: Vec<&UserCredential> = users
        .iter()
        .filter(|u| u.display_name.eq_ignore_ascii_case(query.trim()))
        .collect();
    match matches.as_slice() {
        [user] => Ok((*user).clone()),
        [] => anyhow::bail!("No user named '{}'. Run 'bank user list' to see users.", query),
        _ => anyhow::bail!("Several users are named '{}'; pass the user ID instead.", query),
    }
}

/// Read a credit profile from a JSON file
pub fn read_profile(path: &Path) -> Result<CreditProfile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credit profile {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid credit profile {}", path.display()))
}
