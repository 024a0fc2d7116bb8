//! Login and logout commands
//!
//! The session lives for one process. Signing in records the flag in the
//! credential store, and later commands pick the session back up from it.

use anyhow::Result;
use clap::ValueEnum;
use dialoguer::{Confirm, Select};
use uuid::Uuid;

use bankapp_core::adapters::biometric::ScriptedBiometric;
use bankapp_core::domain::BiometricOutcome;
use bankapp_core::{BankAppContext, Error, LogEvent, LoggingService, UserCredential};

use super::{
    exit_with_json_error, find_user, get_context, get_data_dir, get_logger, get_pin_or_prompt,
    log_event, log_failure,
};
use crate::output::{error, success, warning};

/// Outcome the simulated biometric sensor reports
///
/// There is no sensor behind this: the flag stands in for the platform
/// challenge during development and demos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BiometricMode {
    /// Challenge passes and resolves to the selected user.
    ///
    /// This signs in any registered user without their PIN. It is a stand-in
    /// for the platform sensor, not an authentication path.
    Match,
    /// Challenge passes but no enrolled user is found
    NoUser,
    /// Challenge fails
    Reject,
}

/// What the stand-in sensor reports for the chosen user
fn simulated_outcome(mode: BiometricMode, user_id: Uuid) -> BiometricOutcome {
    match mode {
        BiometricMode::Match => BiometricOutcome::matched(user_id),
        BiometricMode::NoUser => BiometricOutcome::no_enrolled_user(),
        BiometricMode::Reject => BiometricOutcome::rejected(),
    }
}

fn choose_user(users: &[UserCredential], query: Option<&str>, json: bool) -> Result<UserCredential> {
    if let Some(q) = query {
        return find_user(users, q);
    }
    match users {
        [] => anyhow::bail!("No users registered. Run 'bank user register <name>' first."),
        [only] => Ok(only.clone()),
        _ if json => anyhow::bail!("Several users are registered; pass --user"),
        _ => {
            let names: Vec<&str> = users.iter().map(|u| u.display_name.as_str()).collect();
            let index = Select::new()
                .with_prompt("Sign in as")
                .items(&names)
                .default(0)
                .interact()?;
            Ok(users[index].clone())
        }
    }
}

fn report_failure(logger: &Option<LoggingService>, event: &str, e: Error, json: bool) -> Result<()> {
    log_failure(logger, event, "login", &e);
    if json {
        exit_with_json_error(&e);
    }
    Err(e.into())
}

fn report_success(
    logger: &Option<LoggingService>,
    user: &UserCredential,
    method: &str,
    json: bool,
) -> Result<()> {
    log_event(
        logger,
        LogEvent::new(format!("{}_login_succeeded", method)).with_command("login"),
    );
    if json {
        println!(
            "{}",
            serde_json::json!({
                "success": true,
                "user_id": user.user_id,
                "method": method,
            })
        );
    } else {
        success(&format!("Signed in as {}", user.display_name));
    }
    Ok(())
}

pub fn run_login(
    user: Option<String>,
    pin: Option<String>,
    biometric: Option<BiometricMode>,
    json: bool,
) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let users = ctx.auth_service.list_users()?;
    let target = choose_user(&users, user.as_deref(), json)?;

    if target.is_authenticated {
        if json {
            println!("{}", serde_json::json!({"success": true, "user_id": target.user_id, "method": "resumed"}));
        } else {
            println!("{} is already signed in", target.display_name);
        }
        return Ok(());
    }

    match biometric {
        Some(mode) => login_biometric(&logger, &target, mode, json),
        None => login_pin(&logger, &ctx, &target, pin, json),
    }
}

fn login_biometric(
    logger: &Option<LoggingService>,
    target: &UserCredential,
    mode: BiometricMode,
    json: bool,
) -> Result<()> {
    let outcome = simulated_outcome(mode, target.user_id);
    let ctx = BankAppContext::with_biometric(&get_data_dir()?, ScriptedBiometric::new(outcome))?;

    match ctx.auth_service.authenticate_biometric() {
        Ok(_) => report_success(logger, target, "biometric", json),
        Err(e) => report_failure(logger, "biometric_failed", e, json),
    }
}

fn login_pin(
    logger: &Option<LoggingService>,
    ctx: &BankAppContext,
    target: &UserCredential,
    pin: Option<String>,
    json: bool,
) -> Result<()> {
    let auth = &ctx.auth_service;
    auth.begin_pin_entry()?;

    let mut pin_flag = pin;
    let prompt = format!("PIN for {}", target.display_name);
    loop {
        let (pin, supplied) = get_pin_or_prompt(pin_flag.take(), &prompt)?;

        match auth.submit_pin(target.user_id, &pin) {
            Ok(_) => return report_success(logger, target, "pin", json),
            Err(Error::InvalidPin { remaining, .. }) if !supplied => {
                log_event(
                    logger,
                    LogEvent::new("pin_rejected").with_command("login").with_error("invalid_pin"),
                );
                warning(&format!("Wrong PIN, {} attempt(s) left", remaining));
            }
            Err(Error::TooManyAttempts { attempts }) if !supplied && !json => {
                log_event(
                    logger,
                    LogEvent::new("locked_out").with_command("login").with_error("too_many_attempts"),
                );
                error(&format!("Locked out after {} failed attempts", attempts));
                let retry = Confirm::new()
                    .with_prompt("Reset and try again?")
                    .default(false)
                    .interact()?;
                if !retry {
                    anyhow::bail!("Sign-in cancelled");
                }
                auth.reset()?;
                auth.begin_pin_entry()?;
            }
            Err(e) => return report_failure(logger, "login_failed", e, json),
        }
    }
}

pub fn run_logout(pin: Option<String>, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context()?;
    let auth = &ctx.auth_service;

    if auth.resume_signed_in()?.is_none() {
        if json {
            exit_with_json_error(&Error::NoMatchingUser);
        }
        anyhow::bail!("Nobody is signed in");
    }
    let current = auth.current_user()?;

    let (pin, _) = get_pin_or_prompt(pin, "PIN to sign out")?;
    match auth.logout(&pin) {
        Ok(_) => {
            log_event(&logger, LogEvent::new("logout_succeeded").with_command("logout"));
            if json {
                println!("{}", serde_json::json!({"success": true}));
            } else if let Some(user) = current {
                success(&format!("Signed out {}", user.display_name));
            }
            Ok(())
        }
        Err(e) => {
            log_failure(&logger, "logout_failed", "logout", &e);
            if json {
                exit_with_json_error(&e);
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_match_resolves_to_chosen_user() {
        let user_id = Uuid::new_v4();
        assert_eq!(
            simulated_outcome(BiometricMode::Match, user_id),
            BiometricOutcome::matched(user_id)
        );
        assert_eq!(
            simulated_outcome(BiometricMode::NoUser, user_id),
            BiometricOutcome::no_enrolled_user()
        );
        assert_eq!(
            simulated_outcome(BiometricMode::Reject, user_id),
            BiometricOutcome::rejected()
        );
    }
}
