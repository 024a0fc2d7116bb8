//! Integration tests for bankapp-core services
//!
//! These tests drive the public context end to end against a real
//! credentials file in a temp directory. Biometric challenges are scripted
//! at the trait level.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use bankapp_core::adapters::biometric::ScriptedBiometric;
use bankapp_core::adapters::json_store::JsonCredentialStore;
use bankapp_core::config::Config;
use bankapp_core::domain::{AuthState, BiometricOutcome, CreditProfile};
use bankapp_core::ports::CredentialStore;
use bankapp_core::services::{AuthService, EntryPoint, LogEvent, LoggingService};
use bankapp_core::{BankAppContext, Error, OperationResult};

// ============================================================================
// Test Helpers
// ============================================================================

/// Register a user through a throwaway context and return its ID
fn register_user(temp_dir: &TempDir, name: &str, pin: &str) -> Uuid {
    let ctx = BankAppContext::new(temp_dir.path()).expect("Failed to create context");
    ctx.auth_service
        .register(name, pin, pin)
        .expect("Failed to register user")
        .user_id
}

fn write_settings(temp_dir: &TempDir, json: &str) {
    fs::write(temp_dir.path().join("settings.json"), json).expect("Failed to write settings");
}

// ============================================================================
// Authentication Flow Tests
// ============================================================================

/// Registration in one process, login in the next: the flag is persisted
#[test]
fn test_register_then_login_persists_flag() {
    let temp_dir = TempDir::new().unwrap();
    let user_id = register_user(&temp_dir, "Anna", "2580");

    let ctx = BankAppContext::new(temp_dir.path()).unwrap();
    ctx.auth_service.begin_pin_entry().unwrap();
    ctx.auth_service.submit_pin(user_id, "2580").unwrap();

    // A fresh store reads the flag back from disk
    let store = JsonCredentialStore::new(temp_dir.path());
    let stored = store.fetch_credential(user_id).unwrap().unwrap();
    assert!(stored.is_authenticated);

    // The PIN is never stored in the clear
    assert!(stored.pin.is_hashed());
    let raw: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert_eq!(raw["credentials"][0]["pin"]["scheme"], "argon2");
}

#[test]
fn test_lockout_and_reset_cycle() {
    let temp_dir = TempDir::new().unwrap();
    let user_id = register_user(&temp_dir, "Anna", "2580");
    let ctx = BankAppContext::new(temp_dir.path()).unwrap();
    let auth = &ctx.auth_service;

    auth.begin_pin_entry().unwrap();
    let mut results = Vec::new();
    for _ in 0..3 {
        results.push(auth.submit_pin(user_id, "1111"));
    }
    assert!(matches!(results[0], Err(Error::InvalidPin { attempts: 1, remaining: 2 })));
    assert!(matches!(results[1], Err(Error::InvalidPin { attempts: 2, remaining: 1 })));
    assert!(matches!(results[2], Err(Error::TooManyAttempts { attempts: 3 })));

    // Locked out: begin_pin_entry is not a way around the lock
    assert!(matches!(
        auth.begin_pin_entry(),
        Err(Error::InvalidTransition { from: AuthState::LockedOut, .. })
    ));

    auth.reset().unwrap();
    let session = auth.session().unwrap();
    assert_eq!(session.state, AuthState::Unauthenticated);
    assert_eq!(session.pin_attempt_count, 0);

    auth.begin_pin_entry().unwrap();
    auth.submit_pin(user_id, "2580").unwrap();
    assert!(auth.session().unwrap().is_authenticated());
}

#[test]
fn test_attempt_limit_from_settings() {
    let temp_dir = TempDir::new().unwrap();
    write_settings(&temp_dir, r#"{"auth": {"maxPinAttempts": 5}}"#);
    let user_id = register_user(&temp_dir, "Anna", "2580");

    let config = Config::load(temp_dir.path()).unwrap();
    let store = Arc::new(JsonCredentialStore::new(temp_dir.path()));
    let auth = AuthService::new(store, ScriptedBiometric::unavailable(), config.max_pin_attempts);

    auth.begin_pin_entry().unwrap();
    for attempt in 1..5 {
        match auth.submit_pin(user_id, "0000") {
            Err(Error::InvalidPin { attempts, remaining }) => {
                assert_eq!(attempts, attempt);
                assert_eq!(remaining, 5 - attempt);
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
    assert!(matches!(
        auth.submit_pin(user_id, "0000"),
        Err(Error::TooManyAttempts { attempts: 5 })
    ));
}

#[test]
fn test_biometric_login_then_logout() {
    let temp_dir = TempDir::new().unwrap();
    let user_id = register_user(&temp_dir, "Boris", "1357");

    let ctx = BankAppContext::with_biometric(
        temp_dir.path(),
        ScriptedBiometric::new(BiometricOutcome::matched(user_id)),
    )
    .unwrap();

    ctx.auth_service.authenticate_biometric().unwrap();
    assert_eq!(
        ctx.auth_service.current_user().unwrap().unwrap().display_name,
        "Boris"
    );

    // Wrong PIN keeps the session
    assert!(matches!(
        ctx.auth_service.logout("0000"),
        Err(Error::InvalidPin { .. })
    ));
    assert_eq!(ctx.auth_service.state().unwrap(), AuthState::Authenticated);

    ctx.auth_service.logout("1357").unwrap();
    let stored = ctx.store.fetch_credential(user_id).unwrap().unwrap();
    assert!(!stored.is_authenticated);
}

#[test]
fn test_only_one_user_signed_in() {
    let temp_dir = TempDir::new().unwrap();
    let anna = register_user(&temp_dir, "Anna", "2580");
    let boris = register_user(&temp_dir, "Boris", "1357");

    // Anna signs in and closes the app without logging out
    {
        let ctx = BankAppContext::new(temp_dir.path()).unwrap();
        ctx.auth_service.begin_pin_entry().unwrap();
        ctx.auth_service.submit_pin(anna, "2580").unwrap();
    }

    let ctx = BankAppContext::new(temp_dir.path()).unwrap();
    ctx.auth_service.begin_pin_entry().unwrap();
    ctx.auth_service.submit_pin(boris, "1357").unwrap();

    let signed_in: Vec<String> = ctx
        .auth_service
        .list_users()
        .unwrap()
        .into_iter()
        .filter(|c| c.is_authenticated)
        .map(|c| c.display_name)
        .collect();
    assert_eq!(signed_in, vec!["Boris".to_string()]);
}

#[test]
fn test_users_listed_in_registration_order() {
    let temp_dir = TempDir::new().unwrap();
    register_user(&temp_dir, "Anna", "2580");
    register_user(&temp_dir, "Boris", "1357");
    register_user(&temp_dir, "Vera", "9999");

    let ctx = BankAppContext::new(temp_dir.path()).unwrap();
    let names: Vec<String> = ctx
        .auth_service
        .list_users()
        .unwrap()
        .into_iter()
        .map(|c| c.display_name)
        .collect();
    assert_eq!(names, vec!["Anna", "Boris", "Vera"]);
}

#[test]
fn test_invalid_registration_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = BankAppContext::new(temp_dir.path()).unwrap();

    assert!(matches!(
        ctx.auth_service.register("Anna", "12a4", "12a4"),
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        ctx.auth_service.register("   ", "1234", "1234"),
        Err(Error::Validation(_))
    ));
    assert!(!ctx.store.path().exists());
}

// ============================================================================
// Calculator Tests
// ============================================================================

#[test]
fn test_deposit_rates_from_settings() {
    let temp_dir = TempDir::new().unwrap();
    write_settings(
        &temp_dir,
        r#"{"rates": {"depositNonReplenishable": "12", "depositReplenishable": "6"}}"#,
    );
    let ctx = BankAppContext::new(temp_dir.path()).unwrap();

    let fixed = ctx.calculator_service.deposit(Decimal::from(50_000), 12, true).unwrap();
    assert_eq!(fixed.interest, Decimal::from(6_000));
    let flexible = ctx.calculator_service.deposit(Decimal::from(50_000), 12, false).unwrap();
    assert_eq!(flexible.interest, Decimal::from(3_000));
}

#[test]
fn test_mortgage_from_property() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = BankAppContext::new(temp_dir.path()).unwrap();
    let calc = &ctx.calculator_service;

    let quote = calc
        .mortgage_from_property(Decimal::from(3_500_000), Decimal::from(500_000), 20, Decimal::from(10))
        .unwrap();
    assert_eq!(quote.principal, Decimal::from(3_000_000));
    let monthly = quote.rounded().monthly_payment.to_f64().unwrap();
    assert!((monthly - 28_950.65).abs() < 0.02, "monthly {}", monthly);

    // Down payment below 10% of the property cost
    assert!(matches!(
        calc.mortgage_from_property(Decimal::from(3_500_000), Decimal::from(100_000), 20, Decimal::from(10)),
        Err(Error::InvalidParameters(_))
    ));
}

#[test]
fn test_loan_priced_from_credit_profile() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = BankAppContext::new(temp_dir.path()).unwrap();

    let profile = CreditProfile {
        account_age_days: 700,
        balance: Decimal::from(500_000),
        transaction_count: 20,
        recent_transaction_count: 5,
        ..Default::default()
    };
    let assessment = ctx.credit_service.assess(&profile);
    let quote = ctx
        .calculator_service
        .loan_for_profile(Decimal::from(200_000), 24, &profile)
        .unwrap();
    assert_eq!(quote.annual_rate_percent, assessment.interest_rate_percent);
}

#[test]
fn test_profile_limits_are_enforced() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = BankAppContext::new(temp_dir.path()).unwrap();
    let calc = &ctx.calculator_service;

    let newcomer = CreditProfile::default();
    let envelope: OperationResult<_> =
        calc.loan_for_profile(Decimal::from(50_000), 12, &newcomer).into();
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["context"]["kind"], "credit_denied");

    let profile = CreditProfile {
        account_age_days: 700,
        balance: Decimal::from(500_000),
        transaction_count: 20,
        recent_transaction_count: 5,
        ..Default::default()
    };
    let limit = ctx.credit_service.max_credit_amount(&profile);
    assert!(matches!(
        calc.loan_for_profile(limit + Decimal::ONE, 12, &profile),
        Err(Error::CreditDenied(_))
    ));

    let mortgage_limit = ctx.credit_service.max_mortgage_amount(&profile);
    assert!(calc
        .mortgage_for_profile(mortgage_limit, 20, Decimal::from(10), &profile)
        .is_ok());
    assert!(matches!(
        calc.mortgage_for_profile(mortgage_limit + Decimal::ONE, 20, Decimal::from(10), &profile),
        Err(Error::CreditDenied(_))
    ));
}

// ============================================================================
// Error Envelope and Logging Tests
// ============================================================================

#[test]
fn test_operation_result_carries_error_kind() {
    let temp_dir = TempDir::new().unwrap();
    let user_id = register_user(&temp_dir, "Anna", "2580");
    let ctx = BankAppContext::new(temp_dir.path()).unwrap();
    ctx.auth_service.begin_pin_entry().unwrap();

    let envelope: OperationResult<_> = ctx.auth_service.submit_pin(user_id, "0000").into();
    let json = serde_json::to_value(&envelope).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["context"]["kind"], "invalid_pin");
    assert_eq!(json["context"]["remaining"], 2);
}

#[test]
fn test_log_never_contains_pin() {
    let temp_dir = TempDir::new().unwrap();
    let logger = LoggingService::new(temp_dir.path(), EntryPoint::Cli, "0.1.0").unwrap();
    let user_id = register_user(&temp_dir, "Anna", "2580");
    let ctx = BankAppContext::new(temp_dir.path()).unwrap();
    ctx.auth_service.begin_pin_entry().unwrap();

    if let Err(e) = ctx.auth_service.submit_pin(user_id, "0000") {
        logger
            .log(LogEvent::new("pin_rejected").with_command("login").with_error(e.kind()))
            .unwrap();
    }

    let entries = logger.get_errors(10).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].event, "pin_rejected");
    assert_eq!(entries[0].error_message.as_deref(), Some("invalid_pin"));
    assert!(!fs::read_to_string(logger.path()).unwrap().contains("Anna"));
}
