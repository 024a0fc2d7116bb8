//! BankApp Core - session authentication and financial product calculations
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core entities and rules (Session, UserCredential, quotes, credit profiles)
//! - **ports**: Trait definitions for external collaborators (CredentialStore, BiometricAuthenticator)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (JSON file store, in-memory store, scripted biometrics)

pub mod domain;
pub mod ports;
pub mod services;
pub mod adapters;
pub mod config;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use adapters::biometric::ScriptedBiometric;
use adapters::json_store::JsonCredentialStore;
use config::Config;
use services::*;

// Re-export commonly used types at crate root
pub use domain::{
    AuthEffect, AuthState, BiometricOutcome, CreditProfile, DepositQuote, LoanQuote, Session,
    Transition, UserCredential,
};
pub use domain::result::{Error, OperationResult};
pub use services::{EntryPoint, LogEvent, LoggingService};

/// Auth service wired to the file-backed store
pub type FileAuthService = AuthService<JsonCredentialStore, ScriptedBiometric>;

/// Main context for BankApp operations
///
/// This is the primary entry point for all business logic. It holds
/// the configuration, the credential store and all services.
pub struct BankAppContext {
    pub config: Config,
    pub store: Arc<JsonCredentialStore>,
    pub auth_service: FileAuthService,
    pub calculator_service: CalculatorService,
    pub credit_service: CreditService,
}

impl BankAppContext {
    /// Create a context with no biometric sensor available
    pub fn new(data_dir: &Path) -> Result<Self> {
        Self::with_biometric(data_dir, ScriptedBiometric::unavailable())
    }

    /// Create a context whose biometric challenges report `biometric`'s outcome
    pub fn with_biometric(data_dir: &Path, biometric: ScriptedBiometric) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory {}", data_dir.display()))?;
        let config = Config::load(data_dir)?;

        let store = Arc::new(JsonCredentialStore::new(data_dir));
        let auth_service = AuthService::new(Arc::clone(&store), biometric, config.max_pin_attempts);
        let calculator_service = CalculatorService::new(config.deposit_rates);
        let credit_service = CreditService::new();

        Ok(Self {
            config,
            store,
            auth_service,
            calculator_service,
            credit_service,
        })
    }
}
