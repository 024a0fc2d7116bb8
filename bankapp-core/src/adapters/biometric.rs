//! Scripted biometric authenticator
//!
//! There is no portable sensor API, so hosts without one (the CLI, tests)
//! supply the outcome up front.

use crate::domain::result::Result;
use crate::domain::BiometricOutcome;
use crate::ports::BiometricAuthenticator;

/// Returns the same outcome on every challenge
#[derive(Debug, Clone, Copy)]
pub struct ScriptedBiometric {
    outcome: BiometricOutcome,
}

impl ScriptedBiometric {
    pub fn new(outcome: BiometricOutcome) -> Self {
        Self { outcome }
    }

    /// A device with no biometrics enrolled; every challenge fails
    pub fn unavailable() -> Self {
        Self::new(BiometricOutcome::rejected())
    }
}

impl BiometricAuthenticator for ScriptedBiometric {
    fn evaluate_biometric(&self) -> Result<BiometricOutcome> {
        Ok(self.outcome)
    }
}
