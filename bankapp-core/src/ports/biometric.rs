//! Biometric authenticator port

use crate::domain::result::Result;
use crate::domain::BiometricOutcome;

/// Performs the platform biometric challenge
///
/// The core never talks to a sensor itself; it only consumes the outcome
/// and the identity the platform resolved.
pub trait BiometricAuthenticator: Send + Sync {
    /// Run a challenge and report whether it passed and for whom
    fn evaluate_biometric(&self) -> Result<BiometricOutcome>;
}
