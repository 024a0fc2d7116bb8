//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external collaborators. The core domain
//! depends only on these traits, not on concrete implementations.

mod biometric;
mod credential_store;

pub use biometric::BiometricAuthenticator;
pub use credential_store::CredentialStore;
