//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - JSON file and in-memory stores for the CredentialStore port
//! - A scripted outcome for the BiometricAuthenticator port

pub mod biometric;
pub mod json_store;
pub mod memory;

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{AuthEffect, UserCredential};

/// Apply an effect descriptor to a set of loaded credentials
pub(crate) fn apply_effect_to(credentials: &mut [UserCredential], effect: &AuthEffect) -> Result<()> {
    let target: Uuid = match effect {
        AuthEffect::MarkAuthenticated { user_id } | AuthEffect::MarkDeauthenticated { user_id } => {
            *user_id
        }
    };
    if !credentials.iter().any(|c| c.user_id == target) {
        return Err(Error::not_found(format!("credential {}", target)));
    }

    match effect {
        AuthEffect::MarkAuthenticated { user_id } => {
            for credential in credentials.iter_mut() {
                credential.is_authenticated = credential.user_id == *user_id;
            }
        }
        AuthEffect::MarkDeauthenticated { user_id } => {
            for credential in credentials.iter_mut().filter(|c| c.user_id == *user_id) {
                credential.is_authenticated = false;
            }
        }
    }
    Ok(())
}
