//! Credential store port
//!
//! Stands in for the persistence collaborator: it supplies credentials for
//! comparison and applies the effect descriptors the session returns.

use uuid::Uuid;

use crate::domain::result::Result;
use crate::domain::{AuthEffect, UserCredential};

/// Storage for user credentials
///
/// Implementations decide where records live; the core only reads them and
/// hands back [`AuthEffect`]s to record.
pub trait CredentialStore: Send + Sync {
    /// Fetch a credential by user ID
    fn fetch_credential(&self, user_id: Uuid) -> Result<Option<UserCredential>>;

    /// All known credentials, oldest first
    fn list_credentials(&self) -> Result<Vec<UserCredential>>;

    /// Insert or replace a credential
    fn save_credential(&self, credential: &UserCredential) -> Result<()>;

    /// Durably apply an effect descriptor
    ///
    /// `MarkAuthenticated` clears the flag on every other credential, so at
    /// most one user is signed in at a time.
    fn apply_effect(&self, effect: &AuthEffect) -> Result<()>;
}
