//! In-memory credential store

use std::sync::Mutex;

use uuid::Uuid;

use super::apply_effect_to;
use crate::domain::result::{Error, Result};
use crate::domain::{AuthEffect, UserCredential};
use crate::ports::CredentialStore;

/// Credential store kept entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: Mutex<Vec<UserCredential>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Vec<UserCredential>) -> Self {
        Self {
            credentials: Mutex::new(credentials),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<UserCredential>>> {
        self.credentials
            .lock()
            .map_err(|e| Error::storage(format!("Lock poisoned: {}", e)))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn fetch_credential(&self, user_id: Uuid) -> Result<Option<UserCredential>> {
        Ok(self.lock()?.iter().find(|c| c.user_id == user_id).cloned())
    }

    fn list_credentials(&self) -> Result<Vec<UserCredential>> {
        Ok(self.lock()?.clone())
    }

    fn save_credential(&self, credential: &UserCredential) -> Result<()> {
        let mut credentials = self.lock()?;
        match credentials.iter_mut().find(|c| c.user_id == credential.user_id) {
            Some(existing) => *existing = credential.clone(),
            None => credentials.push(credential.clone()),
        }
        Ok(())
    }

    fn apply_effect(&self, effect: &AuthEffect) -> Result<()> {
        apply_effect_to(&mut self.lock()?, effect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PinDigest;

    fn credential(name: &str) -> UserCredential {
        UserCredential::new(Uuid::new_v4(), name, PinDigest::Plain("1234".to_string()))
    }

    #[test]
    fn test_mark_authenticated_is_exclusive() {
        let first = credential("First");
        let second = credential("Second");
        let store = InMemoryCredentialStore::with_credentials(vec![first.clone(), second.clone()]);

        store
            .apply_effect(&AuthEffect::MarkAuthenticated { user_id: first.user_id })
            .unwrap();
        store
            .apply_effect(&AuthEffect::MarkAuthenticated { user_id: second.user_id })
            .unwrap();

        let signed_in: Vec<_> = store
            .list_credentials()
            .unwrap()
            .into_iter()
            .filter(|c| c.is_authenticated)
            .map(|c| c.user_id)
            .collect();
        assert_eq!(signed_in, vec![second.user_id]);
    }

    #[test]
    fn test_effect_for_unknown_user() {
        let store = InMemoryCredentialStore::new();
        let err = store
            .apply_effect(&AuthEffect::MarkDeauthenticated { user_id: Uuid::new_v4() })
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_save_replaces_existing() {
        let mut cred = credential("Before");
        let store = InMemoryCredentialStore::new();
        store.save_credential(&cred).unwrap();

        cred.display_name = "After".to_string();
        store.save_credential(&cred).unwrap();

        let all = store.list_credentials().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].display_name, "After");
    }
}
