//! Auth service - drives the session state machine against the ports
//!
//! One mutex guards the state machine, so a PIN attempt is counted under the
//! same lock that reads the count and concurrent callers can never slip an
//! extra attempt past the limit. Effects returned by a transition are
//! applied to the credential store before the lock is released; if the
//! store refuses, the session is rolled back.

use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::domain::{AuthState, AuthStateMachine, BiometricOutcome, Session, Transition, UserCredential};
use crate::ports::{BiometricAuthenticator, CredentialStore};

/// Authentication service for the single active session
pub struct AuthService<S: CredentialStore, B: BiometricAuthenticator> {
    machine: Mutex<AuthStateMachine>,
    store: Arc<S>,
    biometric: B,
}

impl<S: CredentialStore, B: BiometricAuthenticator> AuthService<S, B> {
    pub fn new(store: Arc<S>, biometric: B, max_attempts: u32) -> Self {
        Self {
            machine: Mutex::new(AuthStateMachine::new(max_attempts)),
            store,
            biometric,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, AuthStateMachine>> {
        self.machine
            .lock()
            .map_err(|e| Error::Other(format!("Session lock poisoned: {}", e)))
    }

    /// Apply the transition's effect, undoing the transition if that fails
    fn commit(
        &self,
        machine: &mut AuthStateMachine,
        before: AuthStateMachine,
        transition: Transition,
    ) -> Result<Transition> {
        if let Some(effect) = &transition.effect {
            if let Err(e) = self.store.apply_effect(effect) {
                *machine = before;
                return Err(e);
            }
        }
        Ok(transition)
    }

    /// Snapshot of the current session
    pub fn session(&self) -> Result<Session> {
        Ok(self.lock()?.session().clone())
    }

    pub fn state(&self) -> Result<AuthState> {
        Ok(self.lock()?.state())
    }

    pub fn max_attempts(&self) -> Result<u32> {
        Ok(self.lock()?.max_attempts())
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub fn begin_pin_entry(&self) -> Result<Transition> {
        self.lock()?.begin_pin_entry()
    }

    /// Run the biometric challenge and sign in whoever it resolves to
    ///
    /// A resolved user that is not in the store counts as no match.
    pub fn authenticate_biometric(&self) -> Result<Transition> {
        let mut machine = self.lock()?;
        let before = machine.clone();

        let mut outcome = self.biometric.evaluate_biometric()?;
        if let Some(user_id) = outcome.user_id {
            if self.store.fetch_credential(user_id)?.is_none() {
                outcome = BiometricOutcome {
                    user_id: None,
                    ..outcome
                };
            }
        }

        let transition = machine.accept_biometric(outcome)?;
        self.commit(&mut machine, before, transition)
    }

    /// Check a PIN for the given user
    ///
    /// An unknown user is rejected with `NoMatchingUser` and does not use
    /// up an attempt.
    pub fn submit_pin(&self, user_id: Uuid, pin: &str) -> Result<Transition> {
        let mut machine = self.lock()?;
        machine.ensure_awaiting_pin()?;
        let before = machine.clone();

        let candidate = self
            .store
            .fetch_credential(user_id)?
            .ok_or(Error::NoMatchingUser)?;
        let transition = machine.submit_pin(pin, &candidate)?;
        self.commit(&mut machine, before, transition)
    }

    pub fn reset(&self) -> Result<Transition> {
        self.lock()?.reset()
    }

    /// Sign the active user out after re-checking their PIN
    pub fn logout(&self, pin: &str) -> Result<Transition> {
        let mut machine = self.lock()?;
        let Some(user_id) = machine.session().active_user_id else {
            return Err(Error::InvalidTransition {
                from: machine.state(),
                action: "log out",
            });
        };
        let before = machine.clone();

        let current = self
            .store
            .fetch_credential(user_id)?
            .ok_or(Error::NoMatchingUser)?;
        let transition = machine.logout(pin, &current)?;
        self.commit(&mut machine, before, transition)
    }

    /// Resume the session of the user storage marks as signed in
    ///
    /// Returns `None` when nobody is signed in.
    pub fn resume_signed_in(&self) -> Result<Option<Transition>> {
        let mut machine = self.lock()?;
        let signed_in = self
            .store
            .list_credentials()?
            .into_iter()
            .find(|c| c.is_authenticated);
        match signed_in {
            Some(credential) => machine.resume(credential.user_id).map(Some),
            None => Ok(None),
        }
    }

    /// Credential of the signed-in user, if any
    pub fn current_user(&self) -> Result<Option<UserCredential>> {
        let active = self.lock()?.session().active_user_id;
        match active {
            Some(user_id) => self.store.fetch_credential(user_id),
            None => Ok(None),
        }
    }

    /// Enroll a new user; the PIN is hashed before it is stored
    pub fn register(&self, display_name: &str, pin: &str, confirm_pin: &str) -> Result<UserCredential> {
        let credential = UserCredential::register(display_name, pin, confirm_pin)?;
        self.store.save_credential(&credential)?;
        Ok(credential)
    }

    pub fn list_users(&self) -> Result<Vec<UserCredential>> {
        self.store.list_credentials()
    }
}
