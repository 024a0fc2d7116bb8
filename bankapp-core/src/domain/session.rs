//! Session and the PIN/biometric authentication state machine
//!
//! The state machine never touches storage. Every transition reports the
//! resulting state plus an optional [`AuthEffect`] describing what the
//! persistence collaborator should record.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::credential::UserCredential;
use super::result::{Error, Result};

/// Default number of failed PIN attempts before lockout
pub const DEFAULT_MAX_PIN_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthState {
    Unauthenticated,
    AwaitingPin,
    Authenticated,
    LockedOut,
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AuthState::Unauthenticated => "unauthenticated",
            AuthState::AwaitingPin => "awaiting PIN",
            AuthState::Authenticated => "authenticated",
            AuthState::LockedOut => "locked out",
        };
        f.write_str(label)
    }
}

/// Authentication state of the single active client session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: AuthState,
    pub pin_attempt_count: u32,
    /// Present iff `state == Authenticated`
    pub active_user_id: Option<Uuid>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            state: AuthState::Unauthenticated,
            pin_attempt_count: 0,
            active_user_id: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// Storage change the caller must apply after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum AuthEffect {
    MarkAuthenticated { user_id: Uuid },
    MarkDeauthenticated { user_id: Uuid },
}

/// Result of a successful transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub state: AuthState,
    pub effect: Option<AuthEffect>,
}

impl Transition {
    fn to(state: AuthState) -> Self {
        Self { state, effect: None }
    }

    fn with_effect(state: AuthState, effect: AuthEffect) -> Self {
        Self {
            state,
            effect: Some(effect),
        }
    }
}

/// Outcome reported by the biometric collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BiometricOutcome {
    pub success: bool,
    /// Enrolled user resolved by the platform, if any
    pub user_id: Option<Uuid>,
}

impl BiometricOutcome {
    pub fn matched(user_id: Uuid) -> Self {
        Self {
            success: true,
            user_id: Some(user_id),
        }
    }

    pub fn no_enrolled_user() -> Self {
        Self {
            success: true,
            user_id: None,
        }
    }

    pub fn rejected() -> Self {
        Self {
            success: false,
            user_id: None,
        }
    }
}

/// PIN/biometric authentication state machine owning one [`Session`]
#[derive(Debug, Clone)]
pub struct AuthStateMachine {
    session: Session,
    max_attempts: u32,
}

impl AuthStateMachine {
    /// Create a state machine; `max_attempts` is clamped to at least 1
    pub fn new(max_attempts: u32) -> Self {
        Self {
            session: Session::new(),
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> AuthState {
        self.session.state
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// User picked PIN as the sign-in method
    pub fn begin_pin_entry(&mut self) -> Result<Transition> {
        match self.session.state {
            AuthState::Unauthenticated => {
                self.session.state = AuthState::AwaitingPin;
                self.session.pin_attempt_count = 0;
                Ok(Transition::to(AuthState::AwaitingPin))
            }
            // Re-selecting PIN must not clear the running attempt count
            AuthState::AwaitingPin => Ok(Transition::to(AuthState::AwaitingPin)),
            from => Err(Error::InvalidTransition {
                from,
                action: "start PIN entry",
            }),
        }
    }

    /// Accept the outcome of a biometric challenge performed by the caller
    pub fn accept_biometric(&mut self, outcome: BiometricOutcome) -> Result<Transition> {
        match self.session.state {
            AuthState::Unauthenticated | AuthState::AwaitingPin => {}
            from => {
                return Err(Error::InvalidTransition {
                    from,
                    action: "accept a biometric result",
                })
            }
        }

        if !outcome.success {
            return Err(Error::BiometricRejected);
        }
        let user_id = outcome.user_id.ok_or(Error::NoMatchingUser)?;

        Ok(self.authenticate(user_id))
    }

    /// Compare a submitted PIN against the candidate credential
    pub fn submit_pin(&mut self, pin: &str, candidate: &UserCredential) -> Result<Transition> {
        self.ensure_awaiting_pin()?;

        if candidate.verify_pin(pin) {
            return Ok(self.authenticate(candidate.user_id));
        }

        self.session.pin_attempt_count += 1;
        let attempts = self.session.pin_attempt_count;
        if attempts >= self.max_attempts {
            self.session.state = AuthState::LockedOut;
            return Err(Error::TooManyAttempts { attempts });
        }

        Err(Error::InvalidPin {
            attempts,
            remaining: self.max_attempts - attempts,
        })
    }

    /// Fails the way `submit_pin` would if a PIN cannot be taken right now
    pub fn ensure_awaiting_pin(&self) -> Result<()> {
        match self.session.state {
            AuthState::AwaitingPin => Ok(()),
            AuthState::LockedOut => Err(Error::TooManyAttempts {
                attempts: self.session.pin_attempt_count,
            }),
            from => Err(Error::InvalidTransition {
                from,
                action: "submit a PIN",
            }),
        }
    }

    /// Leave lockout; a no-op when already unauthenticated
    pub fn reset(&mut self) -> Result<Transition> {
        match self.session.state {
            AuthState::LockedOut | AuthState::Unauthenticated => {
                self.session = Session::new();
                Ok(Transition::to(AuthState::Unauthenticated))
            }
            from => Err(Error::InvalidTransition {
                from,
                action: "reset the session",
            }),
        }
    }

    /// Pick up a sign-in that storage already records
    ///
    /// No effect is returned since the record is already marked.
    pub fn resume(&mut self, user_id: Uuid) -> Result<Transition> {
        match self.session.state {
            AuthState::Unauthenticated => {
                self.session.state = AuthState::Authenticated;
                self.session.pin_attempt_count = 0;
                self.session.active_user_id = Some(user_id);
                Ok(Transition::to(AuthState::Authenticated))
            }
            from => Err(Error::InvalidTransition {
                from,
                action: "resume a session",
            }),
        }
    }

    /// Sign out after re-validating the PIN of the signed-in user
    pub fn logout(&mut self, pin: &str, current: &UserCredential) -> Result<Transition> {
        let active = match (self.session.state, self.session.active_user_id) {
            (AuthState::Authenticated, Some(id)) => id,
            (from, _) => {
                return Err(Error::InvalidTransition {
                    from,
                    action: "log out",
                })
            }
        };
        if current.user_id != active {
            return Err(Error::NoMatchingUser);
        }
        if !current.verify_pin(pin) {
            return Err(Error::InvalidPin {
                attempts: 0,
                remaining: self.max_attempts,
            });
        }

        self.session = Session::new();
        Ok(Transition::with_effect(
            AuthState::Unauthenticated,
            AuthEffect::MarkDeauthenticated { user_id: active },
        ))
    }

    fn authenticate(&mut self, user_id: Uuid) -> Transition {
        self.session.state = AuthState::Authenticated;
        self.session.pin_attempt_count = 0;
        self.session.active_user_id = Some(user_id);
        Transition::with_effect(
            AuthState::Authenticated,
            AuthEffect::MarkAuthenticated { user_id },
        )
    }
}

impl Default for AuthStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PIN_ATTEMPTS)
    }
}
