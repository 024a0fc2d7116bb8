//! User credential domain model

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::result::{Error, Result};

/// Number of digits in a PIN
pub const PIN_LENGTH: usize = 4;

/// Stored form of a user's PIN
///
/// `Plain` exists for records carried over from the legacy client, which
/// kept raw PINs. Everything registered through [`UserCredential::register`]
/// is stored as an Argon2id PHC string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scheme", content = "value", rename_all = "lowercase")]
pub enum PinDigest {
    Plain(String),
    Argon2(String),
}

impl PinDigest {
    /// Hash a PIN with Argon2id and a fresh random salt
    pub fn hash(pin: &str) -> Result<Self> {
        let mut salt_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut salt_bytes);
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| Error::Other(format!("Failed to encode salt: {}", e)))?;

        let phc = Argon2::default()
            .hash_password(pin.as_bytes(), &salt)
            .map_err(|e| Error::Other(format!("Failed to hash PIN: {}", e)))?
            .to_string();

        Ok(PinDigest::Argon2(phc))
    }

    /// Check a submitted PIN against the stored digest
    ///
    /// A malformed PHC string never matches.
    pub fn matches(&self, pin: &str) -> bool {
        match self {
            PinDigest::Plain(stored) => stored.as_bytes() == pin.as_bytes(),
            PinDigest::Argon2(phc) => match PasswordHash::new(phc) {
                Ok(parsed) => Argon2::default()
                    .verify_password(pin.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => false,
            },
        }
    }

    pub fn is_hashed(&self) -> bool {
        matches!(self, PinDigest::Argon2(_))
    }
}

/// A user's sign-in credential, as supplied by the persistence collaborator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredential {
    pub user_id: Uuid,
    pub display_name: String,
    pub pin: PinDigest,
    /// Mirrors the persisted "signed in" flag; only changed by applying
    /// effect descriptors
    pub is_authenticated: bool,
    pub created_at: DateTime<Utc>,
}

impl UserCredential {
    /// Create a credential from an existing digest
    pub fn new(user_id: Uuid, display_name: impl Into<String>, pin: PinDigest) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            pin,
            is_authenticated: false,
            created_at: Utc::now(),
        }
    }

    /// Register a new user: validate the PIN and its confirmation, then hash it
    pub fn register(display_name: impl Into<String>, pin: &str, confirm_pin: &str) -> Result<Self> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(Error::validation("display name cannot be empty"));
        }
        validate_pin_format(pin)?;
        if pin != confirm_pin {
            return Err(Error::validation("PIN codes do not match"));
        }

        Ok(Self::new(Uuid::new_v4(), display_name.trim(), PinDigest::hash(pin)?))
    }

    /// Compare a submitted PIN with this credential
    pub fn verify_pin(&self, pin: &str) -> bool {
        self.pin.matches(pin)
    }
}

/// A PIN must be exactly [`PIN_LENGTH`] ASCII digits
pub fn validate_pin_format(pin: &str) -> Result<()> {
    if pin.len() != PIN_LENGTH || !pin.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::validation(format!(
            "PIN must contain exactly {} digits",
            PIN_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_digest_compares_content() {
        let digest = PinDigest::Plain("1234".to_string());
        assert!(digest.matches("1234"));
        assert!(!digest.matches("1235"));
        assert!(!digest.matches(""));
    }

    #[test]
    fn test_register_hashes_pin() {
        let cred = UserCredential::register("Anna", "4821", "4821").unwrap();
        assert!(cred.pin.is_hashed());
        assert!(!cred.is_authenticated);
        assert!(cred.verify_pin("4821"));
        assert!(!cred.verify_pin("4822"));
    }

    #[test]
    fn test_register_rejects_mismatched_confirmation() {
        let err = UserCredential::register("Anna", "4821", "4812").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_pin_format() {
        assert!(validate_pin_format("0000").is_ok());
        assert!(validate_pin_format("123").is_err());
        assert!(validate_pin_format("12345").is_err());
        assert!(validate_pin_format("12a4").is_err());
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        let digest = PinDigest::Argon2("not-a-phc-string".to_string());
        assert!(!digest.matches("not-a-phc-string"));
    }

    #[test]
    fn test_digest_serialization_is_tagged() {
        let json = serde_json::to_value(PinDigest::Plain("1111".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"scheme": "plain", "value": "1111"}));
    }
}
