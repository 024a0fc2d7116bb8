//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::session::AuthState;

/// Core library error type
///
/// Every rejection the core can produce has its own variant so callers can
/// pick the right recovery (re-prompt, force a reset, offer registration).
#[derive(Error, Debug)]
pub enum Error {
    /// Non-positive or out-of-range numeric input to a calculator call
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Submitted PIN did not match; the session is still awaiting a PIN
    #[error("Invalid PIN ({attempts} failed, {remaining} remaining)")]
    InvalidPin { attempts: u32, remaining: u32 },

    /// The attempt limit was reached; a reset is required
    #[error("Too many failed PIN attempts ({attempts}), session locked")]
    TooManyAttempts { attempts: u32 },

    /// No enrolled user matches the supplied identity
    #[error("No matching user")]
    NoMatchingUser,

    /// The credit profile does not qualify for the requested product or amount
    #[error("Credit denied: {0}")]
    CreditDenied(String),

    /// The biometric collaborator reported a failed challenge
    #[error("Biometric authentication was rejected")]
    BiometricRejected,

    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: AuthState, action: &'static str },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid parameters error
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        Self::InvalidParameters(msg.into())
    }

    /// Create a credit denied error
    pub fn credit_denied(msg: impl Into<String>) -> Self {
        Self::CreditDenied(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Short machine-readable kind, used for JSON output and event logs
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidParameters(_) => "invalid_parameters",
            Error::InvalidPin { .. } => "invalid_pin",
            Error::TooManyAttempts { .. } => "too_many_attempts",
            Error::NoMatchingUser => "no_matching_user",
            Error::CreditDenied(_) => "credit_denied",
            Error::BiometricRejected => "biometric_rejected",
            Error::InvalidTransition { .. } => "invalid_transition",
            Error::NotFound(_) => "not_found",
            Error::Validation(_) => "validation",
            Error::Storage(_) => "storage",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
            Error::Other(_) => "other",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a failed result with context
    pub fn fail_with_context(
        error: impl Into<String>,
        context: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: Some(context),
        }
    }

    /// Create a failed result describing a core error
    ///
    /// The context carries the error kind, plus the attempt counters for a
    /// rejected PIN.
    pub fn from_error(e: &Error) -> Self {
        let mut context = HashMap::new();
        context.insert("kind".to_string(), serde_json::json!(e.kind()));
        match e {
            Error::InvalidPin { attempts, remaining } => {
                context.insert("attempts".to_string(), serde_json::json!(attempts));
                context.insert("remaining".to_string(), serde_json::json!(remaining));
            }
            Error::TooManyAttempts { attempts } => {
                context.insert("attempts".to_string(), serde_json::json!(attempts));
            }
            _ => {}
        }
        Self::fail_with_context(e.to_string(), context)
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::from_error(&e),
        }
    }
}
