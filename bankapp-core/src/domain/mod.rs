//! Core domain entities
//!
//! Sessions, credentials, product requests and quotes, credit profiles.
//! Pure data structures and rules - no I/O.

pub mod credential;
pub mod credit;
pub mod product;
pub mod result;
pub mod session;

pub use credential::{PinDigest, UserCredential};
pub use credit::{CreditProfile, CreditScore, LoanHistory, MortgageHistory};
pub use product::{
    AmortizationRow, DepositQuote, DepositRates, DepositRequest, LoanQuote, LoanRequest,
    MortgageRequest,
};
pub use session::{AuthEffect, AuthState, AuthStateMachine, BiometricOutcome, Session, Transition};
