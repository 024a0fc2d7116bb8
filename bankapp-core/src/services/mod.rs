//! Service layer - business logic orchestration
//!
//! Services coordinate domain logic and port interactions. Each service
//! focuses on a specific use case or feature area.

mod auth;
mod calculator;
mod credit;
pub mod logging;

pub use auth::AuthService;
pub use calculator::{compute_deposit, compute_loan, compute_mortgage, CalculatorService};
pub use credit::{CreditAssessment, CreditService};
pub use logging::{EntryPoint, LogEntry, LogEvent, LogStats, LoggingService};
