//! Bank App CLI - loan, mortgage and deposit calculators with PIN sign-in

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;

mod commands;
mod output;

use commands::{config, credit, deposit, loan, login, logs, mortgage, status, user};

/// Bank App - banking calculators and sign-in in your terminal
#[derive(Parser)]
#[command(name = "bank", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the signed-in user and active settings
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Calculate monthly payment and overpayment for a loan
    Loan {
        /// Loan amount
        #[arg(long)]
        principal: Decimal,
        /// Term in months
        #[arg(long)]
        months: u32,
        /// Annual interest rate in percent
        #[arg(long, conflicts_with = "profile")]
        rate: Option<Decimal>,
        /// Credit profile JSON; the rate follows from its score
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Print the month-by-month schedule
        #[arg(long)]
        schedule: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Calculate monthly payment and overpayment for a mortgage
    Mortgage {
        /// Loan amount
        #[arg(long, conflicts_with_all = ["cost", "down_payment"])]
        principal: Option<Decimal>,
        /// Property cost
        #[arg(long, requires = "down_payment")]
        cost: Option<Decimal>,
        /// Down payment, at least 10% of the property cost
        #[arg(long, requires = "cost")]
        down_payment: Option<Decimal>,
        /// Term in years
        #[arg(long)]
        years: u32,
        /// Annual interest rate in percent
        #[arg(long)]
        rate: Decimal,
        /// Credit profile JSON; refuses mortgages the profile does not qualify for
        #[arg(long)]
        profile: Option<PathBuf>,
        /// Print the month-by-month schedule
        #[arg(long)]
        schedule: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Calculate interest on a term deposit
    Deposit {
        /// Deposit amount
        #[arg(long)]
        amount: Decimal,
        /// Term in months
        #[arg(long)]
        months: u32,
        /// No top-ups or early withdrawals (higher rate)
        #[arg(long)]
        non_replenishable: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Score a credit profile and show loan and mortgage limits
    Credit {
        /// Credit profile JSON
        profile: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show settings, or change them with the flags below
    Config {
        /// Annual rate for non-replenishable deposits, in percent
        #[arg(long)]
        deposit_non_replenishable: Option<Decimal>,
        /// Annual rate for replenishable deposits, in percent
        #[arg(long)]
        deposit_replenishable: Option<Decimal>,
        /// Failed PIN attempts before lockout
        #[arg(long)]
        max_pin_attempts: Option<u32>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage users
    User {
        #[command(subcommand)]
        command: user::UserCommands,
    },

    /// Sign in with a PIN or a simulated biometric check
    Login {
        /// User name or ID (prompted if several users exist)
        #[arg(long, short)]
        user: Option<String>,
        /// PIN (prompted if omitted; a supplied PIN gets one attempt)
        #[arg(long)]
        pin: Option<String>,
        /// Simulate the platform biometric challenge instead of a PIN
        #[arg(long, value_enum)]
        biometric: Option<login::BiometricMode>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sign out the signed-in user (requires their PIN)
    Logout {
        /// PIN (prompted if omitted)
        #[arg(long)]
        pin: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Status { json } => status::run(json),
        Commands::Loan { principal, months, rate, profile, schedule, json } => {
            loan::run(principal, months, rate, profile, schedule, json)
        }
        Commands::Mortgage { principal, cost, down_payment, years, rate, profile, schedule, json } => {
            let terms = mortgage::MortgageTerms { principal, cost, down_payment, years, rate };
            mortgage::run(terms, profile, schedule, json)
        }
        Commands::Deposit { amount, months, non_replenishable, json } => {
            deposit::run(amount, months, non_replenishable, json)
        }
        Commands::Credit { profile, json } => credit::run(&profile, json),
        Commands::Config {
            deposit_non_replenishable,
            deposit_replenishable,
            max_pin_attempts,
            json,
        } => {
            let changes = config::ConfigChanges {
                deposit_non_replenishable,
                deposit_replenishable,
                max_pin_attempts,
            };
            config::run(changes, json)
        }
        Commands::User { command } => user::run(command),
        Commands::Login { user, pin, biometric, json } => login::run_login(user, pin, biometric, json),
        Commands::Logout { pin, json } => login::run_logout(pin, json),
        Commands::Logs { command } => logs::run(command),
    }
}
