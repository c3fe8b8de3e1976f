//! Unified error type for the budgeting core.
//!
//! Core functions return [`Result`] and propagate with `?`. The service layer
//! turns every variant into a structured failure for the caller.

use chrono::NaiveDate;
use thiserror::Error;

/// All failures the budgeting core can report.
#[derive(Debug, Error)]
pub enum Error {
    /// No authenticated owner was supplied for the operation
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Amount was zero, negative, NaN or infinite where that is not allowed
    #[error("Invalid amount: {amount}")]
    InvalidAmount { amount: f64 },

    /// Transaction description exceeded the allowed length
    #[error("Description is too long ({len} characters, maximum {max})")]
    DescriptionTooLong { len: usize, max: usize },

    /// Category, debt or savings goal name was empty or too long
    #[error("Invalid name: {reason}")]
    InvalidName { reason: String },

    /// A debt payment was submitted without a debt to pay
    #[error("A debt must be selected for a debt payment")]
    MissingDebtTarget,

    /// Transaction type string was not one of income, expense, debt_payment
    #[error("Unknown transaction type: {value}")]
    InvalidTransactionType { value: String },

    /// Commitment type string was not one of fixed, variable_fixed
    #[error("Unknown commitment type: {value}")]
    InvalidCommitmentType { value: String },

    /// Close-month attempted before the month's final day
    #[error("Month {month} is still in progress and can be closed on {closes_on}")]
    MonthStillInProgress {
        month: NaiveDate,
        closes_on: NaiveDate,
    },

    /// Close-month attempted on a month that is already closed
    #[error("Month {month} is already closed")]
    MonthAlreadyClosed { month: NaiveDate },

    #[error("Month not found: {month}")]
    MonthNotFound { month: NaiveDate },

    #[error("Category not found: {id}")]
    CategoryNotFound { id: i64 },

    #[error("Debt not found: {id}")]
    DebtNotFound { id: i64 },

    #[error("Savings goal not found: {id}")]
    SavingsGoalNotFound { id: i64 },

    #[error("Transaction not found: {id}")]
    TransactionNotFound { id: i64 },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// True for failures of the backing store rather than of the caller's input.
    ///
    /// These are logged and reported to callers as a generic failure.
    #[must_use]
    pub const fn is_store_failure(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Io(_))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
