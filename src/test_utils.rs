//! Shared test utilities for the budget ledger.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults. Every helper writes through
//! the same core functions production code uses, for the owner [`TEST_OWNER`].

use crate::{
    core::{
        category::{self, CategoryInput, Commitment},
        classify::TransactionKind,
        debt::{self, DebtInput},
        transaction::{self, NewTransaction},
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Owner id used by every helper in this module
pub const TEST_OWNER: &str = "test-owner";

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// First day of the month the tests work in (March 2025).
#[must_use]
pub fn test_month_start() -> NaiveDate {
    test_date(1)
}

/// A day in March 2025.
///
/// # Panics
/// Panics if `day` is not a valid day of March.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn test_date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
}

/// Last day of the test month, the first day a close is allowed.
#[must_use]
pub fn test_last_day() -> NaiveDate {
    test_date(31)
}

/// Creates a category for [`TEST_OWNER`].
pub async fn create_test_category(
    db: &DatabaseConnection,
    name: &str,
    commitment: Commitment,
) -> Result<entities::category::Model> {
    category::create_category(
        db,
        TEST_OWNER,
        CategoryInput {
            name: name.to_string(),
            commitment,
        },
    )
    .await
}

/// Creates a debt with a zero interest rate.
pub async fn create_test_debt(
    db: &DatabaseConnection,
    name: &str,
    balance: f64,
) -> Result<entities::debt::Model> {
    debt::create_debt(db, TEST_OWNER, DebtInput::new(name, balance, 0.0)?).await
}

/// Records a transaction with the default description for its kind.
///
/// Targets are normalised the same way as in production, so a category passed
/// with an income is dropped.
pub async fn create_test_transaction(
    db: &DatabaseConnection,
    kind: TransactionKind,
    amount: f64,
    category_id: Option<i64>,
    debt_id: Option<i64>,
    date: NaiveDate,
) -> Result<entities::transaction::Model> {
    transaction::create_transaction(
        db,
        TEST_OWNER,
        NewTransaction {
            amount,
            description: String::new(),
            kind,
            date: Some(date),
            category_id,
            debt_id,
        },
    )
    .await
}

/// Records an expense, optionally against a category.
pub async fn create_test_expense(
    db: &DatabaseConnection,
    amount: f64,
    category_id: Option<i64>,
    date: NaiveDate,
) -> Result<entities::transaction::Model> {
    create_test_transaction(db, TransactionKind::Expense, amount, category_id, None, date).await
}

/// Records a payment against a debt, reducing its balance.
pub async fn create_test_debt_payment(
    db: &DatabaseConnection,
    amount: f64,
    debt_id: i64,
    date: NaiveDate,
) -> Result<entities::transaction::Model> {
    create_test_transaction(
        db,
        TransactionKind::DebtPayment,
        amount,
        None,
        Some(debt_id),
        date,
    )
    .await
}
