//! Debt business logic.
//!
//! Debts are owner-scoped balances that debt payments draw down. Balance changes are
//! applied as relative SQL updates so they compose inside larger database transactions.

use crate::{
    core::validation::{finite_or_zero, validate_name, validate_non_negative},
    entities::{Debt, Transaction, debt, transaction},
    errors::{Error, Result},
};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Validated fields for creating or editing a debt.
#[derive(Debug, Clone, PartialEq)]
pub struct DebtInput {
    /// Trimmed display name
    pub name: String,
    /// Amount still owed
    pub total_balance: f64,
    /// Annual rate in percent, informational only
    pub interest_rate: f64,
}

impl DebtInput {
    /// Validates raw debt fields.
    ///
    /// # Errors
    /// Returns `InvalidName` for a blank or overlong name and `InvalidAmount` for a
    /// negative or non-finite balance or rate.
    pub fn new(name: &str, total_balance: f64, interest_rate: f64) -> Result<Self> {
        Ok(Self {
            name: validate_name(name)?,
            total_balance: validate_non_negative(total_balance)?,
            interest_rate: validate_non_negative(interest_rate)?,
        })
    }
}

/// Balance shown to the owner. Overpaid debts display as zero.
#[must_use]
pub fn display_balance(total_balance: f64) -> f64 {
    finite_or_zero(total_balance).max(0.0)
}

/// Lists an owner's debts by name.
pub async fn get_debts<C>(db: &C, owner_id: &str) -> Result<Vec<debt::Model>>
where
    C: ConnectionTrait,
{
    Debt::find()
        .filter(debt::Column::OwnerId.eq(owner_id))
        .order_by_asc(debt::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds one of an owner's debts by id.
pub async fn get_debt_by_id<C>(db: &C, owner_id: &str, debt_id: i64) -> Result<Option<debt::Model>>
where
    C: ConnectionTrait,
{
    Debt::find_by_id(debt_id)
        .filter(debt::Column::OwnerId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a debt for the owner.
pub async fn create_debt(
    db: &DatabaseConnection,
    owner_id: &str,
    input: DebtInput,
) -> Result<debt::Model> {
    let model = debt::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        name: Set(input.name),
        total_balance: Set(input.total_balance),
        interest_rate: Set(input.interest_rate),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!("Created debt '{}' for owner {}", created.name, owner_id);
    Ok(created)
}

/// Replaces a debt's name, balance and interest rate.
pub async fn update_debt(
    db: &DatabaseConnection,
    owner_id: &str,
    debt_id: i64,
    input: DebtInput,
) -> Result<debt::Model> {
    let existing = get_debt_by_id(db, owner_id, debt_id)
        .await?
        .ok_or(Error::DebtNotFound { id: debt_id })?;

    let mut active_model: debt::ActiveModel = existing.into();
    active_model.name = Set(input.name);
    active_model.total_balance = Set(input.total_balance);
    active_model.interest_rate = Set(input.interest_rate);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a debt. Its past payments stay in the ledger without a debt link.
pub async fn delete_debt(db: &DatabaseConnection, owner_id: &str, debt_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let existing = get_debt_by_id(&txn, owner_id, debt_id)
        .await?
        .ok_or(Error::DebtNotFound { id: debt_id })?;

    Transaction::update_many()
        .col_expr(transaction::Column::DebtId, Expr::value(Option::<i64>::None))
        .filter(transaction::Column::OwnerId.eq(owner_id))
        .filter(transaction::Column::DebtId.eq(debt_id))
        .exec(&txn)
        .await?;

    existing.delete(&txn).await?;
    txn.commit().await?;

    info!("Deleted debt {} for owner {}", debt_id, owner_id);
    Ok(())
}

/// Adds `delta` to a debt's balance (negative to pay it down).
///
/// The balance may go below zero; see [`display_balance`].
pub async fn adjust_debt_balance<C>(db: &C, owner_id: &str, debt_id: i64, delta: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    let result = Debt::update_many()
        .col_expr(
            debt::Column::TotalBalance,
            Expr::col(debt::Column::TotalBalance).add(delta),
        )
        .filter(debt::Column::Id.eq(debt_id))
        .filter(debt::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::DebtNotFound { id: debt_id });
    }
    Ok(())
}

/// Applies a debt payment: `total_balance = total_balance - amount`.
pub async fn record_payment<C>(db: &C, owner_id: &str, debt_id: i64, amount: f64) -> Result<()>
where
    C: ConnectionTrait,
{
    adjust_debt_balance(db, owner_id, debt_id, -amount).await
}
