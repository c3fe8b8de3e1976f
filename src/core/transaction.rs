//! Transaction business logic - Handles all transaction-related operations.
//!
//! This module creates, edits, deletes and queries transactions. Every write is
//! validated first (positive finite amount, bounded description, a debt target for
//! debt payments) and then runs inside one database transaction together with its
//! side effects: opening the month the transaction falls in and moving the linked
//! debt's balance. Editing or deleting a debt payment puts the old amount back on the
//! debt before applying the new one, so debt balances always match their payments.

use crate::{
    core::{
        category::get_category_by_id,
        classify::TransactionKind,
        debt::{adjust_debt_balance, record_payment},
        monthly::{get_or_create_month, month_start, next_month_start},
        validation::{validate_amount, validate_description},
    },
    entities::{Transaction, transaction},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Input for recording a new transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    /// Positive amount; direction comes from `kind`
    pub amount: f64,
    /// Free text, at most 100 characters; blank uses a default per kind
    pub description: String,
    /// Income, expense or debt payment
    pub kind: TransactionKind,
    /// Day the transaction happened, today when `None`
    pub date: Option<NaiveDate>,
    /// Category, only kept for expenses
    pub category_id: Option<i64>,
    /// Debt being paid, required for debt payments and ignored otherwise
    pub debt_id: Option<i64>,
}

/// Replacement values for an existing transaction. The date is not editable.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionUpdate {
    /// Positive amount; direction comes from `kind`
    pub amount: f64,
    /// Free text, at most 100 characters; blank uses a default per kind
    pub description: String,
    /// Income, expense or debt payment
    pub kind: TransactionKind,
    /// Category, only kept for expenses
    pub category_id: Option<i64>,
    /// Debt being paid, required for debt payments and ignored otherwise
    pub debt_id: Option<i64>,
}

/// Validated transaction fields with targets normalised for the kind.
#[derive(Debug, Clone, PartialEq)]
struct ValidatedFields {
    amount: f64,
    description: String,
    kind: TransactionKind,
    category_id: Option<i64>,
    debt_id: Option<i64>,
}

fn validate_fields(
    amount: f64,
    description: &str,
    kind: TransactionKind,
    category_id: Option<i64>,
    debt_id: Option<i64>,
) -> Result<ValidatedFields> {
    let amount = validate_amount(amount)?;
    let description = validate_description(description)?;
    let description = if description.is_empty() {
        kind.default_description().to_string()
    } else {
        description
    };

    let (category_id, debt_id) = match kind {
        TransactionKind::Income => (None, None),
        TransactionKind::Expense => (category_id, None),
        TransactionKind::DebtPayment => (None, Some(debt_id.ok_or(Error::MissingDebtTarget)?)),
    };

    Ok(ValidatedFields {
        amount,
        description,
        kind,
        category_id,
        debt_id,
    })
}

/// Checks the category exists and applies the debt payment, inside `db`'s transaction.
async fn apply_targets<C>(db: &C, owner_id: &str, fields: &ValidatedFields) -> Result<()>
where
    C: ConnectionTrait,
{
    if let Some(category_id) = fields.category_id {
        get_category_by_id(db, owner_id, category_id)
            .await?
            .ok_or(Error::CategoryNotFound { id: category_id })?;
    }
    if let Some(debt_id) = fields.debt_id {
        record_payment(db, owner_id, debt_id, fields.amount).await?;
    }
    Ok(())
}

/// Reverses the effect a stored transaction had on its debt, if any.
async fn revert_targets<C>(db: &C, owner_id: &str, existing: &transaction::Model) -> Result<()>
where
    C: ConnectionTrait,
{
    if existing.transaction_type == TransactionKind::DebtPayment.as_str() {
        if let Some(debt_id) = existing.debt_id {
            adjust_debt_balance(db, owner_id, debt_id, existing.amount).await?;
        }
    }
    Ok(())
}

/// Inserts a validated transaction and applies its side effects on `db`.
///
/// Callers own the surrounding database transaction.
async fn insert_validated<C>(
    db: &C,
    owner_id: &str,
    fields: ValidatedFields,
    date: NaiveDate,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    apply_targets(db, owner_id, &fields).await?;
    let month = get_or_create_month(db, owner_id, date).await?;

    let transaction_model = transaction::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        month_id: Set(month.id),
        amount: Set(fields.amount),
        description: Set(fields.description),
        transaction_type: Set(fields.kind.as_str().to_string()),
        date: Set(date),
        category_id: Set(fields.category_id),
        debt_id: Set(fields.debt_id),
        created_at: Set(Utc::now()),
        ..Default::default()
    };

    transaction_model.insert(db).await.map_err(Into::into)
}

/// Records an expense on an already open database transaction.
///
/// Used by savings contributions so the expense and the goal update commit together.
pub(crate) async fn insert_expense<C>(
    db: &C,
    owner_id: &str,
    amount: f64,
    description: &str,
    date: NaiveDate,
) -> Result<transaction::Model>
where
    C: ConnectionTrait,
{
    let fields = validate_fields(amount, description, TransactionKind::Expense, None, None)?;
    insert_validated(db, owner_id, fields, date).await
}

/// Creates a new transaction and applies its effect on the linked debt.
///
/// The month record for the transaction's date is created if it does not exist.
/// Nothing is written when validation fails or the category or debt is unknown.
pub async fn create_transaction(
    db: &DatabaseConnection,
    owner_id: &str,
    new: NewTransaction,
) -> Result<transaction::Model> {
    let fields = validate_fields(
        new.amount,
        &new.description,
        new.kind,
        new.category_id,
        new.debt_id,
    )?;
    let date = new.date.unwrap_or_else(|| Utc::now().date_naive());

    let txn = db.begin().await?;
    let created = insert_validated(&txn, owner_id, fields, date).await?;
    txn.commit().await?;

    info!(
        "Recorded {} of {:.2} for owner {} on {}",
        created.transaction_type, created.amount, owner_id, created.date
    );
    Ok(created)
}

/// Finds one of an owner's transactions by id.
pub async fn get_transaction_by_id<C>(
    db: &C,
    owner_id: &str,
    transaction_id: i64,
) -> Result<Option<transaction::Model>>
where
    C: ConnectionTrait,
{
    Transaction::find_by_id(transaction_id)
        .filter(transaction::Column::OwnerId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Replaces amount, description, type, category and debt of a transaction.
///
/// A debt payment's old amount is returned to its debt before the new values are
/// applied, all inside one database transaction.
pub async fn update_transaction(
    db: &DatabaseConnection,
    owner_id: &str,
    transaction_id: i64,
    update: TransactionUpdate,
) -> Result<transaction::Model> {
    let fields = validate_fields(
        update.amount,
        &update.description,
        update.kind,
        update.category_id,
        update.debt_id,
    )?;

    let txn = db.begin().await?;

    let existing = get_transaction_by_id(&txn, owner_id, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    revert_targets(&txn, owner_id, &existing).await?;
    apply_targets(&txn, owner_id, &fields).await?;

    let mut active_model: transaction::ActiveModel = existing.into();
    active_model.amount = Set(fields.amount);
    active_model.description = Set(fields.description);
    active_model.transaction_type = Set(fields.kind.as_str().to_string());
    active_model.category_id = Set(fields.category_id);
    active_model.debt_id = Set(fields.debt_id);
    let updated = active_model.update(&txn).await?;

    txn.commit().await?;

    info!("Updated transaction {} for owner {}", transaction_id, owner_id);
    Ok(updated)
}

/// Deletes a transaction, returning a debt payment's amount to its debt.
pub async fn delete_transaction(
    db: &DatabaseConnection,
    owner_id: &str,
    transaction_id: i64,
) -> Result<()> {
    let txn = db.begin().await?;

    let existing = get_transaction_by_id(&txn, owner_id, transaction_id)
        .await?
        .ok_or(Error::TransactionNotFound { id: transaction_id })?;

    revert_targets(&txn, owner_id, &existing).await?;
    existing.delete(&txn).await?;

    txn.commit().await?;

    info!("Deleted transaction {} for owner {}", transaction_id, owner_id);
    Ok(())
}

/// Retrieves an owner's transactions dated within the calendar month of `start`,
/// newest first by `(date, created_at, id)`.
///
/// The range includes the month's first day and excludes the next month's first day.
pub async fn transactions_in_month<C>(
    db: &C,
    owner_id: &str,
    start: NaiveDate,
) -> Result<Vec<transaction::Model>>
where
    C: ConnectionTrait,
{
    let start = month_start(start);
    Transaction::find()
        .filter(transaction::Column::OwnerId.eq(owner_id))
        .filter(transaction::Column::Date.gte(start))
        .filter(transaction::Column::Date.lt(next_month_start(start)))
        .order_by_desc(transaction::Column::Date)
        .order_by_desc(transaction::Column::CreatedAt)
        .order_by_desc(transaction::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}
