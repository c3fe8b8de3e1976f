//! Month lifecycle business logic
//!
//! Handles the per-owner month records and the close-month transition.
//! A month starts `active` and becomes `closed` exactly once; closing computes the
//! month's net cash (income plus rollover minus every expense and debt payment) and
//! carries it into the following month's `rollover`. Marking the month closed and
//! opening its successor happen in one database transaction.

use crate::{
    core::{
        classify::TransactionKind,
        transaction::transactions_in_month,
        validation::{finite_or_zero, validate_non_negative},
    },
    entities::{Month, month, transaction},
    errors::{Error, Result},
};
use chrono::{Datelike, Duration, NaiveDate};
use sea_orm::{Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::{info, warn};

/// Lifecycle status of a month record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthStatus {
    /// Transactions are still being recorded
    Active,
    /// Closed and rolled over, terminal
    Closed,
}

impl MonthStatus {
    /// Storage representation used in the `status` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Closed => "closed",
        }
    }

    /// Reads a stored status. Anything other than `"closed"` counts as active.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        if value == Self::Closed.as_str() {
            Self::Closed
        } else {
            Self::Active
        }
    }
}

/// First day of the calendar month containing `date`.
#[must_use]
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

/// First day of the calendar month after the one containing `date`.
#[must_use]
pub fn next_month_start(date: NaiveDate) -> NaiveDate {
    // 32 days past the 1st always lands inside the next month
    month_start(month_start(date) + Duration::days(32))
}

/// Number of days in the calendar month containing `date`.
#[must_use]
pub fn days_in_month(date: NaiveDate) -> i64 {
    (next_month_start(date) - month_start(date)).num_days()
}

/// Last calendar day of the month containing `date`.
#[must_use]
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    next_month_start(date) - Duration::days(1)
}

/// Whether a month may be closed on `today`: only on its final day or later.
#[must_use]
pub fn can_close_on(today: NaiveDate) -> bool {
    i64::from(today.day()) >= days_in_month(today)
}

/// Sum of every expense and debt payment amount.
///
/// This is the strict cash-flow total used when closing a month, independent of
/// envelope reservations.
#[must_use]
pub fn total_outflow(transactions: &[transaction::Model]) -> f64 {
    transactions
        .iter()
        .filter(|tx| {
            tx.transaction_type
                .parse::<TransactionKind>()
                .is_ok_and(TransactionKind::is_outflow)
        })
        .map(|tx| finite_or_zero(tx.amount))
        .sum()
}

/// Sum of every income transaction amount.
#[must_use]
pub fn total_income_transactions(transactions: &[transaction::Model]) -> f64 {
    transactions
        .iter()
        .filter(|tx| tx.transaction_type == TransactionKind::Income.as_str())
        .map(|tx| finite_or_zero(tx.amount))
        .sum()
}

/// Represents the result of closing a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CloseMonthResult {
    /// First day of the month that was closed
    pub closed_month: NaiveDate,
    /// First day of the month that was opened with the rollover
    pub next_month: NaiveDate,
    /// Base income plus income transactions of the closed month
    pub income: f64,
    /// Rollover the closed month started with
    pub rollover: f64,
    /// Every expense and debt payment in the closed month
    pub total_spent: f64,
    /// Net cash carried into the next month, may be negative
    pub remaining: f64,
}

/// Finds an owner's month record for the calendar month starting on `start`.
pub async fn find_month<C>(db: &C, owner_id: &str, start: NaiveDate) -> Result<Option<month::Model>>
where
    C: ConnectionTrait,
{
    Month::find()
        .filter(month::Column::OwnerId.eq(owner_id))
        .filter(month::Column::Month.eq(month_start(start)))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Returns the owner's month record for `start`, creating an empty active one if missing.
///
/// New months begin with zero income and zero rollover; a non-zero rollover only
/// ever comes from closing the previous month.
pub async fn get_or_create_month<C>(
    db: &C,
    owner_id: &str,
    start: NaiveDate,
) -> Result<month::Model>
where
    C: ConnectionTrait,
{
    let start = month_start(start);
    if let Some(existing) = find_month(db, owner_id, start).await? {
        return Ok(existing);
    }

    let new_month = month::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        month: Set(start),
        income: Set(0.0),
        rollover: Set(0.0),
        status: Set(MonthStatus::Active.as_str().to_string()),
        ..Default::default()
    };
    let created = new_month.insert(db).await?;
    info!("Opened month {} for owner {}", start, owner_id);
    Ok(created)
}

/// Sets the base income of the owner's month containing `date`.
pub async fn set_month_income(
    db: &DatabaseConnection,
    owner_id: &str,
    date: NaiveDate,
    income: f64,
) -> Result<month::Model> {
    let income = validate_non_negative(income)?;
    let existing = get_or_create_month(db, owner_id, date).await?;

    let mut active_model: month::ActiveModel = existing.into();
    active_model.income = Set(income);
    active_model.update(db).await.map_err(Into::into)
}

/// Closes the calendar month containing `today`, as seen on `today`.
///
/// The carried amount is `(income + rollover) - total_spent`, where income is the
/// month's base income plus its income transactions and `total_spent` is every
/// expense and debt payment. Envelope reservations play no part here.
///
/// Fails without changing anything when the month has no record, is already
/// closed, or has not reached its final day yet.
pub async fn close_month_on(
    db: &DatabaseConnection,
    owner_id: &str,
    today: NaiveDate,
) -> Result<CloseMonthResult> {
    let start = month_start(today);
    let current = find_month(db, owner_id, start)
        .await?
        .ok_or(Error::MonthNotFound { month: start })?;

    if MonthStatus::from_stored(&current.status) == MonthStatus::Closed {
        return Err(Error::MonthAlreadyClosed { month: start });
    }

    if !can_close_on(today) {
        return Err(Error::MonthStillInProgress {
            month: start,
            closes_on: last_day_of_month(today),
        });
    }

    let txn = db.begin().await?;

    let transactions = transactions_in_month(&txn, owner_id, start).await?;
    let income = finite_or_zero(current.income) + total_income_transactions(&transactions);
    let rollover = finite_or_zero(current.rollover);
    let total_spent = total_outflow(&transactions);
    let remaining = (income + rollover) - total_spent;

    let mut closing: month::ActiveModel = current.into();
    closing.status = Set(MonthStatus::Closed.as_str().to_string());
    closing.update(&txn).await?;

    let next = next_month_start(start);
    if let Some(existing_next) = find_month(&txn, owner_id, next).await? {
        // Opened early by a forward-dated transaction; keep its income and entries
        warn!(
            "Month {} already existed for owner {}, setting its rollover",
            next, owner_id
        );
        let mut opening: month::ActiveModel = existing_next.into();
        opening.rollover = Set(remaining);
        opening.status = Set(MonthStatus::Active.as_str().to_string());
        opening.update(&txn).await?;
    } else {
        let opening = month::ActiveModel {
            owner_id: Set(owner_id.to_string()),
            month: Set(next),
            income: Set(0.0),
            rollover: Set(remaining),
            status: Set(MonthStatus::Active.as_str().to_string()),
            ..Default::default()
        };
        opening.insert(&txn).await?;
    }

    txn.commit().await?;

    info!(
        "Closed month {} for owner {}: remaining {:.2} rolled into {}",
        start, owner_id, remaining, next
    );

    Ok(CloseMonthResult {
        closed_month: start,
        next_month: next,
        income,
        rollover,
        total_spent,
        remaining,
    })
}

/// Formats a close-month result into a human-readable summary string.
#[must_use]
pub fn format_close_summary(result: &CloseMonthResult) -> String {
    format!(
        "Closed {} - Income: ${:.2} | Rollover in: ${:.2} | Spent: ${:.2}\n  \
         Carried into {}: ${:.2}",
        result.closed_month.format("%B %Y"),
        result.income,
        result.rollover,
        result.total_spent,
        result.next_month.format("%B %Y"),
        result.remaining
    )
}
