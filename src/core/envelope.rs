//! Envelope tracking for pinned budget categories.
//!
//! Reports how much of each pinned category's monthly budget has been used.
//! Health is `over` once spending passes the limit and `warning` past
//! [`WARNING_THRESHOLD_PERCENT`].

use crate::{
    core::{
        category::{Commitment, get_categories},
        classify::TransactionKind,
        monthly::find_month,
        transaction::transactions_in_month,
        validation::finite_or_zero,
    },
    entities::{category, transaction},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::ConnectionTrait;
use serde::Serialize;

/// Usage above this percentage is flagged as a warning.
pub const WARNING_THRESHOLD_PERCENT: f64 = 85.0;

/// Traffic-light state of an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeHealth {
    /// Comfortably within the limit
    Ok,
    /// More than the warning threshold used
    Warning,
    /// Spending exceeds the limit
    Over,
}

/// Budget usage of one pinned category for a month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeStatus {
    /// Category being tracked
    pub category_id: i64,
    /// Category name
    pub name: String,
    /// Monthly budget for the category
    pub limit: f64,
    /// Expenses recorded against the category this month
    pub spent: f64,
    /// `limit - spent`, negative when over budget
    pub remaining: f64,
    /// Share of the limit used, capped at 100
    pub percent: f64,
    /// Health derived from `remaining` and `percent`
    pub status: EnvelopeHealth,
}

/// Percentage of `limit` used by `spent`, capped at 100.
///
/// A zero limit counts as fully used.
#[must_use]
pub fn usage_percent(spent: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 100.0;
    }
    (spent / limit * 100.0).min(100.0)
}

/// Builds the status line for one envelope.
#[must_use]
pub fn envelope_status(category_id: i64, name: &str, limit: f64, spent: f64) -> EnvelopeStatus {
    let remaining = limit - spent;
    let percent = usage_percent(spent, limit);
    let status = if remaining < 0.0 {
        EnvelopeHealth::Over
    } else if percent > WARNING_THRESHOLD_PERCENT {
        EnvelopeHealth::Warning
    } else {
        EnvelopeHealth::Ok
    };

    EnvelopeStatus {
        category_id,
        name: name.to_string(),
        limit,
        spent,
        remaining,
        percent,
        status,
    }
}

/// Status of every pinned category.
///
/// `transactions` are the month's transactions, or `None` when the month has no
/// record yet; then every envelope is reported untouched.
#[must_use]
pub fn tracked_budgets(
    categories: &[category::Model],
    transactions: Option<&[transaction::Model]>,
) -> Vec<EnvelopeStatus> {
    categories
        .iter()
        .filter_map(|category| {
            let commitment = Commitment::from_model(category);
            commitment.is_pinned().then(|| (category, commitment.limit()))
        })
        .map(|(category, limit)| match transactions {
            None => EnvelopeStatus {
                category_id: category.id,
                name: category.name.clone(),
                limit,
                spent: 0.0,
                remaining: limit,
                percent: 0.0,
                status: EnvelopeHealth::Ok,
            },
            Some(transactions) => {
                let spent = transactions
                    .iter()
                    .filter(|tx| {
                        tx.category_id == Some(category.id)
                            && tx.transaction_type == TransactionKind::Expense.as_str()
                    })
                    .map(|tx| finite_or_zero(tx.amount))
                    .sum();
                envelope_status(category.id, &category.name, limit, spent)
            }
        })
        .collect()
}

/// Loads the pinned envelopes of an owner for the month starting at `start`.
pub async fn get_tracked_budgets<C>(
    db: &C,
    owner_id: &str,
    start: NaiveDate,
) -> Result<Vec<EnvelopeStatus>>
where
    C: ConnectionTrait,
{
    let categories = get_categories(db, owner_id).await?;
    if find_month(db, owner_id, start).await?.is_none() {
        return Ok(tracked_budgets(&categories, None));
    }
    let transactions = transactions_in_month(db, owner_id, start).await?;
    Ok(tracked_budgets(&categories, Some(&transactions)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;

    fn pinned(limit: f64) -> Commitment {
        Commitment::VariableFixed {
            limit,
            pinned: true,
        }
    }

    #[test]
    fn test_usage_percent() {
        assert_eq!(usage_percent(50.0, 200.0), 25.0);
        assert_eq!(usage_percent(200.0, 200.0), 100.0);
        assert_eq!(usage_percent(500.0, 200.0), 100.0);
        assert_eq!(usage_percent(0.0, 0.0), 100.0);
    }

    #[test]
    fn test_envelope_health_thresholds() {
        assert_eq!(envelope_status(1, "Food", 100.0, 50.0).status, EnvelopeHealth::Ok);
        assert_eq!(envelope_status(1, "Food", 100.0, 85.0).status, EnvelopeHealth::Ok);
        assert_eq!(
            envelope_status(1, "Food", 100.0, 86.0).status,
            EnvelopeHealth::Warning
        );
        assert_eq!(
            envelope_status(1, "Food", 100.0, 100.0).status,
            EnvelopeHealth::Warning
        );

        let over = envelope_status(1, "Food", 100.0, 130.0);
        assert_eq!(over.status, EnvelopeHealth::Over);
        assert_eq!(over.remaining, -30.0);
        assert_eq!(over.percent, 100.0);
    }

    #[test]
    fn test_zero_limit() {
        let untouched = envelope_status(1, "Gifts", 0.0, 0.0);
        assert_eq!(untouched.percent, 100.0);
        assert_eq!(untouched.status, EnvelopeHealth::Warning);

        let spent = envelope_status(1, "Gifts", 0.0, 5.0);
        assert_eq!(spent.status, EnvelopeHealth::Over);
    }

    #[tokio::test]
    async fn test_tracked_budgets_only_pinned() -> Result<()> {
        let db = setup_test_db().await?;
        let groceries = create_test_category(&db, "Groceries", pinned(600.0)).await?;
        let utilities = create_test_category(
            &db,
            "Utilities",
            Commitment::VariableFixed {
                limit: 200.0,
                pinned: false,
            },
        )
        .await?;
        create_test_category(&db, "Rent", Commitment::Fixed { limit: 1500.0 }).await?;
        create_test_category(&db, "Fun", Commitment::Standard).await?;

        create_test_expense(&db, 540.0, Some(groceries.id), test_date(4)).await?;
        create_test_expense(&db, 120.0, Some(utilities.id), test_date(4)).await?;

        let budgets = get_tracked_budgets(&db, TEST_OWNER, test_month_start()).await?;
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].name, "Groceries");
        assert_eq!(budgets[0].spent, 540.0);
        assert_eq!(budgets[0].remaining, 60.0);
        assert_eq!(budgets[0].percent, 90.0);
        assert_eq!(budgets[0].status, EnvelopeHealth::Warning);

        Ok(())
    }

    #[tokio::test]
    async fn test_tracked_budgets_without_month_record() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_category(&db, "Groceries", pinned(600.0)).await?;

        let budgets = get_tracked_budgets(&db, TEST_OWNER, test_month_start()).await?;
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].spent, 0.0);
        assert_eq!(budgets[0].remaining, 600.0);
        assert_eq!(budgets[0].percent, 0.0);
        assert_eq!(budgets[0].status, EnvelopeHealth::Ok);

        Ok(())
    }

    #[tokio::test]
    async fn test_tracked_budgets_ignore_other_months() -> Result<()> {
        let db = setup_test_db().await?;
        let groceries = create_test_category(&db, "Groceries", pinned(100.0)).await?;
        create_test_expense(&db, 30.0, Some(groceries.id), test_date(2)).await?;
        create_test_expense(
            &db,
            500.0,
            Some(groceries.id),
            test_last_day() + chrono::Duration::days(1),
        )
        .await?;

        let budgets = get_tracked_budgets(&db, TEST_OWNER, test_month_start()).await?;
        assert_eq!(budgets[0].spent, 30.0);
        assert_eq!(budgets[0].status, EnvelopeHealth::Ok);

        Ok(())
    }
}
