//! Savings goals and contributions.
//!
//! A contribution is real spending: it is recorded as an expense described
//! `Savings: <goal name>` in the month it happens, and the goal's `current_amount`
//! grows by the same amount. Both writes commit in one database transaction.

use crate::{
    core::{
        transaction::insert_expense,
        validation::{validate_amount, validate_name, validate_non_negative},
    },
    entities::{SavingsGoal, savings_goal, transaction},
    errors::{Error, Result},
};
use chrono::{Datelike, NaiveDate};
use sea_orm::sea_query::Expr;
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Serialize;
use tracing::info;

/// Validated fields for creating or editing a savings goal.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsGoalInput {
    /// Trimmed goal name
    pub name: String,
    /// Amount to reach
    pub target_amount: f64,
    /// Amount already saved
    pub current_amount: f64,
    /// Day the goal should be reached by
    pub target_date: NaiveDate,
}

impl SavingsGoalInput {
    /// Validates raw goal fields.
    ///
    /// # Errors
    /// Returns `InvalidName` for a bad name and `InvalidAmount` for a negative or
    /// non-finite amount.
    pub fn new(
        name: &str,
        target_amount: f64,
        current_amount: f64,
        target_date: NaiveDate,
    ) -> Result<Self> {
        Ok(Self {
            name: validate_name(name)?,
            target_amount: validate_non_negative(target_amount)?,
            current_amount: validate_non_negative(current_amount)?,
            target_date,
        })
    }
}

/// What the owner should do next for a goal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", content = "amount", rename_all = "snake_case")]
pub enum SavingsSuggestion {
    /// Nothing left to save
    GoalReached,
    /// The target month has arrived with money still missing
    DueNow,
    /// Amount to put aside each month until the target date
    MonthlyAmount(f64),
}

/// A goal together with its progress, as shown to the owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsGoalView {
    /// Stored goal
    pub goal: savings_goal::Model,
    /// See [`progress_percent`]
    pub progress_percent: f64,
    /// See [`savings_suggestion`]
    pub suggestion: SavingsSuggestion,
}

impl SavingsGoalView {
    /// Builds the view of `goal` as seen on `today`.
    #[must_use]
    pub fn new(goal: savings_goal::Model, today: NaiveDate) -> Self {
        Self {
            progress_percent: progress_percent(&goal),
            suggestion: savings_suggestion(&goal, today),
            goal,
        }
    }
}

/// Whole calendar months from `today` to `target`, negative when `target` is past.
// Cast safety: month0() is in [0, 11].
#[allow(clippy::cast_possible_wrap)]
#[must_use]
pub fn months_until(today: NaiveDate, target: NaiveDate) -> i32 {
    (target.year() - today.year()) * 12 + (target.month0() as i32 - today.month0() as i32)
}

/// Share of the target already saved, clamped to `[0, 100]`.
#[must_use]
pub fn progress_percent(goal: &savings_goal::Model) -> f64 {
    if goal.target_amount <= 0.0 {
        return 100.0;
    }
    (goal.current_amount / goal.target_amount * 100.0).clamp(0.0, 100.0)
}

/// Suggests how much to set aside each month to reach the goal on time.
#[must_use]
pub fn savings_suggestion(goal: &savings_goal::Model, today: NaiveDate) -> SavingsSuggestion {
    let remaining = goal.target_amount - goal.current_amount;
    if remaining <= 0.0 {
        return SavingsSuggestion::GoalReached;
    }
    let months = months_until(today, goal.target_date);
    if months <= 0 {
        return SavingsSuggestion::DueNow;
    }
    SavingsSuggestion::MonthlyAmount(remaining / f64::from(months))
}

/// Lists an owner's goals, soonest target first.
pub async fn get_savings_goals<C>(db: &C, owner_id: &str) -> Result<Vec<savings_goal::Model>>
where
    C: ConnectionTrait,
{
    SavingsGoal::find()
        .filter(savings_goal::Column::OwnerId.eq(owner_id))
        .order_by_asc(savings_goal::Column::TargetDate)
        .order_by_asc(savings_goal::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds one of an owner's goals by id.
pub async fn get_savings_goal_by_id<C>(
    db: &C,
    owner_id: &str,
    goal_id: i64,
) -> Result<Option<savings_goal::Model>>
where
    C: ConnectionTrait,
{
    SavingsGoal::find_by_id(goal_id)
        .filter(savings_goal::Column::OwnerId.eq(owner_id))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a savings goal for the owner.
pub async fn create_savings_goal(
    db: &DatabaseConnection,
    owner_id: &str,
    input: SavingsGoalInput,
) -> Result<savings_goal::Model> {
    let model = savings_goal::ActiveModel {
        owner_id: Set(owner_id.to_string()),
        name: Set(input.name),
        target_amount: Set(input.target_amount),
        current_amount: Set(input.current_amount),
        target_date: Set(input.target_date),
        ..Default::default()
    };
    let created = model.insert(db).await?;
    info!("Created savings goal '{}' for owner {}", created.name, owner_id);
    Ok(created)
}

/// Replaces a goal's name, amounts and target date.
pub async fn update_savings_goal(
    db: &DatabaseConnection,
    owner_id: &str,
    goal_id: i64,
    input: SavingsGoalInput,
) -> Result<savings_goal::Model> {
    let existing = get_savings_goal_by_id(db, owner_id, goal_id)
        .await?
        .ok_or(Error::SavingsGoalNotFound { id: goal_id })?;

    let mut active_model: savings_goal::ActiveModel = existing.into();
    active_model.name = Set(input.name);
    active_model.target_amount = Set(input.target_amount);
    active_model.current_amount = Set(input.current_amount);
    active_model.target_date = Set(input.target_date);
    active_model.update(db).await.map_err(Into::into)
}

/// Deletes a goal. Past contribution expenses stay in the ledger.
pub async fn delete_savings_goal(
    db: &DatabaseConnection,
    owner_id: &str,
    goal_id: i64,
) -> Result<()> {
    let result = SavingsGoal::delete_many()
        .filter(savings_goal::Column::Id.eq(goal_id))
        .filter(savings_goal::Column::OwnerId.eq(owner_id))
        .exec(db)
        .await?;

    if result.rows_affected == 0 {
        return Err(Error::SavingsGoalNotFound { id: goal_id });
    }
    info!("Deleted savings goal {} for owner {}", goal_id, owner_id);
    Ok(())
}

/// Moves `amount` into a goal on `date`.
///
/// Records the expense and increments the goal's `current_amount` in one database
/// transaction. The expense is always labelled with the stored goal name; a non-blank
/// `goal_name` that does not match it is rejected with `InvalidName`.
pub async fn contribute_to_savings(
    db: &DatabaseConnection,
    owner_id: &str,
    goal_id: i64,
    amount: f64,
    goal_name: &str,
    date: NaiveDate,
) -> Result<transaction::Model> {
    let amount = validate_amount(amount)?;

    let txn = db.begin().await?;

    let goal = get_savings_goal_by_id(&txn, owner_id, goal_id)
        .await?
        .ok_or(Error::SavingsGoalNotFound { id: goal_id })?;
    let requested = goal_name.trim();
    if !requested.is_empty() && !requested.eq_ignore_ascii_case(&goal.name) {
        return Err(Error::InvalidName {
            reason: format!("savings goal {goal_id} is not named '{requested}'"),
        });
    }

    let description = format!("Savings: {}", goal.name);
    let expense = insert_expense(&txn, owner_id, amount, &description, date).await?;

    SavingsGoal::update_many()
        .col_expr(
            savings_goal::Column::CurrentAmount,
            Expr::col(savings_goal::Column::CurrentAmount).add(amount),
        )
        .filter(savings_goal::Column::Id.eq(goal_id))
        .filter(savings_goal::Column::OwnerId.eq(owner_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    info!(
        "Contributed {:.2} to savings goal {} for owner {}",
        amount, goal_id, owner_id
    );
    Ok(expense)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::transaction::transactions_in_month;
    use crate::test_utils::*;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn goal(target: f64, current: f64, target_date: NaiveDate) -> savings_goal::Model {
        savings_goal::Model {
            id: 1,
            owner_id: TEST_OWNER.to_string(),
            name: "Trip".to_string(),
            target_amount: target,
            current_amount: current,
            target_date,
        }
    }

    #[test]
    fn test_months_until() {
        assert_eq!(months_until(date(2025, 3, 15), date(2025, 9, 1)), 6);
        assert_eq!(months_until(date(2025, 11, 30), date(2026, 2, 1)), 3);
        assert_eq!(months_until(date(2025, 3, 1), date(2025, 3, 31)), 0);
        assert_eq!(months_until(date(2025, 3, 1), date(2024, 12, 1)), -3);
    }

    #[test]
    fn test_savings_suggestion() {
        let today = date(2025, 3, 10);

        assert_eq!(
            savings_suggestion(&goal(1200.0, 600.0, date(2025, 9, 1)), today),
            SavingsSuggestion::MonthlyAmount(100.0)
        );
        assert_eq!(
            savings_suggestion(&goal(1000.0, 1000.0, date(2025, 9, 1)), today),
            SavingsSuggestion::GoalReached
        );
        assert_eq!(
            savings_suggestion(&goal(1000.0, 1200.0, date(2024, 1, 1)), today),
            SavingsSuggestion::GoalReached
        );
        assert_eq!(
            savings_suggestion(&goal(1000.0, 10.0, date(2025, 3, 28)), today),
            SavingsSuggestion::DueNow
        );
    }

    #[test]
    fn test_progress_percent_is_clamped() {
        let target = date(2025, 9, 1);
        assert_eq!(progress_percent(&goal(1000.0, 250.0, target)), 25.0);
        assert_eq!(progress_percent(&goal(1000.0, 1500.0, target)), 100.0);
        assert_eq!(progress_percent(&goal(0.0, 0.0, target)), 100.0);
    }

    #[test]
    fn test_goal_input_validation() {
        let target = date(2025, 9, 1);
        assert!(matches!(
            SavingsGoalInput::new(" ", 100.0, 0.0, target),
            Err(Error::InvalidName { reason: _ })
        ));
        assert!(matches!(
            SavingsGoalInput::new("Trip", -100.0, 0.0, target),
            Err(Error::InvalidAmount { amount: _ })
        ));
    }

    #[tokio::test]
    async fn test_goal_crud() -> Result<()> {
        let db = setup_test_db().await?;
        let target = date(2025, 12, 1);

        let created = create_savings_goal(
            &db,
            TEST_OWNER,
            SavingsGoalInput::new("Emergency Fund", 3000.0, 0.0, target)?,
        )
        .await?;
        let updated = update_savings_goal(
            &db,
            TEST_OWNER,
            created.id,
            SavingsGoalInput::new("Rainy Day", 4000.0, 500.0, target)?,
        )
        .await?;
        assert_eq!(updated.name, "Rainy Day");
        assert_eq!(updated.current_amount, 500.0);

        assert!(get_savings_goals(&db, "someone-else").await?.is_empty());

        delete_savings_goal(&db, TEST_OWNER, created.id).await?;
        assert!(get_savings_goals(&db, TEST_OWNER).await?.is_empty());

        let again = delete_savings_goal(&db, TEST_OWNER, created.id).await;
        assert!(matches!(again, Err(Error::SavingsGoalNotFound { id: _ })));

        Ok(())
    }

    #[tokio::test]
    async fn test_contribution_records_expense_and_grows_goal() -> Result<()> {
        let db = setup_test_db().await?;
        let goal = create_savings_goal(
            &db,
            TEST_OWNER,
            SavingsGoalInput::new("Vacation", 2000.0, 100.0, date(2025, 8, 1))?,
        )
        .await?;

        let expense =
            contribute_to_savings(&db, TEST_OWNER, goal.id, 250.0, "Vacation", test_date(12))
                .await?;
        assert_eq!(expense.description, "Savings: Vacation");
        assert_eq!(expense.transaction_type, "expense");
        assert_eq!(expense.amount, 250.0);

        let goal = get_savings_goal_by_id(&db, TEST_OWNER, goal.id).await?.unwrap();
        assert_eq!(goal.current_amount, 350.0);

        let in_month = transactions_in_month(&db, TEST_OWNER, test_month_start()).await?;
        assert_eq!(in_month.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_failed_contribution_writes_nothing() -> Result<()> {
        let db = setup_test_db().await?;

        let result = contribute_to_savings(&db, TEST_OWNER, 77, 50.0, "Ghost", test_date(1)).await;
        assert!(matches!(result, Err(Error::SavingsGoalNotFound { id: 77 })));

        let goal = create_savings_goal(
            &db,
            TEST_OWNER,
            SavingsGoalInput::new("Bike", 500.0, 0.0, date(2025, 8, 1))?,
        )
        .await?;
        let result = contribute_to_savings(&db, TEST_OWNER, goal.id, 0.0, "", test_date(1)).await;
        assert!(matches!(result, Err(Error::InvalidAmount { amount: _ })));

        assert!(transactions_in_month(&db, TEST_OWNER, test_month_start()).await?.is_empty());
        let goal = get_savings_goal_by_id(&db, TEST_OWNER, goal.id).await?.unwrap();
        assert_eq!(goal.current_amount, 0.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_blank_goal_name_uses_stored_name() -> Result<()> {
        let db = setup_test_db().await?;
        let goal = create_savings_goal(
            &db,
            TEST_OWNER,
            SavingsGoalInput::new("Laptop", 1500.0, 0.0, date(2025, 10, 1))?,
        )
        .await?;

        let expense =
            contribute_to_savings(&db, TEST_OWNER, goal.id, 20.0, "  ", test_date(2)).await?;
        assert_eq!(expense.description, "Savings: Laptop");

        let expense =
            contribute_to_savings(&db, TEST_OWNER, goal.id, 20.0, "laptop", test_date(3)).await?;
        assert_eq!(expense.description, "Savings: Laptop");

        Ok(())
    }

    #[tokio::test]
    async fn test_contribution_rejects_other_goal_name() -> Result<()> {
        let db = setup_test_db().await?;
        let goal = create_savings_goal(
            &db,
            TEST_OWNER,
            SavingsGoalInput::new("Trip", 1000.0, 0.0, date(2025, 10, 1))?,
        )
        .await?;

        let result =
            contribute_to_savings(&db, TEST_OWNER, goal.id, 50.0, "Some Other Goal", test_date(4))
                .await;
        assert!(matches!(result, Err(Error::InvalidName { reason: _ })));

        let long_name = "x".repeat(95);
        let result =
            contribute_to_savings(&db, TEST_OWNER, goal.id, 50.0, &long_name, test_date(4)).await;
        assert!(matches!(result, Err(Error::InvalidName { reason: _ })));

        assert!(transactions_in_month(&db, TEST_OWNER, test_month_start()).await?.is_empty());
        let goal = get_savings_goal_by_id(&db, TEST_OWNER, goal.id).await?.unwrap();
        assert_eq!(goal.current_amount, 0.0);

        Ok(())
    }
}
