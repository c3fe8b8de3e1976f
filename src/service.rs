//! Budget service - the operations the dashboard calls.
//!
//! Every operation takes the authenticated owner as `Option<&str>`; `None` means the
//! caller is not signed in. Writes return an [`OpResult`] instead of an error so the
//! caller can show the message directly. Store failures are logged and reported with
//! a generic message. Reads never fail: they fall back to zero-valued data.

use crate::{
    cache::DashboardCache,
    config::settings::DashboardConfig,
    core::{
        category::{self, CategoryInput},
        debt::{self, DebtInput},
        envelope::{self, EnvelopeStatus},
        monthly::{self, month_start},
        report::{DashboardData, generate_dashboard},
        savings::{self, SavingsGoalInput, SavingsGoalView},
        transaction::{self, NewTransaction, TransactionUpdate},
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Message returned for failures of the store itself
pub const GENERIC_FAILURE: &str = "Something went wrong, please try again";

/// Outcome of a write operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpResult {
    /// Whether the write was applied
    pub success: bool,
    /// Message to show the owner when it was not
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl OpResult {
    /// A successful write.
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    /// A failed write carrying the message for the owner.
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

fn require_owner(owner: Option<&str>) -> Result<&str> {
    owner
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or(Error::NotAuthenticated)
}

fn respond<T>(operation: &str, result: Result<T>) -> OpResult {
    match result {
        Ok(_) => OpResult::ok(),
        Err(e) if e.is_store_failure() => {
            error!("{} failed: {}", operation, e);
            OpResult::failure(GENERIC_FAILURE)
        }
        Err(e) => {
            warn!("{} rejected: {}", operation, e);
            OpResult::failure(e.to_string())
        }
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Shared state behind every dashboard operation.
pub struct BudgetService {
    /// Database connection for all ledger operations
    pub database: DatabaseConnection,
    settings: DashboardConfig,
    cache: Arc<RwLock<DashboardCache>>,
    clock: fn() -> NaiveDate,
}

impl BudgetService {
    /// Creates a service that reads the date from the UTC clock.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: DashboardConfig) -> Self {
        Self {
            database,
            settings,
            cache: Arc::new(RwLock::new(DashboardCache::new())),
            clock: utc_today,
        }
    }

    /// Replaces the source of "today" used for the current month and new entries.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDate) -> Self {
        self.clock = clock;
        self
    }

    /// The date the service treats as today.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        (self.clock)()
    }

    /// Handle to the dashboard cache shared with the UI layer.
    #[must_use]
    pub fn cache(&self) -> Arc<RwLock<DashboardCache>> {
        Arc::clone(&self.cache)
    }

    /// Reads the dashboard for `target_month`, or the current month when `None`.
    ///
    /// Viewing the current month creates its record if it does not exist yet.
    pub async fn get_dashboard_data(
        &self,
        owner: Option<&str>,
        target_month: Option<NaiveDate>,
    ) -> DashboardData {
        let (month, ensure_month) = target_month.map_or((self.today(), true), |m| (m, false));
        let Ok(owner) = require_owner(owner) else {
            return DashboardData::empty(month);
        };

        match generate_dashboard(
            &self.database,
            owner,
            month,
            ensure_month,
            self.settings.recent_transactions,
        )
        .await
        {
            Ok(data) => {
                self.cache.write().await.reconcile(owner, data.clone());
                data
            }
            Err(e) => {
                error!("Failed to load dashboard for owner {}: {}", owner, e);
                DashboardData::empty(month)
            }
        }
    }

    /// Re-reads the cached month from the store, dropping the view if that fails.
    async fn refresh(&self, owner: &str) {
        let cached_month = self.cache.read().await.get(owner).map(|view| view.month);
        let Some(month) = cached_month else {
            return;
        };
        match generate_dashboard(
            &self.database,
            owner,
            month,
            false,
            self.settings.recent_transactions,
        )
        .await
        {
            Ok(data) => self.cache.write().await.reconcile(owner, data),
            Err(e) => {
                warn!("Dropping cached dashboard for owner {}: {}", owner, e);
                self.cache.write().await.invalidate(owner);
            }
        }
    }

    async fn invalidate(&self, owner: &str) {
        self.cache.write().await.invalidate(owner);
    }

    /// Records a transaction, showing it in the cached dashboard right away and then
    /// replacing that view with what the store actually holds.
    ///
    /// A transaction without a date is dated today.
    pub async fn add_transaction(&self, owner: Option<&str>, mut new: NewTransaction) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            new.date.get_or_insert_with(|| self.today());
            self.cache
                .write()
                .await
                .apply_optimistic(owner, new.kind, new.amount, new.debt_id);
            let created = transaction::create_transaction(&self.database, owner, new).await;
            self.refresh(owner).await;
            created
        }
        .await;
        respond("add_transaction", result)
    }

    /// Edits a transaction, reconciling any debt it paid.
    pub async fn update_transaction(
        &self,
        owner: Option<&str>,
        transaction_id: i64,
        update: TransactionUpdate,
    ) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            transaction::update_transaction(&self.database, owner, transaction_id, update).await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("update_transaction", result)
    }

    /// Deletes a transaction, returning a debt payment to its debt.
    pub async fn delete_transaction(&self, owner: Option<&str>, transaction_id: i64) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            transaction::delete_transaction(&self.database, owner, transaction_id).await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("delete_transaction", result)
    }

    /// Closes the current month, carrying what is left into the next one.
    ///
    /// Only allowed on the month's final day.
    pub async fn close_month(&self, owner: Option<&str>) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            let closed = monthly::close_month_on(&self.database, owner, self.today()).await?;
            info!("{}", monthly::format_close_summary(&closed));
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("close_month", result)
    }

    /// Sets the current month's base income.
    pub async fn set_month_income(&self, owner: Option<&str>, income: f64) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            monthly::set_month_income(&self.database, owner, self.today(), income).await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("set_month_income", result)
    }

    /// Creates a category. `commitment_type` is `fixed`, `variable_fixed` or `None`.
    pub async fn add_category(
        &self,
        owner: Option<&str>,
        name: &str,
        commitment_type: Option<&str>,
        budget_limit: f64,
        is_pinned: bool,
    ) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            let input = CategoryInput::from_parts(name, commitment_type, budget_limit, is_pinned)?;
            category::create_category(&self.database, owner, input).await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("add_category", result)
    }

    /// Replaces a category's fields.
    pub async fn update_category(
        &self,
        owner: Option<&str>,
        category_id: i64,
        name: &str,
        commitment_type: Option<&str>,
        budget_limit: f64,
        is_pinned: bool,
    ) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            let input = CategoryInput::from_parts(name, commitment_type, budget_limit, is_pinned)?;
            category::update_category(&self.database, owner, category_id, input).await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("update_category", result)
    }

    /// Deletes a category, leaving its transactions uncategorized.
    pub async fn delete_category(&self, owner: Option<&str>, category_id: i64) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            category::delete_category(&self.database, owner, category_id).await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("delete_category", result)
    }

    /// Creates a debt.
    pub async fn add_debt(
        &self,
        owner: Option<&str>,
        name: &str,
        total_balance: f64,
        interest_rate: f64,
    ) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            let input = DebtInput::new(name, total_balance, interest_rate)?;
            debt::create_debt(&self.database, owner, input).await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("add_debt", result)
    }

    /// Replaces a debt's name, balance and interest rate.
    pub async fn update_debt(
        &self,
        owner: Option<&str>,
        debt_id: i64,
        name: &str,
        total_balance: f64,
        interest_rate: f64,
    ) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            let input = DebtInput::new(name, total_balance, interest_rate)?;
            debt::update_debt(&self.database, owner, debt_id, input).await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("update_debt", result)
    }

    /// Deletes a debt, keeping its payments as unlinked outflow.
    pub async fn delete_debt(&self, owner: Option<&str>, debt_id: i64) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            debt::delete_debt(&self.database, owner, debt_id).await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("delete_debt", result)
    }

    /// Creates a savings goal.
    pub async fn add_savings_goal(
        &self,
        owner: Option<&str>,
        name: &str,
        target_amount: f64,
        current_amount: f64,
        target_date: NaiveDate,
    ) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            let input = SavingsGoalInput::new(name, target_amount, current_amount, target_date)?;
            savings::create_savings_goal(&self.database, owner, input).await
        }
        .await;
        respond("add_savings_goal", result)
    }

    /// Replaces a savings goal's fields.
    pub async fn update_savings_goal(
        &self,
        owner: Option<&str>,
        goal_id: i64,
        name: &str,
        target_amount: f64,
        current_amount: f64,
        target_date: NaiveDate,
    ) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            let input = SavingsGoalInput::new(name, target_amount, current_amount, target_date)?;
            savings::update_savings_goal(&self.database, owner, goal_id, input).await
        }
        .await;
        respond("update_savings_goal", result)
    }

    /// Deletes a savings goal. Past contributions stay in the ledger.
    pub async fn delete_savings_goal(&self, owner: Option<&str>, goal_id: i64) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            savings::delete_savings_goal(&self.database, owner, goal_id).await
        }
        .await;
        respond("delete_savings_goal", result)
    }

    /// Moves money into a savings goal as an expense dated today.
    ///
    /// The expense is labelled with the goal's stored name; `goal_name` must name the
    /// same goal.
    pub async fn contribute_to_savings(
        &self,
        owner: Option<&str>,
        goal_id: i64,
        amount: f64,
        goal_name: &str,
    ) -> OpResult {
        let result = async {
            let owner = require_owner(owner)?;
            let today = self.today();
            savings::contribute_to_savings(&self.database, owner, goal_id, amount, goal_name, today)
                .await?;
            self.invalidate(owner).await;
            Ok::<_, Error>(())
        }
        .await;
        respond("contribute_to_savings", result)
    }

    /// Pinned envelopes for the current month. Empty when unavailable.
    pub async fn get_tracked_budgets(&self, owner: Option<&str>) -> Vec<EnvelopeStatus> {
        let Ok(owner) = require_owner(owner) else {
            return Vec::new();
        };
        envelope::get_tracked_budgets(&self.database, owner, month_start(self.today()))
            .await
            .unwrap_or_else(|e| {
                error!("Failed to load tracked budgets for owner {}: {}", owner, e);
                Vec::new()
            })
    }

    /// Savings goals with progress and a monthly suggestion. Empty when unavailable.
    pub async fn get_savings_goals(&self, owner: Option<&str>) -> Vec<SavingsGoalView> {
        let Ok(owner) = require_owner(owner) else {
            return Vec::new();
        };
        let today = self.today();
        match savings::get_savings_goals(&self.database, owner).await {
            Ok(goals) => goals
                .into_iter()
                .map(|goal| SavingsGoalView::new(goal, today))
                .collect(),
            Err(e) => {
                error!("Failed to load savings goals for owner {}: {}", owner, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::classify::TransactionKind;
    use crate::test_utils::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, DbErr, MockDatabase};

    const OWNER: Option<&str> = Some(TEST_OWNER);

    fn mid_month() -> NaiveDate {
        test_date(15)
    }

    async fn service() -> Result<BudgetService> {
        let service = BudgetService::new(setup_test_db().await?, DashboardConfig::default());
        Ok(service.with_clock(mid_month))
    }

    fn today_tx(kind: TransactionKind, amount: f64, debt_id: Option<i64>) -> NewTransaction {
        NewTransaction {
            amount,
            description: String::new(),
            kind,
            date: None,
            category_id: None,
            debt_id,
        }
    }

    #[test]
    fn test_op_result_serialization() {
        assert_eq!(
            serde_json::to_string(&OpResult::ok()).unwrap(),
            r#"{"success":true}"#
        );
        assert_eq!(
            serde_json::to_string(&OpResult::failure("Not authenticated")).unwrap(),
            r#"{"success":false,"error":"Not authenticated"}"#
        );
    }

    #[tokio::test]
    async fn test_unauthenticated_calls() -> Result<()> {
        let service = service().await?;

        let result = service
            .add_transaction(None, today_tx(TransactionKind::Expense, 5.0, None))
            .await;
        assert_eq!(result, OpResult::failure("Not authenticated"));
        assert!(!service.close_month(Some("  ")).await.success);
        assert!(!service.add_debt(None, "Card", 1.0, 0.0).await.success);

        let data = service.get_dashboard_data(None, None).await;
        assert_eq!(data, DashboardData::empty(mid_month()));
        assert!(service.get_tracked_budgets(None).await.is_empty());
        assert!(service.get_savings_goals(None).await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_debt_payment_through_service() -> Result<()> {
        let service = service().await?;
        assert!(service.set_month_income(OWNER, 2000.0).await.success);
        assert!(service.add_debt(OWNER, "Card", 1000.0, 19.9).await.success);

        let before = service.get_dashboard_data(OWNER, None).await;
        let debt_id = before.debts[0].id;

        let result = service
            .add_transaction(OWNER, today_tx(TransactionKind::DebtPayment, 300.0, Some(debt_id)))
            .await;
        assert_eq!(result, OpResult::ok());

        let after = service.get_dashboard_data(OWNER, None).await;
        assert_eq!(after.debts[0].balance, 700.0);
        assert_eq!(after.breakdown.spent_variable, 300.0);
        assert_eq!(after.breakdown.income, before.breakdown.income);
        assert_eq!(after.safe_to_spend, 1700.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_add_transaction_reconciles_cache() -> Result<()> {
        let service = service().await?;
        service.set_month_income(OWNER, 1000.0).await;
        service.get_dashboard_data(OWNER, None).await;

        service
            .add_transaction(OWNER, today_tx(TransactionKind::Expense, 25.0, None))
            .await;
        let cached = service.cache().read().await.get(TEST_OWNER).cloned().unwrap();
        assert_eq!(cached.safe_to_spend, 975.0);
        assert_eq!(cached.recent_transactions.len(), 1);

        // A rejected write leaves the authoritative view in place
        let result = service
            .add_transaction(OWNER, today_tx(TransactionKind::Expense, -5.0, None))
            .await;
        assert!(!result.success);
        let cached_after = service.cache().read().await.get(TEST_OWNER).cloned().unwrap();
        assert_eq!(cached_after, cached);

        Ok(())
    }

    #[tokio::test]
    async fn test_validation_messages() -> Result<()> {
        let service = service().await?;

        let result = service
            .add_transaction(OWNER, today_tx(TransactionKind::DebtPayment, 10.0, None))
            .await;
        assert_eq!(
            result.error.as_deref(),
            Some("A debt must be selected for a debt payment")
        );

        let result = service
            .add_category(OWNER, "Rent", Some("weekly"), 10.0, false)
            .await;
        assert_eq!(result.error.as_deref(), Some("Unknown commitment type: weekly"));

        let result = service.delete_transaction(OWNER, 99).await;
        assert_eq!(result.error.as_deref(), Some("Transaction not found: 99"));

        Ok(())
    }

    #[tokio::test]
    async fn test_dashboard_reads_are_idempotent() -> Result<()> {
        let service = service().await?;
        service.set_month_income(OWNER, 4000.0).await;
        service
            .add_category(OWNER, "Rent", Some("fixed"), 1500.0, false)
            .await;
        service
            .add_transaction(OWNER, today_tx(TransactionKind::Expense, 80.0, None))
            .await;

        let first = service.get_dashboard_data(OWNER, None).await;
        let second = service.get_dashboard_data(OWNER, None).await;
        assert_eq!(first, second);
        assert_eq!(first.safe_to_spend, 4000.0 - 1500.0 - 80.0);

        Ok(())
    }

    #[tokio::test]
    async fn test_past_month_without_record_reads_as_zero() -> Result<()> {
        let service = service().await?;
        let long_ago = month_start(service.today()) - Duration::days(400);

        let data = service.get_dashboard_data(OWNER, Some(long_ago)).await;
        assert_eq!(data, DashboardData::empty(long_ago));

        Ok(())
    }

    #[tokio::test]
    async fn test_close_month_without_record() -> Result<()> {
        let service = service().await?;
        let result = service.close_month(OWNER).await;
        assert!(!result.success);
        assert!(result.error.unwrap().starts_with("Month not found"));
        Ok(())
    }

    #[tokio::test]
    async fn test_savings_through_service() -> Result<()> {
        let service = service().await?;
        let target = month_start(service.today()) + Duration::days(200);
        assert!(
            service
                .add_savings_goal(OWNER, "Trip", 1000.0, 0.0, target)
                .await
                .success
        );
        let goal_id = service.get_savings_goals(OWNER).await[0].goal.id;

        let result = service.contribute_to_savings(OWNER, goal_id, 100.0, "Trip").await;
        assert_eq!(result, OpResult::ok());

        let goals = service.get_savings_goals(OWNER).await;
        assert_eq!(goals[0].goal.current_amount, 100.0);
        assert_eq!(goals[0].progress_percent, 10.0);

        let data = service.get_dashboard_data(OWNER, None).await;
        assert_eq!(data.spent, 100.0);
        assert_eq!(data.recent_transactions[0].description, "Savings: Trip");

        assert!(service.delete_savings_goal(OWNER, goal_id).await.success);
        assert!(service.get_savings_goals(OWNER).await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_store_failures_are_generic() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite)
            .append_exec_errors([DbErr::Custom("disk I/O error".to_string())])
            .append_query_errors([DbErr::Custom("disk I/O error".to_string())])
            .into_connection();
        let service = BudgetService::new(db, DashboardConfig::default()).with_clock(mid_month);

        let result = service.delete_savings_goal(OWNER, 1).await;
        assert_eq!(result, OpResult::failure(GENERIC_FAILURE));

        let long_ago = month_start(mid_month()) - Duration::days(400);
        let data = service.get_dashboard_data(OWNER, Some(long_ago)).await;
        assert_eq!(data, DashboardData::empty(long_ago));

        Ok(())
    }

    #[tokio::test]
    async fn test_clock_drives_current_month() -> Result<()> {
        let service = service().await?;
        service
            .add_transaction(OWNER, today_tx(TransactionKind::Expense, 12.0, None))
            .await;

        let data = service.get_dashboard_data(OWNER, None).await;
        assert_eq!(data.month, test_month_start());
        assert_eq!(data.recent_transactions[0].date, mid_month());

        // Not the last day yet
        let result = service.close_month(OWNER).await;
        assert!(result.error.unwrap().contains("still in progress"));

        let service = service.with_clock(test_last_day);
        assert_eq!(service.close_month(OWNER).await, OpResult::ok());

        Ok(())
    }
}
