//! Client-side dashboard cache.
//!
//! Holds the last dashboard read from the store for each owner. A write can be shown
//! immediately with [`DashboardCache::apply_optimistic`], but the store stays the
//! source of truth: [`DashboardCache::reconcile`] always replaces the cached view with
//! the authoritative one.

use crate::core::{classify::TransactionKind, report::DashboardData};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Last known dashboard per owner.
#[derive(Debug, Default)]
pub struct DashboardCache {
    views: HashMap<String, DashboardData>,
}

impl DashboardCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached view for an owner, if any.
    #[must_use]
    pub fn get(&self, owner_id: &str) -> Option<&DashboardData> {
        self.views.get(owner_id)
    }

    /// Stores the authoritative dashboard, discarding any optimistic changes.
    pub fn reconcile(&mut self, owner_id: &str, server: DashboardData) {
        trace!("Reconciled dashboard cache for owner {}", owner_id);
        self.views.insert(owner_id.to_string(), server);
    }

    /// Applies a transaction to the cached view before the store confirms it.
    ///
    /// Expenses and debt payments lower Safe-to-Spend and raise spent; a debt payment
    /// also lowers the debt's shown balance, never below zero. Income raises
    /// Safe-to-Spend. Returns the updated view, or `None` when nothing is cached.
    pub fn apply_optimistic(
        &mut self,
        owner_id: &str,
        kind: TransactionKind,
        amount: f64,
        debt_id: Option<i64>,
    ) -> Option<&DashboardData> {
        let view = self.views.get_mut(owner_id)?;
        match kind {
            TransactionKind::Income => view.safe_to_spend += amount,
            TransactionKind::Expense | TransactionKind::DebtPayment => {
                view.safe_to_spend -= amount;
                view.spent += amount;
            }
        }
        if kind == TransactionKind::DebtPayment {
            if let Some(debt) = debt_id.and_then(|id| view.debts.iter_mut().find(|d| d.id == id)) {
                debt.balance = (debt.balance - amount).max(0.0);
            }
        }
        debug!("Applied optimistic {} of {:.2} for owner {}", kind, amount, owner_id);
        Some(&*view)
    }

    /// Drops the cached view for an owner.
    pub fn invalidate(&mut self, owner_id: &str) {
        self.views.remove(owner_id);
    }
}
