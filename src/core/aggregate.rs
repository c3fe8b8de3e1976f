//! Month aggregation and the Safe-to-Spend formula.
//!
//! [`aggregate`] walks one calendar month of transactions and splits every amount into
//! income, variable spending or a commitment envelope. Commitment envelopes reserve
//! their full limit up front; spending past a limit shows up as overspend.
//! [`compute_safe_to_spend`] is the only place the headline balance is computed.

use crate::{
    core::{
        category::Commitment,
        classify::{Classification, TransactionKind, classify},
        monthly::{month_start, next_month_start},
        validation::finite_or_zero,
    },
    entities::{category, month, transaction},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;
use tracing::warn;

/// Actual-versus-limit figures for one commitment category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnvelopeLine {
    /// Category the line belongs to
    pub category_id: i64,
    /// Category name
    pub name: String,
    /// Budget reserved for the month
    pub limit: f64,
    /// Expenses recorded against the category this month
    pub actual: f64,
    /// Spending beyond the limit, never negative
    pub excess: f64,
}

/// Per-month totals feeding Safe-to-Spend.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Breakdown {
    /// Base income plus income transactions
    pub income: f64,
    /// Carried in from the previous month, may be negative
    pub rollover: f64,
    /// Sum of every commitment category's limit
    pub total_commitments: f64,
    /// Uncategorised spending, standard categories and debt payments
    pub spent_variable: f64,
    /// Sum of every envelope's excess
    pub overspend: f64,
    /// One line per commitment category, in category order
    pub envelopes: Vec<EnvelopeLine>,
}

impl Breakdown {
    /// Spending shown next to Safe-to-Spend. Envelope spending within its limit is
    /// already covered by `total_commitments`.
    #[must_use]
    pub fn spent(&self) -> f64 {
        self.spent_variable + self.overspend
    }
}

/// Aggregates the calendar month starting at `start`.
///
/// `month` supplies base income and rollover; without a record both are zero.
/// Transactions outside the month are ignored, as are stored rows with an unknown
/// type. A transaction whose category is missing from `categories` counts as
/// variable spending.
#[must_use]
pub fn aggregate(
    start: NaiveDate,
    month: Option<&month::Model>,
    transactions: &[transaction::Model],
    categories: &[category::Model],
) -> Breakdown {
    let start = month_start(start);
    let end = next_month_start(start);

    let commitments: HashMap<i64, Commitment> = categories
        .iter()
        .map(|c| (c.id, Commitment::from_model(c)))
        .collect();

    let mut breakdown = Breakdown {
        income: month.map_or(0.0, |m| finite_or_zero(m.income)),
        rollover: month.map_or(0.0, |m| finite_or_zero(m.rollover)),
        ..Breakdown::default()
    };
    let mut envelope_spending: HashMap<i64, f64> = HashMap::new();

    for tx in transactions.iter().filter(|tx| tx.date >= start && tx.date < end) {
        let Ok(kind) = tx.transaction_type.parse::<TransactionKind>() else {
            warn!(
                "Skipping transaction {} with unknown type {:?}",
                tx.id, tx.transaction_type
            );
            continue;
        };
        let category = tx
            .category_id
            .and_then(|id| commitments.get(&id).map(|commitment| (id, *commitment)));
        let amount = finite_or_zero(tx.amount);

        match classify(kind, category) {
            Classification::Income => breakdown.income += amount,
            Classification::VariableSpend => breakdown.spent_variable += amount,
            Classification::EnvelopeSpend(id) => {
                *envelope_spending.entry(id).or_insert(0.0) += amount;
            }
        }
    }

    for category in categories {
        let commitment = commitments
            .get(&category.id)
            .copied()
            .unwrap_or(Commitment::Standard);
        if !commitment.is_commitment() {
            continue;
        }
        let limit = commitment.limit();
        let actual = envelope_spending.get(&category.id).copied().unwrap_or(0.0);
        let excess = (actual - limit).max(0.0);

        breakdown.total_commitments += limit;
        breakdown.overspend += excess;
        breakdown.envelopes.push(EnvelopeLine {
            category_id: category.id,
            name: category.name.clone(),
            limit,
            actual,
            excess,
        });
    }

    breakdown
}

/// `(income + rollover) - total_commitments - spent_variable - overspend`
#[must_use]
pub fn compute_safe_to_spend(breakdown: &Breakdown) -> f64 {
    (breakdown.income + breakdown.rollover)
        - breakdown.total_commitments
        - breakdown.spent_variable
        - breakdown.overspend
}
